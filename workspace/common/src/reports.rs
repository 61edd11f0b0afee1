//! Collection report payloads.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// Granularity of a collection report window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportInterval {
    /// `target` is `YYYY-MM-DD`
    Day,
    /// `target` is `YYYY-Www`
    Week,
    /// `target` is `YYYY-MM`
    Month,
}

impl FromStr for ReportInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ReportInterval::Day),
            "week" => Ok(ReportInterval::Week),
            "month" => Ok(ReportInterval::Month),
            other => Err(format!(
                "Invalid interval '{}': expected day, week or month",
                other
            )),
        }
    }
}

impl fmt::Display for ReportInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportInterval::Day => "day",
            ReportInterval::Week => "week",
            ReportInterval::Month => "month",
        };
        f.write_str(name)
    }
}

/// Query parameters for the collection report
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct ReportQuery {
    /// `day`, `week` or `month`
    pub interval: Option<String>,
    /// Date, ISO week or month token matching the interval
    pub target: Option<String>,
}

/// One receipt in a collection report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReportRowDto {
    pub control_number: String,
    pub student_id: String,
    pub student_name: Option<String>,
    /// Distinct fee names on the receipt, comma-joined
    pub fee: String,
    pub amount: Decimal,
    pub status: String,
    pub payment_date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parsing_is_case_insensitive() {
        assert_eq!("Day".parse::<ReportInterval>(), Ok(ReportInterval::Day));
        assert_eq!(" week ".parse::<ReportInterval>(), Ok(ReportInterval::Week));
        assert_eq!("MONTH".parse::<ReportInterval>(), Ok(ReportInterval::Month));
        assert!("year".parse::<ReportInterval>().is_err());
    }

    #[test]
    fn test_interval_serializes_lowercase() {
        let json = serde_json::to_string(&ReportInterval::Week).unwrap();
        assert_eq!(json, "\"week\"");
        assert_eq!(ReportInterval::Month.to_string(), "month");
    }
}
