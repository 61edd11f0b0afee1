//! Collection report: receipts whose payments fall in a day, ISO week or
//! month window. Windows are half-open `[start, end)` in server-local
//! naive time.

use std::collections::{BTreeSet, HashMap};

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use common::{ReportInterval, ReportRowDto};
use model::entities::{fee, payment, student};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument};

use crate::error::{LedgerError, Result};
use crate::status::TermStatus;

/// A resolved report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub interval: ReportInterval,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportWindow {
    /// Parses `target` for the given interval. The interval defaults to `day`.
    pub fn parse(interval: Option<&str>, target: Option<&str>) -> Result<Self> {
        let interval = match interval.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<ReportInterval>().map_err(LedgerError::Validation)?,
            None => ReportInterval::Day,
        };
        let target = target
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LedgerError::validation("target is required"))?;

        let (start, end) = match interval {
            ReportInterval::Day => {
                let day = NaiveDate::parse_from_str(target, "%Y-%m-%d").map_err(|_| {
                    LedgerError::validation(format!(
                        "Invalid day '{}': expected YYYY-MM-DD",
                        target
                    ))
                })?;
                (day, day.succ_opt())
            }
            ReportInterval::Week => {
                let monday = parse_iso_week(target).ok_or_else(|| {
                    LedgerError::validation(format!("Invalid week '{}': expected YYYY-Www", target))
                })?;
                (monday, monday.checked_add_days(Days::new(7)))
            }
            ReportInterval::Month => {
                let first = parse_month(target).ok_or_else(|| {
                    LedgerError::validation(format!("Invalid month '{}': expected YYYY-MM", target))
                })?;
                (first, first.checked_add_months(Months::new(1)))
            }
        };
        let end = end.ok_or_else(|| LedgerError::validation("Report window is out of range"))?;

        Ok(ReportWindow {
            interval,
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
        })
    }

    #[cfg(test)]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

fn parse_iso_week(target: &str) -> Option<NaiveDate> {
    let (year, week) = target.split_once("-W").or_else(|| target.split_once("-w"))?;
    if year.len() != 4 || week.is_empty() || week.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    // Rejects week 53 in years that only have 52.
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

fn parse_month(target: &str) -> Option<NaiveDate> {
    let (year, month) = target.split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

#[derive(Default)]
struct ReceiptGroup {
    fees: BTreeSet<String>,
    amount: Decimal,
    latest: Option<NaiveDateTime>,
}

/// One row per `(control_number, student_id)` with payments in the window,
/// most recent receipt first.
#[instrument(skip(conn))]
pub async fn collection_report<C: ConnectionTrait>(
    conn: &C,
    window: &ReportWindow,
) -> Result<Vec<ReportRowDto>> {
    let rows = payment::Entity::find()
        .filter(payment::Column::PaymentDate.gte(window.start))
        .filter(payment::Column::PaymentDate.lt(window.end))
        .find_also_related(fee::Entity)
        .all(conn)
        .await?;
    debug!(
        "{} payments between {} and {}",
        rows.len(),
        window.start,
        window.end
    );

    let mut groups: HashMap<(String, String), ReceiptGroup> = HashMap::new();
    for (row, fee) in rows {
        let group = groups
            .entry((row.control_number, row.student_id))
            .or_default();
        if let Some(fee) = fee {
            group.fees.insert(fee.fee_name);
        }
        group.amount += row.amount_paid;
        group.latest = group.latest.max(Some(row.payment_date));
    }

    let student_ids: Vec<String> = groups
        .keys()
        .map(|(_, student_id)| student_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<String, String> = if student_ids.is_empty() {
        HashMap::new()
    } else {
        student::Entity::find()
            .filter(student::Column::StudentId.is_in(student_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.student_id.clone(), s.display_name()))
            .collect()
    };

    let mut report: Vec<ReportRowDto> = groups
        .into_iter()
        .filter_map(|((control_number, student_id), group)| {
            Some(ReportRowDto {
                student_name: names.get(&student_id).cloned(),
                control_number,
                student_id,
                fee: group.fees.into_iter().collect::<Vec<_>>().join(", "),
                amount: group.amount,
                status: TermStatus::Paid.name().to_string(),
                payment_date: group.latest?,
            })
        })
        .collect();
    report.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then_with(|| b.control_number.cmp(&a.control_number))
    });
    Ok(report)
}
