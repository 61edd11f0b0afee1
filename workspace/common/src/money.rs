//! Peso amount helpers shared by receipts and reports.

use rust_decimal::Decimal;
use rusty_money::{Money, iso};

/// Rescales an amount to exactly two fractional digits for display.
pub fn two_places(amount: Decimal) -> Decimal {
    let mut scaled = amount.round_dp(2);
    scaled.rescale(2);
    scaled
}

/// Formats an amount as Philippine pesos, e.g. `₱1,050.00`.
pub fn format_peso(amount: Decimal) -> String {
    Money::from_decimal(two_places(amount), iso::PHP).to_string()
}
