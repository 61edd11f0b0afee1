//! Domain services of the fee-collection ledger.
//!
//! Every write path owns its transaction: callers hand in a
//! `DatabaseConnection` and get back either the committed outcome or a
//! [`error::LedgerError`] with nothing persisted.

pub mod accounts;
pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod history;
pub mod posting;
pub mod report;
pub mod status;
pub mod term;

#[cfg(test)]
mod testing;

pub use error::{LedgerError, Result};
pub use posting::post_payments;
pub use report::{ReportWindow, collection_report};
pub use status::TermStatus;
pub use term::{activate_term, active_term, resolve_semester};
