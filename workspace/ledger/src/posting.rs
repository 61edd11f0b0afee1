//! Payment posting: one checkout action writes one receipt.
//!
//! A batch is parsed from the loose request shape first, so malformed input
//! never reaches the database. The write path then runs in a single
//! transaction: fee restriction to the semester, enrollment lookup,
//! control-number ownership, inserts guarded by the
//! `(student_id, semester_id, fee_id)` unique index, and the status recompute.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDateTime;
use common::money::two_places;
use common::{PaymentPostingResult, PostPaymentRequest};
use model::entities::{fee, payment, student_enrollment};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{applicable_fee_ids, semester_fees};
use crate::error::{LedgerError, Result, is_unique_violation};
use crate::status::recompute_status;

/// One fee line of a validated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentItem {
    pub fee_id: i32,
    pub amount_paid: Decimal,
}

/// Which fees count towards the Paid status.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsideredFees {
    /// Fees of the semester matching the enrollment's officer flag.
    Catalog,
    /// Staff-supplied set; every id must belong to the semester.
    Explicit(Vec<i32>),
}

impl ConsideredFees {
    fn resolve(&self, semester_fees: &[fee::Model], is_officer: bool) -> Result<Vec<i32>> {
        match self {
            ConsideredFees::Catalog => Ok(applicable_fee_ids(semester_fees, is_officer)),
            ConsideredFees::Explicit(ids) => {
                let known: HashSet<i32> = semester_fees.iter().map(|f| f.fee_id).collect();
                if let Some(stray) = ids.iter().find(|id| !known.contains(id)) {
                    return Err(LedgerError::validation(format!(
                        "fees_to_consider contains fee {} which does not belong to the semester",
                        stray
                    )));
                }
                Ok(ids.clone())
            }
        }
    }
}

/// A validated posting request.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentBatch {
    pub student_id: String,
    pub semester_id: i32,
    pub issued_by: String,
    pub control_number: String,
    pub items: Vec<PaymentItem>,
    pub considered: ConsideredFees,
}

fn parse_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn parse_positive_id(value: Option<&Value>) -> Option<i32> {
    let raw = match value? {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if raw > 0 { i32::try_from(raw).ok() } else { None }
}

fn parse_amount(value: Option<&Value>) -> Option<Decimal> {
    let amount = match value? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok()?,
        Value::String(s) => Decimal::from_str(s.trim()).ok()?,
        _ => return None,
    };
    if amount < Decimal::ZERO { None } else { Some(two_places(amount)) }
}

impl TryFrom<PostPaymentRequest> for PaymentBatch {
    type Error = LedgerError;

    fn try_from(request: PostPaymentRequest) -> Result<Self> {
        let student_id = parse_text(request.student_id.as_ref())
            .ok_or_else(|| LedgerError::validation("student_id is required"))?;
        let issued_by = request
            .issued_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| LedgerError::validation("issued_by is required"))?;
        let control_number = parse_text(request.control_number.as_ref())
            .ok_or_else(|| LedgerError::validation("control_number is required"))?;
        let semester_id = parse_positive_id(request.semester_id.as_ref())
            .ok_or_else(|| LedgerError::validation("semester_id must be a positive number"))?;

        let fees = match request.fees {
            Some(fees) if !fees.is_empty() => fees,
            _ => return Err(LedgerError::validation("fees must be a non-empty list")),
        };

        // Duplicate fee ids keep their first position but the last amount.
        let mut items: Vec<PaymentItem> = Vec::with_capacity(fees.len());
        for (index, entry) in fees.iter().enumerate() {
            let fee_id = parse_positive_id(entry.fee_id.as_ref()).ok_or_else(|| {
                LedgerError::validation(format!("fees[{}].fee_id must be a positive number", index))
            })?;
            let amount_paid = parse_amount(entry.amount_paid.as_ref()).ok_or_else(|| {
                LedgerError::validation(format!(
                    "fees[{}].amount_paid must be a non-negative number",
                    index
                ))
            })?;
            match items.iter_mut().find(|item| item.fee_id == fee_id) {
                Some(existing) => existing.amount_paid = amount_paid,
                None => items.push(PaymentItem { fee_id, amount_paid }),
            }
        }

        let considered = match request.fees_to_consider {
            None => ConsideredFees::Catalog,
            Some(ids) => {
                let invalid = || {
                    LedgerError::validation(
                        "fees_to_consider must be a non-empty list of positive fee ids",
                    )
                };
                if ids.is_empty() {
                    return Err(invalid());
                }
                let mut parsed: Vec<i32> = Vec::with_capacity(ids.len());
                for id in &ids {
                    let id = parse_positive_id(Some(id)).ok_or_else(invalid)?;
                    if !parsed.contains(&id) {
                        parsed.push(id);
                    }
                }
                ConsideredFees::Explicit(parsed)
            }
        };

        Ok(PaymentBatch {
            student_id,
            semester_id,
            issued_by,
            control_number,
            items,
            considered,
        })
    }
}

/// Validates and posts a payment batch, stamping new rows with `now`.
#[instrument(skip(db, request))]
pub async fn post_payments(
    db: &DatabaseConnection,
    request: PostPaymentRequest,
    now: NaiveDateTime,
) -> Result<PaymentPostingResult> {
    let batch = PaymentBatch::try_from(request)?;
    debug!(
        "Posting {} fee(s) for student {} semester {} under {}",
        batch.items.len(),
        batch.student_id,
        batch.semester_id,
        batch.control_number
    );

    let txn = db.begin().await?;
    match post_in_transaction(&txn, &batch, now).await {
        Ok(result) => {
            txn.commit().await?;
            info!(
                "Posted receipt {} for student {}: {} inserted, {} skipped, status {}",
                result.control_number,
                batch.student_id,
                result.inserted_rows,
                result.skipped_duplicates,
                result.status
            );
            Ok(result)
        }
        Err(err) => {
            match &err {
                LedgerError::Database(db_err) => {
                    error!("Posting receipt {} failed: {}", batch.control_number, db_err)
                }
                other => warn!("Posting receipt {} rejected: {}", batch.control_number, other),
            }
            txn.rollback().await?;
            Err(err)
        }
    }
}

async fn post_in_transaction(
    txn: &DatabaseTransaction,
    batch: &PaymentBatch,
    now: NaiveDateTime,
) -> Result<PaymentPostingResult> {
    let fees = semester_fees(txn, batch.semester_id).await?;
    let known: HashSet<i32> = fees.iter().map(|f| f.fee_id).collect();

    let (valid, stray): (Vec<&PaymentItem>, Vec<&PaymentItem>) =
        batch.items.iter().partition(|item| known.contains(&item.fee_id));
    if !stray.is_empty() {
        warn!(
            "Ignoring fee(s) {:?} not in semester {}",
            stray.iter().map(|item| item.fee_id).collect::<Vec<_>>(),
            batch.semester_id
        );
    }
    if valid.is_empty() {
        return Err(LedgerError::validation(format!(
            "None of the submitted fees belong to semester {}",
            batch.semester_id
        )));
    }

    let enrollment =
        student_enrollment::Entity::find_by_id((batch.student_id.clone(), batch.semester_id))
            .one(txn)
            .await?
            .ok_or_else(|| {
                LedgerError::not_found(format!(
                    "Student {} is not enrolled in semester {}",
                    batch.student_id, batch.semester_id
                ))
            })?;

    let considered = batch.considered.resolve(&fees, enrollment.is_officer)?;

    ensure_control_number_free(txn, batch).await?;

    let mut inserted_fee_ids = Vec::new();
    let mut skipped_duplicates = 0;
    for item in valid {
        if insert_if_unpaid(txn, batch, item, now).await? {
            inserted_fee_ids.push(item.fee_id);
        } else {
            debug!("Fee {} already paid by {}", item.fee_id, batch.student_id);
            skipped_duplicates += 1;
        }
    }

    let outcome = recompute_status(txn, &batch.student_id, batch.semester_id, &considered).await?;

    Ok(PaymentPostingResult {
        inserted_rows: inserted_fee_ids.len(),
        inserted_fee_ids,
        skipped_duplicates,
        status_id: outcome.status.id(),
        status: outcome.status.name().to_string(),
        paid_count: outcome.paid_count,
        considered_count: outcome.considered_count,
        control_number: batch.control_number.clone(),
    })
}

/// Inserts one payment under a savepoint. A unique-index violation means
/// the fee is already paid; the savepoint is rolled back so the outer
/// transaction stays usable on every backend.
async fn insert_if_unpaid(
    txn: &DatabaseTransaction,
    batch: &PaymentBatch,
    item: &PaymentItem,
    now: NaiveDateTime,
) -> Result<bool> {
    let row = payment::ActiveModel {
        student_id: Set(batch.student_id.clone()),
        semester_id: Set(batch.semester_id),
        fee_id: Set(item.fee_id),
        amount_paid: Set(item.amount_paid),
        payment_date: Set(now),
        control_number: Set(batch.control_number.clone()),
        issued_by: Set(batch.issued_by.clone()),
        ..Default::default()
    };

    let savepoint = txn.begin().await?;
    match payment::Entity::insert(row).exec_without_returning(&savepoint).await {
        Ok(_) => {
            savepoint.commit().await?;
            Ok(true)
        }
        Err(err) if is_unique_violation(&err) => {
            savepoint.rollback().await?;
            Ok(false)
        }
        Err(err) => {
            savepoint.rollback().await?;
            Err(err.into())
        }
    }
}

/// A control number identifies one receipt, so it may only be reused by the
/// same student in the same semester.
async fn ensure_control_number_free(
    txn: &DatabaseTransaction,
    batch: &PaymentBatch,
) -> Result<()> {
    let taken = payment::Entity::find()
        .filter(payment::Column::ControlNumber.eq(batch.control_number.as_str()))
        .filter(
            Condition::any()
                .add(payment::Column::StudentId.ne(batch.student_id.as_str()))
                .add(payment::Column::SemesterId.ne(batch.semester_id)),
        )
        .one(txn)
        .await?;

    match taken {
        Some(other) => Err(LedgerError::Conflict(format!(
            "Control number {} is already used by student {} in semester {}",
            batch.control_number, other.student_id, other.semester_id
        ))),
        None => Ok(()),
    }
}
