//! Fee catalog: per-semester fee definitions and their creation log.

use chrono::NaiveDateTime;
use common::{CreateFeeRequest, FeeDto, FeeHistoryDto, UpdateFeeRequest};
use model::entities::{fee, history_fee};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{LedgerError, Result};
use crate::term::resolve_semester;

fn to_dto(model: fee::Model) -> FeeDto {
    FeeDto {
        fee_id: model.fee_id,
        fee_name: model.fee_name,
        fee_amount: model.fee_amount,
        role: model.role,
        semester_id: model.semester_id,
    }
}

fn validate_role(role: &str) -> Result<String> {
    let role = role.trim();
    if role == fee::ROLE_NON_OFFICER || role == fee::ROLE_OFFICER {
        Ok(role.to_string())
    } else {
        Err(LedgerError::validation(format!(
            "role must be \"{}\" or \"{}\", got \"{}\"",
            fee::ROLE_NON_OFFICER,
            fee::ROLE_OFFICER,
            role
        )))
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::validation("fee_amount must not be negative"));
    }
    Ok(common::money::two_places(amount))
}

/// Lists a semester's fees ordered by id.
pub async fn list_fees<C: ConnectionTrait>(conn: &C, semester_id: i32) -> Result<Vec<FeeDto>> {
    let fees = semester_fees(conn, semester_id).await?;
    debug!("Semester {} has {} fees", semester_id, fees.len());
    Ok(fees.into_iter().map(to_dto).collect())
}

/// Adds a fee and records it in the creation log within one transaction.
#[instrument(skip(db))]
pub async fn create_fee(
    db: &DatabaseConnection,
    request: CreateFeeRequest,
    now: NaiveDateTime,
) -> Result<FeeDto> {
    request.validate()?;
    let role = validate_role(&request.role)?;
    let amount = validate_amount(request.fee_amount)?;
    let name = request.fee_name.trim().to_string();

    let txn = db.begin().await?;
    let semester_id = resolve_semester(&txn, request.semester_id).await?;

    let created = fee::ActiveModel {
        semester_id: Set(semester_id),
        fee_name: Set(name),
        fee_amount: Set(amount),
        role: Set(role),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    history_fee::ActiveModel {
        fee_id: Set(created.fee_id),
        semester_id: Set(created.semester_id),
        fee_name: Set(created.fee_name.clone()),
        fee_amount: Set(created.fee_amount),
        role: Set(created.role.clone()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(
        "Created fee {} '{}' for semester {}",
        created.fee_id, created.fee_name, created.semester_id
    );
    Ok(to_dto(created))
}

/// Edits a fee in place. The creation log is left untouched.
#[instrument(skip(conn))]
pub async fn update_fee<C: ConnectionTrait>(conn: &C, request: UpdateFeeRequest) -> Result<FeeDto> {
    request.validate()?;
    let role = validate_role(&request.role)?;
    let amount = validate_amount(request.fee_amount)?;

    let existing = fee::Entity::find_by_id(request.fee_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!("Fee {} not found for update", request.fee_id);
            LedgerError::not_found(format!("Fee {} not found", request.fee_id))
        })?;

    let mut active: fee::ActiveModel = existing.into();
    active.fee_name = Set(request.fee_name.trim().to_string());
    active.fee_amount = Set(amount);
    active.role = Set(role);
    let updated = active.update(conn).await?;

    info!("Updated fee {}", updated.fee_id);
    Ok(to_dto(updated))
}

/// Deletes a fee. Payments and log rows referencing it are kept.
#[instrument(skip(conn))]
pub async fn delete_fee<C: ConnectionTrait>(conn: &C, fee_id: i32) -> Result<()> {
    let result = fee::Entity::delete_by_id(fee_id).exec(conn).await?;
    if result.rows_affected == 0 {
        warn!("Fee {} not found for deletion", fee_id);
        return Err(LedgerError::not_found(format!("Fee {} not found", fee_id)));
    }
    info!("Deleted fee {}", fee_id);
    Ok(())
}

/// Creation log entries, newest first, optionally limited to one semester.
pub async fn fee_history<C: ConnectionTrait>(
    conn: &C,
    semester_id: Option<i32>,
) -> Result<Vec<FeeHistoryDto>> {
    let mut query = history_fee::Entity::find();
    if let Some(semester_id) = semester_id {
        query = query.filter(history_fee::Column::SemesterId.eq(semester_id));
    }
    let rows = query
        .order_by_desc(history_fee::Column::CreatedAt)
        .order_by_desc(history_fee::Column::HistoryId)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| FeeHistoryDto {
            history_id: row.history_id,
            fee_id: row.fee_id,
            semester_id: row.semester_id,
            fee_name: row.fee_name,
            fee_amount: row.fee_amount,
            role: row.role,
            created_at: row.created_at,
        })
        .collect())
}

/// Ids of the semester's fees whose role matches the officer flag.
pub fn applicable_fee_ids(semester_fees: &[fee::Model], is_officer: bool) -> Vec<i32> {
    let role = fee::role_for_officer(is_officer);
    semester_fees
        .iter()
        .filter(|f| f.role == role)
        .map(|f| f.fee_id)
        .collect()
}

/// Loads the semester's fees as stored models.
pub async fn semester_fees<C: ConnectionTrait>(
    conn: &C,
    semester_id: i32,
) -> Result<Vec<fee::Model>> {
    Ok(fee::Entity::find()
        .filter(fee::Column::SemesterId.eq(semester_id))
        .order_by_asc(fee::Column::FeeId)
        .all(conn)
        .await?)
}
