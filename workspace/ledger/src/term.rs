//! Term registry: which academic year and semester are current.
//!
//! Exactly one year and one semester carry the active flag after any
//! activation. The flags are flipped with a single conditional UPDATE per
//! table so no reader ever observes two active rows.

use common::ActiveTermDto;
use model::entities::{semester, year};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{LedgerError, Result};

/// Returns the semester flagged active together with its year.
#[instrument(skip(conn))]
pub async fn active_term<C: ConnectionTrait>(conn: &C) -> Result<ActiveTermDto> {
    let found = semester::Entity::find()
        .filter(semester::Column::IsActive.eq(true))
        .find_also_related(year::Entity)
        .one(conn)
        .await?;

    match found {
        Some((semester, Some(year))) => Ok(ActiveTermDto {
            semester_id: semester.semester_id,
            semester: semester.semester_name,
            year: year.year_name,
            year_id: year.year_id,
        }),
        _ => {
            warn!("No active term is configured");
            Err(LedgerError::not_found("No active term has been set"))
        }
    }
}

/// Resolves an optional semester id, defaulting to the active term.
pub async fn resolve_semester<C: ConnectionTrait>(conn: &C, requested: Option<i32>) -> Result<i32> {
    match requested {
        Some(semester_id) => {
            let exists = semester::Entity::find_by_id(semester_id).one(conn).await?;
            if exists.is_none() {
                return Err(LedgerError::not_found(format!(
                    "Semester {} does not exist",
                    semester_id
                )));
            }
            Ok(semester_id)
        }
        None => Ok(active_term(conn).await?.semester_id),
    }
}

/// Finds or creates the year/semester pair and makes it the only active one.
#[instrument(skip(db))]
pub async fn activate_term(
    db: &DatabaseConnection,
    year_name: &str,
    semester_name: &str,
) -> Result<ActiveTermDto> {
    let year_name = year_name.trim();
    let semester_name = semester_name.trim();
    if year_name.is_empty() || semester_name.is_empty() {
        return Err(LedgerError::validation("year and semester are required"));
    }

    let txn = db.begin().await?;

    let year = match year::Entity::find()
        .filter(year::Column::YearName.eq(year_name))
        .one(&txn)
        .await?
    {
        Some(existing) => existing,
        None => {
            debug!("Creating academic year '{}'", year_name);
            year::ActiveModel {
                year_name: Set(year_name.to_string()),
                is_active: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let semester = match semester::Entity::find()
        .filter(semester::Column::YearId.eq(year.year_id))
        .filter(semester::Column::SemesterName.eq(semester_name))
        .one(&txn)
        .await?
    {
        Some(existing) => existing,
        None => {
            debug!("Creating semester '{}' in year {}", semester_name, year.year_id);
            semester::ActiveModel {
                semester_name: Set(semester_name.to_string()),
                year_id: Set(year.year_id),
                is_active: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    year::Entity::update_many()
        .col_expr(
            year::Column::IsActive,
            Expr::col(year::Column::YearId).eq(year.year_id),
        )
        .exec(&txn)
        .await?;
    semester::Entity::update_many()
        .col_expr(
            semester::Column::IsActive,
            Expr::col(semester::Column::SemesterId).eq(semester.semester_id),
        )
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Active term is now {} / {} (semester_id={})",
        year.year_name, semester.semester_name, semester.semester_id
    );
    Ok(ActiveTermDto {
        semester_id: semester.semester_id,
        semester: semester.semester_name,
        year: year.year_name,
        year_id: year.year_id,
    })
}
