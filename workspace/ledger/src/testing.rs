//! Shared fixtures for the ledger tests: an in-memory database with the
//! full schema and helpers that seed terms, fees and enrollments.

use chrono::{NaiveDate, NaiveDateTime};
use migration::{Migrator, MigratorTrait};
use model::entities::{fee, payment, semester, student, student_enrollment, year};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};
use std::str::FromStr;

use crate::status::TermStatus;

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Creates a year and semester, returning the semester id.
pub async fn seed_term(
    db: &DatabaseConnection,
    year_name: &str,
    semester_name: &str,
    active: bool,
) -> i32 {
    let year = year::ActiveModel {
        year_name: Set(year_name.to_string()),
        is_active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    semester::ActiveModel {
        semester_name: Set(semester_name.to_string()),
        year_id: Set(year.year_id),
        is_active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .semester_id
}

pub async fn seed_fee(
    db: &DatabaseConnection,
    semester_id: i32,
    name: &str,
    amount: &str,
    role: &str,
) -> i32 {
    fee::ActiveModel {
        semester_id: Set(semester_id),
        fee_name: Set(name.to_string()),
        fee_amount: Set(dec(amount)),
        role: Set(role.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .fee_id
}

pub async fn seed_student(
    db: &DatabaseConnection,
    student_id: &str,
    first: &str,
    last: &str,
    semester_id: i32,
    is_officer: bool,
) {
    student::ActiveModel {
        student_id: Set(student_id.to_string()),
        student_firstname: Set(first.to_string()),
        student_lastname: Set(last.to_string()),
        created_at: Set(at(2024, 6, 1, 8, 0)),
    }
    .insert(db)
    .await
    .unwrap();

    student_enrollment::ActiveModel {
        student_id: Set(student_id.to_string()),
        semester_id: Set(semester_id),
        department_id: Set(None),
        course_id: Set(None),
        status_id: Set(TermStatus::Unpaid.id()),
        is_officer: Set(is_officer),
        is_removed: Set(false),
        created_at: Set(at(2024, 6, 1, 8, 0)),
    }
    .insert(db)
    .await
    .unwrap();
}

/// Inserts a payment row directly, bypassing the posting flow.
pub async fn seed_payment(
    db: &DatabaseConnection,
    student_id: &str,
    semester_id: i32,
    fee_id: i32,
    amount: &str,
    control_number: &str,
    paid_at: NaiveDateTime,
) -> payment::Model {
    payment::ActiveModel {
        student_id: Set(student_id.to_string()),
        semester_id: Set(semester_id),
        fee_id: Set(fee_id),
        amount_paid: Set(dec(amount)),
        payment_date: Set(paid_at),
        control_number: Set(control_number.to_string()),
        issued_by: Set("cashier".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn enrollment_status(db: &DatabaseConnection, student_id: &str, semester_id: i32) -> i32 {
    use sea_orm::EntityTrait;
    student_enrollment::Entity::find_by_id((student_id.to_string(), semester_id))
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .status_id
}
