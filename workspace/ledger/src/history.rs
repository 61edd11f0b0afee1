//! Read paths over posted payments: per-student listings, receipts grouped
//! by control number, and receipt reprints.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use common::money::format_peso;
use common::{PaymentDto, ReceiptDto, StudentTransactionDto};
use model::entities::{fee, payment, student};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument, warn};

use crate::error::{LedgerError, Result};

fn to_dto((row, fee): (payment::Model, Option<fee::Model>)) -> PaymentDto {
    PaymentDto {
        payment_id: row.payment_id,
        student_id: row.student_id,
        semester_id: row.semester_id,
        fee_id: row.fee_id,
        fee_name: fee.map(|f| f.fee_name),
        amount_paid: row.amount_paid,
        payment_date: row.payment_date,
        control_number: row.control_number,
        issued_by: row.issued_by,
    }
}

/// All payments of a student, newest first, with current fee names.
#[instrument(skip(conn))]
pub async fn payments_for_student<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    semester_id: Option<i32>,
) -> Result<Vec<PaymentDto>> {
    let mut query = payment::Entity::find().filter(payment::Column::StudentId.eq(student_id));
    if let Some(semester_id) = semester_id {
        query = query.filter(payment::Column::SemesterId.eq(semester_id));
    }

    let rows = query
        .order_by_desc(payment::Column::PaymentDate)
        .order_by_desc(payment::Column::PaymentId)
        .find_also_related(fee::Entity)
        .all(conn)
        .await?;
    debug!("Found {} payments for student {}", rows.len(), student_id);
    Ok(rows.into_iter().map(to_dto).collect())
}

/// One summary row per `(control_number, semester_id)` receipt of a student.
#[instrument(skip(conn))]
pub async fn transactions_for_student<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    semester_id: Option<i32>,
) -> Result<Vec<StudentTransactionDto>> {
    let mut query = payment::Entity::find().filter(payment::Column::StudentId.eq(student_id));
    if let Some(semester_id) = semester_id {
        query = query.filter(payment::Column::SemesterId.eq(semester_id));
    }
    let rows = query.all(conn).await?;

    let mut receipts: BTreeMap<(String, i32), (usize, Decimal, NaiveDateTime)> = BTreeMap::new();
    for row in rows {
        let entry = receipts
            .entry((row.control_number, row.semester_id))
            .or_insert((0, Decimal::ZERO, row.payment_date));
        entry.0 += 1;
        entry.1 += row.amount_paid;
        entry.2 = entry.2.max(row.payment_date);
    }

    let mut transactions: Vec<StudentTransactionDto> = receipts
        .into_iter()
        .map(|((control_number, semester_id), (item_count, total, latest))| {
            StudentTransactionDto {
                control_number,
                semester_id,
                item_count,
                total_amount: total,
                payment_date: latest,
            }
        })
        .collect();
    transactions.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then_with(|| b.control_number.cmp(&a.control_number))
    });
    Ok(transactions)
}

/// Reprints a receipt: every row sharing `control_number` and their total.
#[instrument(skip(conn))]
pub async fn receipt<C: ConnectionTrait>(conn: &C, control_number: &str) -> Result<ReceiptDto> {
    let rows = payment::Entity::find()
        .filter(payment::Column::ControlNumber.eq(control_number))
        .order_by_asc(payment::Column::PaymentId)
        .find_also_related(fee::Entity)
        .all(conn)
        .await?;

    let Some((first, _)) = rows.first() else {
        warn!("Receipt {} not found", control_number);
        return Err(LedgerError::not_found(format!(
            "Receipt {} not found",
            control_number
        )));
    };
    let student_id = first.student_id.clone();
    let semester_id = first.semester_id;
    let issued_by = first.issued_by.clone();

    let student_name = student::Entity::find_by_id(student_id.clone())
        .one(conn)
        .await?
        .map(|s| s.display_name());

    let items: Vec<PaymentDto> = rows.into_iter().map(to_dto).collect();
    let total_amount: Decimal = items.iter().map(|item| item.amount_paid).sum();
    let payment_date = items
        .iter()
        .map(|item| item.payment_date)
        .max()
        .unwrap_or_default();

    Ok(ReceiptDto {
        control_number: control_number.to_string(),
        student_id,
        student_name,
        semester_id,
        issued_by,
        payment_date,
        formatted_total: format_peso(total_amount),
        total_amount,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::delete_fee;
    use crate::testing::*;

    #[tokio::test]
    async fn test_payments_for_student_newest_first_with_names() {
        let db = setup_db().await.unwrap();
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        let old = seed_term(&db, "2023-2024", "2nd Semester", false).await;
        let a = seed_fee(&db, sem, "Org Fee", "300", "0").await;
        let b = seed_fee(&db, sem, "ID Fee", "350", "0").await;
        let c = seed_fee(&db, old, "Old Fee", "10", "0").await;
        seed_student(&db, "S1", "Ana", "Cruz", sem, false).await;

        seed_payment(&db, "S1", sem, a, "300", "C1", at(2024, 6, 3, 9, 0)).await;
        seed_payment(&db, "S1", sem, b, "350", "C2", at(2024, 6, 5, 9, 0)).await;
        seed_payment(&db, "S1", old, c, "10", "C0", at(2024, 1, 5, 9, 0)).await;
        delete_fee(&db, a).await.unwrap();

        let all = payments_for_student(&db, "S1", None).await.unwrap();
        assert_eq!(
            all.iter().map(|p| p.control_number.as_str()).collect::<Vec<_>>(),
            vec!["C2", "C1", "C0"]
        );
        assert_eq!(all[0].fee_name.as_deref(), Some("ID Fee"));
        assert_eq!(all[1].fee_name, None);

        let scoped = payments_for_student(&db, "S1", Some(old)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].fee_id, c);
    }

    #[tokio::test]
    async fn test_transactions_group_by_receipt() {
        let db = setup_db().await.unwrap();
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        let a = seed_fee(&db, sem, "Org Fee", "300", "0").await;
        let b = seed_fee(&db, sem, "ID Fee", "350", "0").await;
        let c = seed_fee(&db, sem, "Lab Fee", "25.50", "0").await;
        seed_student(&db, "S1", "Ana", "Cruz", sem, false).await;

        seed_payment(&db, "S1", sem, a, "300", "C1", at(2024, 6, 3, 9, 0)).await;
        seed_payment(&db, "S1", sem, b, "350", "C1", at(2024, 6, 3, 9, 1)).await;
        seed_payment(&db, "S1", sem, c, "25.50", "C2", at(2024, 6, 4, 9, 0)).await;

        let receipts = transactions_for_student(&db, "S1", Some(sem)).await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].control_number, "C2");
        assert_eq!(receipts[1].control_number, "C1");
        assert_eq!(receipts[1].item_count, 2);
        assert_eq!(receipts[1].total_amount, dec("650"));
        assert_eq!(receipts[1].payment_date, at(2024, 6, 3, 9, 1));
    }

    #[tokio::test]
    async fn test_receipt_reprint() {
        let db = setup_db().await.unwrap();
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        let a = seed_fee(&db, sem, "Org Fee", "300", "0").await;
        let b = seed_fee(&db, sem, "ID Fee", "350", "0").await;
        seed_student(&db, "S1", "Ana", "Cruz", sem, false).await;
        seed_payment(&db, "S1", sem, a, "300", "C1", at(2024, 6, 3, 9, 0)).await;
        seed_payment(&db, "S1", sem, b, "350.25", "C1", at(2024, 6, 3, 9, 0)).await;

        let receipt = receipt(&db, "C1").await.unwrap();
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.total_amount, dec("650.25"));
        assert_eq!(receipt.student_name.as_deref(), Some("Ana Cruz"));
        assert_eq!(receipt.issued_by, "cashier");
        assert!(receipt.formatted_total.contains("650.25"));
    }

    #[tokio::test]
    async fn test_receipt_not_found() {
        let db = setup_db().await.unwrap();
        assert!(matches!(
            receipt(&db, "missing").await.unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }
}
