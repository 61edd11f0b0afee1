//! Payment ledger payloads: the posting request, its outcome, and the
//! read-side shapes for student histories and receipts.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One fee the cashier selected for payment.
///
/// Ids and amounts arrive from form-driven clients as numbers or numeric
/// strings, so they are kept loose here and parsed by the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaymentItemRequest {
    #[serde(default)]
    pub fee_id: Option<serde_json::Value>,
    #[serde(default)]
    pub amount_paid: Option<serde_json::Value>,
}

/// Request body for posting a batch of fee payments under one receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PostPaymentRequest {
    #[serde(default)]
    pub student_id: Option<serde_json::Value>,
    #[serde(default)]
    pub semester_id: Option<serde_json::Value>,
    /// Staff member issuing the receipt
    #[serde(default)]
    pub issued_by: Option<String>,
    /// Receipt number shared by every row of this batch
    #[serde(default)]
    pub control_number: Option<serde_json::Value>,
    #[serde(default)]
    pub fees: Option<Vec<PaymentItemRequest>>,
    /// Explicit override of the fees that count towards Paid status.
    /// When omitted the set is derived from the fee catalog.
    #[serde(default)]
    pub fees_to_consider: Option<Vec<serde_json::Value>>,
}

/// Outcome of a posting.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaymentPostingResult {
    pub inserted_rows: usize,
    pub inserted_fee_ids: Vec<i32>,
    pub skipped_duplicates: usize,
    pub status_id: i32,
    pub status: String,
    pub paid_count: usize,
    pub considered_count: usize,
    pub control_number: String,
}

/// A stored payment joined with its fee's current name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaymentDto {
    pub payment_id: i32,
    pub student_id: String,
    pub semester_id: i32,
    pub fee_id: i32,
    /// Absent when the fee has since been deleted
    pub fee_name: Option<String>,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDateTime,
    pub control_number: String,
    pub issued_by: String,
}

/// One receipt in a student's payment history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentTransactionDto {
    pub control_number: String,
    pub semester_id: i32,
    pub item_count: usize,
    pub total_amount: Decimal,
    pub payment_date: NaiveDateTime,
}

/// A reprinted receipt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReceiptDto {
    pub control_number: String,
    pub student_id: String,
    pub student_name: Option<String>,
    pub semester_id: i32,
    pub issued_by: String,
    pub payment_date: NaiveDateTime,
    pub items: Vec<PaymentDto>,
    pub total_amount: Decimal,
    pub formatted_total: String,
}
