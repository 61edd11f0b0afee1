use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse, json_rejection, ledger_error};
use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use common::{
    PaymentDto, PaymentPostingResult, PostPaymentRequest, ReceiptDto, SemesterQuery,
    StudentTransactionDto,
};
use serde::Serialize;
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentList {
    pub payments: Vec<PaymentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionList {
    pub transactions: Vec<StudentTransactionDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptPayload {
    pub receipt: ReceiptDto,
}

/// Post a batch of fee payments under one control number
///
/// Fees already paid by the student in the semester are skipped, and the
/// enrollment's Paid/Unpaid status is recomputed in the same transaction.
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = PostPaymentRequest,
    responses(
        (status = 201, description = "At least one payment recorded", body = ApiResponse<PaymentPostingResult>),
        (status = 200, description = "Every submitted fee was already paid", body = ApiResponse<PaymentPostingResult>),
        (status = 400, description = "Invalid request or no fee belongs to the semester", body = ErrorResponse),
        (status = 404, description = "Student is not enrolled in the semester", body = ErrorResponse),
        (status = 409, description = "Control number already used by another receipt", body = ErrorResponse),
        (status = 500, description = "Internal server error; nothing was written", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn post_payments(
    State(state): State<AppState>,
    payload: Result<Json<PostPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentPostingResult>>), ApiError> {
    trace!("Entering post_payments function");
    let Json(request) = payload.map_err(json_rejection)?;

    let result = ledger::post_payments(&state.db, request, Local::now().naive_local())
        .await
        .map_err(ledger_error)?;

    if result.inserted_rows == 0 {
        info!("Receipt {} recorded nothing new", result.control_number);
        return Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(
                "No new payments recorded; the selected fees were already paid",
                result,
            )),
        ));
    }
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Payment recorded successfully", result)),
    ))
}

/// List a student's payments, newest first
#[utoipa::path(
    get,
    path = "/api/payments/student/{student_id}",
    tag = "payments",
    params(
        ("student_id" = String, Path, description = "Student ID"),
        SemesterQuery,
    ),
    responses(
        (status = 200, description = "Payments retrieved successfully", body = ApiResponse<PaymentList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student_payments(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<PaymentList>>, ApiError> {
    trace!("Entering get_student_payments function for {}", student_id);
    let payments = ledger::history::payments_for_student(&state.db, &student_id, query.semester_id)
        .await
        .map_err(ledger_error)?;
    debug!("Student {} has {} payments", student_id, payments.len());
    Ok(Json(ApiResponse::ok(
        "Payments retrieved successfully",
        PaymentList { payments },
    )))
}

/// List a student's receipts, one row per control number
#[utoipa::path(
    get,
    path = "/api/payments/student/{student_id}/transactions",
    tag = "payments",
    params(
        ("student_id" = String, Path, description = "Student ID"),
        SemesterQuery,
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<TransactionList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student_transactions(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<TransactionList>>, ApiError> {
    trace!("Entering get_student_transactions function for {}", student_id);
    let transactions =
        ledger::history::transactions_for_student(&state.db, &student_id, query.semester_id)
            .await
            .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok(
        "Transactions retrieved successfully",
        TransactionList { transactions },
    )))
}

/// Reprint a receipt
#[utoipa::path(
    get,
    path = "/api/payments/receipt/{control_number}",
    tag = "payments",
    params(
        ("control_number" = String, Path, description = "Receipt control number"),
    ),
    responses(
        (status = 200, description = "Receipt retrieved successfully", body = ApiResponse<ReceiptPayload>),
        (status = 404, description = "Receipt not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_receipt(
    Path(control_number): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReceiptPayload>>, ApiError> {
    trace!("Entering get_receipt function for {}", control_number);
    let receipt = ledger::history::receipt(&state.db, &control_number)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok(
        "Receipt retrieved successfully",
        ReceiptPayload { receipt },
    )))
}
