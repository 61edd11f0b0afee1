use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse, ledger_error};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDateTime;
use common::{ReportInterval, ReportQuery, ReportRowDto};
use ledger::ReportWindow;
use serde::Serialize;
use tracing::{info, instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionReport {
    pub interval: ReportInterval,
    /// Inclusive window start
    pub start: NaiveDateTime,
    /// Exclusive window end
    pub end: NaiveDateTime,
    pub transactions: Vec<ReportRowDto>,
}

/// Receipts collected in a day, ISO week or month
#[utoipa::path(
    get,
    path = "/api/payments/reports/transactions",
    tag = "reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report generated", body = ApiResponse<CollectionReport>),
        (status = 400, description = "Unknown interval or malformed target", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transactions_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<CollectionReport>>, ApiError> {
    trace!("Entering get_transactions_report function");
    let window = ReportWindow::parse(query.interval.as_deref(), query.target.as_deref())
        .map_err(ledger_error)?;

    let transactions = ledger::collection_report(&state.db, &window)
        .await
        .map_err(ledger_error)?;
    info!(
        "Report for {} window starting {}: {} receipts",
        window.interval,
        window.start,
        transactions.len()
    );

    Ok(Json(ApiResponse::ok(
        "Report generated successfully",
        CollectionReport {
            interval: window.interval,
            start: window.start,
            end: window.end,
            transactions,
        },
    )))
}
