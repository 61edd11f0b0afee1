use crate::schemas::{
    ApiError, ApiResponse, AppState, Empty, ErrorResponse, json_rejection, ledger_error,
};
use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use common::{CreateFeeRequest, FeeDto, FeeHistoryDto, SemesterQuery, UpdateFeeRequest};
use serde::Serialize;
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeeList {
    pub fees: Vec<FeeDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeeHistoryList {
    pub history: Vec<FeeHistoryDto>,
}

/// List the fee catalog of a semester (defaults to the active one)
#[utoipa::path(
    get,
    path = "/api/fees",
    tag = "fees",
    params(SemesterQuery),
    responses(
        (status = 200, description = "Fees retrieved successfully", body = ApiResponse<FeeList>),
        (status = 404, description = "No semester given and no active term", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_fees(
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<FeeList>>, ApiError> {
    trace!("Entering get_fees function");
    let semester_id = state
        .semester_or_active(query.semester_id)
        .await
        .map_err(ledger_error)?;

    let fees = ledger::catalog::list_fees(&state.db, semester_id)
        .await
        .map_err(ledger_error)?;
    debug!("Retrieved {} fees for semester {}", fees.len(), semester_id);
    Ok(Json(ApiResponse::ok("Fees retrieved successfully", FeeList { fees })))
}

/// Add a fee; a creation log row is written with it
#[utoipa::path(
    post,
    path = "/api/fees",
    tag = "fees",
    request_body = CreateFeeRequest,
    responses(
        (status = 201, description = "Fee created successfully", body = ApiResponse<FeeDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Semester not found or no active term", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_fee(
    State(state): State<AppState>,
    payload: Result<Json<CreateFeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<FeeDto>>), ApiError> {
    trace!("Entering create_fee function");
    let Json(request) = payload.map_err(json_rejection)?;

    let fee = ledger::catalog::create_fee(&state.db, request, Local::now().naive_local())
        .await
        .map_err(ledger_error)?;
    info!("Fee {} created in semester {}", fee.fee_id, fee.semester_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Fee added successfully", fee)),
    ))
}

/// Edit a fee's name, amount or role
#[utoipa::path(
    put,
    path = "/api/fees",
    tag = "fees",
    request_body = UpdateFeeRequest,
    responses(
        (status = 200, description = "Fee updated successfully", body = ApiResponse<FeeDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Fee not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_fee(
    State(state): State<AppState>,
    payload: Result<Json<UpdateFeeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<FeeDto>>, ApiError> {
    trace!("Entering update_fee function");
    let Json(request) = payload.map_err(json_rejection)?;

    let fee = ledger::catalog::update_fee(&state.db, request)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("Fee updated successfully", fee)))
}

/// Remove a fee; its payments and log rows are kept
#[utoipa::path(
    delete,
    path = "/api/fees/{fee_id}",
    tag = "fees",
    params(
        ("fee_id" = i32, Path, description = "Fee ID"),
    ),
    responses(
        (status = 200, description = "Fee deleted successfully", body = ApiResponse<Empty>),
        (status = 404, description = "Fee not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_fee(
    Path(fee_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    trace!("Entering delete_fee function for fee_id: {}", fee_id);
    ledger::catalog::delete_fee(&state.db, fee_id)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("Fee deleted successfully", Empty {})))
}

/// List the fee creation log
#[utoipa::path(
    get,
    path = "/api/fees/history",
    tag = "fees",
    params(SemesterQuery),
    responses(
        (status = 200, description = "Fee history retrieved successfully", body = ApiResponse<FeeHistoryList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_fee_history(
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<FeeHistoryList>>, ApiError> {
    trace!("Entering get_fee_history function");
    let history = ledger::catalog::fee_history(&state.db, query.semester_id)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok(
        "Fee history retrieved successfully",
        FeeHistoryList { history },
    )))
}
