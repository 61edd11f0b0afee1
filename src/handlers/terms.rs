use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse, json_rejection, ledger_error};
use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use common::{ActiveTermDto, UpdateTermRequest};
use tracing::{debug, info, instrument, trace};
use validator::Validate;

/// Get the active semester and year
#[utoipa::path(
    get,
    path = "/api/term/active",
    tag = "terms",
    responses(
        (status = 200, description = "Active term", body = ApiResponse<ActiveTermDto>),
        (status = 404, description = "No active term has been set", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_active_term(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ActiveTermDto>>, ApiError> {
    trace!("Entering get_active_term function");
    let term = state.active_term().await.map_err(ledger_error)?;
    debug!("Active term is semester {}", term.semester_id);
    Ok(Json(ApiResponse::ok("Active term retrieved successfully", term)))
}

/// Create or activate a year/semester pair
#[utoipa::path(
    post,
    path = "/api/term/update",
    tag = "terms",
    request_body = UpdateTermRequest,
    responses(
        (status = 200, description = "Term activated", body = ApiResponse<ActiveTermDto>),
        (status = 400, description = "Year or semester missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_term(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTermRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ActiveTermDto>>, ApiError> {
    trace!("Entering update_term function");
    let Json(request) = payload.map_err(json_rejection)?;
    request
        .validate()
        .map_err(|e| ledger_error(e.into()))?;

    let term = ledger::activate_term(&state.db, &request.year, &request.semester)
        .await
        .map_err(ledger_error)?;

    state.term_cache.invalidate(&()).await;
    state.term_cache.insert((), term.clone()).await;
    info!("Term {} / {} activated", term.year, term.semester);

    Ok(Json(ApiResponse::ok("Term updated successfully", term)))
}
