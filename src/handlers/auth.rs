use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse, json_rejection, ledger_error};
use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use common::{LoginRequest, UserDto};
use serde::Serialize;
use tracing::{instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginPayload {
    pub user: UserDto,
}

/// Sign in with a user id and password
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginPayload>),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid user ID or password", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginPayload>>, ApiError> {
    trace!("Entering login function");
    let Json(request) = payload.map_err(json_rejection)?;

    let user = ledger::accounts::login(&state.db, request)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("Login successful", LoginPayload { user })))
}
