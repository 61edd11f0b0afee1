use crate::schemas::{
    ApiError, ApiResponse, AppState, Empty, ErrorResponse, json_rejection, ledger_error,
};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use common::{CreateUserRequest, UserDto};
use serde::Serialize;
use tracing::{debug, instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<UserDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPayload {
    pub user: UserDto,
}

/// Create a staff user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserPayload>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "User ID already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserPayload>>), ApiError> {
    trace!("Entering create_user function");
    let Json(request) = payload.map_err(json_rejection)?;
    debug!("Creating user with ID: {}", request.user_id);

    let user = ledger::accounts::create_user(&state.db, request)
        .await
        .map_err(ledger_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User created successfully", UserPayload { user })),
    ))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<UserList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserList>>, ApiError> {
    trace!("Entering get_users function");
    let users = ledger::accounts::list_users(&state.db)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("Users retrieved successfully", UserList { users })))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserPayload>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);
    let user = ledger::accounts::get_user(&state.db, &user_id)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("User retrieved successfully", UserPayload { user })))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<Empty>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);
    ledger::accounts::delete_user(&state.db, &user_id)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("User deleted successfully", Empty {})))
}
