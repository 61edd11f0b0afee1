use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use common::{
    ActiveTermDto, CourseDto, CreateCourseRequest, CreateDepartmentRequest, CreateFeeRequest,
    CreateRoleRequest, CreateStudentRequest, CreateUserRequest, DepartmentDto, FeeDto,
    FeeHistoryDto, LoginRequest, PaymentDto, PaymentItemRequest, PaymentPostingResult,
    PostPaymentRequest, ReceiptDto, ReportInterval, ReportRowDto, RoleDto, StatusDto,
    StudentDto, StudentTransactionDto, UpdateFeeRequest, UpdateStudentRequest, UpdateTermRequest,
    UserDto,
};
use ledger::LedgerError;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// The active term, cleared whenever a term is activated
    pub term_cache: Cache<(), ActiveTermDto>,
    /// Per-request timeout applied by the router
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        term_cache_ttl: Duration,
        request_timeout: Duration,
    ) -> Self {
        let term_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(term_cache_ttl)
            .build();
        Self {
            db,
            term_cache,
            request_timeout,
        }
    }

    /// Active term, served from the cache when present.
    pub async fn active_term(&self) -> ledger::Result<ActiveTermDto> {
        if let Some(term) = self.term_cache.get(&()).await {
            return Ok(term);
        }
        let term = ledger::active_term(&self.db).await?;
        self.term_cache.insert((), term.clone()).await;
        Ok(term)
    }

    /// The requested semester, or the active one.
    pub async fn semester_or_active(&self, requested: Option<i32>) -> ledger::Result<i32> {
        match requested {
            Some(semester_id) => Ok(semester_id),
            None => Ok(self.active_term().await?.semester_id),
        }
    }
}

/// API response wrapper. The payload's fields sit next to `success` and
/// `message` in the JSON body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Success status
    pub success: bool,
    /// Response message
    pub message: String,
    /// Response data
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Payload for responses that carry only the message.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Success status (always false for errors)
    pub success: bool,
    /// Human-readable message, shown to the cashier as is
    pub message: String,
    /// Error code
    pub code: String,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
            code: code.to_string(),
        }),
    )
}

pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Conflict(_) => StatusCode::CONFLICT,
        LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Converts a ledger error into the JSON error shape, logging it at the
/// level its class deserves.
pub fn ledger_error(err: LedgerError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected ({}): {}", status, err);
    }
    error_response(status, err.code(), err.to_string())
}

/// Reports an unreadable JSON body in the JSON error shape.
pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection.body_text());
    error_response(
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        rejection.body_text(),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::terms::get_active_term,
        crate::handlers::terms::update_term,
        crate::handlers::fees::get_fees,
        crate::handlers::fees::create_fee,
        crate::handlers::fees::update_fee,
        crate::handlers::fees::delete_fee,
        crate::handlers::fees::get_fee_history,
        crate::handlers::payments::post_payments,
        crate::handlers::payments::get_student_payments,
        crate::handlers::payments::get_student_transactions,
        crate::handlers::payments::get_receipt,
        crate::handlers::reports::get_transactions_report,
        crate::handlers::students::create_student,
        crate::handlers::students::get_students,
        crate::handlers::students::get_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::catalog::get_departments,
        crate::handlers::catalog::create_department,
        crate::handlers::catalog::get_courses,
        crate::handlers::catalog::create_course,
        crate::handlers::catalog::get_statuses,
        crate::handlers::catalog::get_roles,
        crate::handlers::catalog::create_role,
        crate::handlers::users::get_users,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ActiveTermDto,
            UpdateTermRequest,
            FeeDto,
            CreateFeeRequest,
            UpdateFeeRequest,
            FeeHistoryDto,
            PaymentItemRequest,
            PostPaymentRequest,
            PaymentPostingResult,
            PaymentDto,
            StudentTransactionDto,
            ReceiptDto,
            ReportInterval,
            ReportRowDto,
            StudentDto,
            CreateStudentRequest,
            UpdateStudentRequest,
            DepartmentDto,
            CreateDepartmentRequest,
            CourseDto,
            CreateCourseRequest,
            StatusDto,
            RoleDto,
            CreateRoleRequest,
            LoginRequest,
            UserDto,
            CreateUserRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Staff sign-in"),
        (name = "terms", description = "Active academic year and semester"),
        (name = "fees", description = "Per-semester fee catalog"),
        (name = "payments", description = "Payment posting, histories and receipts"),
        (name = "reports", description = "Collection reports"),
        (name = "students", description = "Student enrollments"),
        (name = "catalog", description = "Departments, courses, roles and statuses"),
        (name = "users", description = "Staff accounts"),
    ),
    info(
        title = "FeeLedger API",
        description = "School fee collection: fee catalogs, payment posting with receipts, and collection reports",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
