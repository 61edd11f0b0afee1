use crate::handlers::{
    auth::login,
    catalog::{
        create_course, create_department, create_role, get_courses, get_departments, get_roles,
        get_statuses,
    },
    fees::{create_fee, delete_fee, get_fee_history, get_fees, update_fee},
    health::health_check,
    payments::{get_receipt, get_student_payments, get_student_transactions, post_payments},
    reports::get_transactions_report,
    students::{create_student, delete_student, get_student, get_students, update_student},
    terms::{get_active_term, update_term},
    users::{create_user, delete_user, get_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/api/login", post(login))
        // Term registry
        .route("/api/term/active", get(get_active_term))
        .route("/api/term/update", post(update_term))
        // Fee catalog
        .route("/api/fees", get(get_fees).post(create_fee).put(update_fee))
        .route("/api/fees/history", get(get_fee_history))
        .route("/api/fees/:fee_id", delete(delete_fee))
        // Payment ledger
        .route("/api/payments", post(post_payments))
        .route("/api/payments/student/:student_id", get(get_student_payments))
        .route(
            "/api/payments/student/:student_id/transactions",
            get(get_student_transactions),
        )
        .route("/api/payments/receipt/:control_number", get(get_receipt))
        .route(
            "/api/payments/reports/transactions",
            get(get_transactions_report),
        )
        // Students and lookup tables
        .route("/api/students", get(get_students).post(create_student))
        .route(
            "/api/students/:student_id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/api/departments", get(get_departments).post(create_department))
        .route("/api/courses", get(get_courses).post(create_course))
        .route("/api/status", get(get_statuses))
        .route("/api/roles", get(get_roles).post(create_role))
        // Staff users
        .route("/api/users", get(get_users).post(create_user))
        .route("/api/users/:user_id", get(get_user).delete(delete_user))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
