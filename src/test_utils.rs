#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState::new(db, Duration::from_secs(60), Duration::from_secs(30))
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _guard = init_test_tracing();
        let state = setup_test_app_state().await;
        create_router(state)
    }

    pub async fn setup_test_server() -> TestServer {
        TestServer::new(setup_test_app().await).unwrap()
    }

    /// Activates a term through the API and returns its semester id.
    pub async fn activate(server: &TestServer, year: &str, semester: &str) -> i64 {
        let response = server
            .post("/api/term/update")
            .json(&json!({ "year": year, "semester": semester }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["semester_id"].as_i64().unwrap()
    }

    /// Adds a fee through the API and returns its id.
    pub async fn add_fee(
        server: &TestServer,
        semester_id: i64,
        name: &str,
        amount: &str,
        role: &str,
    ) -> i64 {
        let response = server
            .post("/api/fees")
            .json(&json!({
                "fee_name": name,
                "fee_amount": amount,
                "role": role,
                "semester_id": semester_id,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["fee_id"].as_i64().unwrap()
    }

    /// Enrolls a student through the API.
    pub async fn enroll(
        server: &TestServer,
        student_id: &str,
        first: &str,
        last: &str,
        semester_id: i64,
        is_officer: bool,
    ) {
        server
            .post("/api/students")
            .json(&json!({
                "student_id": student_id,
                "student_firstname": first,
                "student_lastname": last,
                "is_officer": is_officer,
                "semester_id": semester_id,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
}
