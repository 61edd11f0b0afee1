#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        match components.schemas.get(name).unwrap() {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();

        for name in [
            "ErrorResponse",
            "HealthResponse",
            "PostPaymentRequest",
            "PaymentPostingResult",
            "ReceiptDto",
            "ReportRowDto",
            "FeeDto",
            "StudentDto",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for key in ["success", "message", "code"] {
            assert!(properties.iter().any(|p| p == key), "missing {}", key);
        }
    }

    #[test]
    fn test_health_response_schema_structure() {
        let properties = object_properties("HealthResponse");
        for key in ["status", "version", "database"] {
            assert!(properties.iter().any(|p| p == key), "missing {}", key);
        }
    }

    #[test]
    fn test_payment_paths_are_documented() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        let post = paths
            .get("/api/payments")
            .and_then(|p| p.operations.get(&PathItemType::Post))
            .unwrap();
        for code in ["200", "201", "400", "404", "409", "500"] {
            assert!(post.responses.responses.contains_key(code), "missing {}", code);
        }

        for path in [
            "/health",
            "/api/login",
            "/api/term/active",
            "/api/term/update",
            "/api/fees",
            "/api/fees/history",
            "/api/fees/{fee_id}",
            "/api/payments/student/{student_id}",
            "/api/payments/student/{student_id}/transactions",
            "/api/payments/receipt/{control_number}",
            "/api/payments/reports/transactions",
            "/api/students",
            "/api/students/{student_id}",
            "/api/users/{user_id}",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
