//! Common transport-layer types shared by the HTTP handlers and the ledger.
//! These structs are the request/response payloads of the JSON API so that
//! the domain services and the handlers agree on one shape.

pub mod money;
mod payments;
mod reports;

pub use payments::{
    PaymentDto, PaymentItemRequest, PaymentPostingResult, PostPaymentRequest, ReceiptDto,
    StudentTransactionDto,
};
pub use reports::{ReportInterval, ReportQuery, ReportRowDto};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// ===================== Terms =====================

/// The single active semester and its academic year.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ActiveTermDto {
    pub semester_id: i32,
    pub semester: String,
    pub year: String,
    pub year_id: i32,
}

/// Request body for creating or activating a year/semester pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct UpdateTermRequest {
    /// Academic year label, e.g. `2024-2025`
    #[serde(default)]
    #[validate(length(min = 1, message = "year is required"))]
    pub year: String,
    /// Semester label, e.g. `1st Semester`
    #[serde(default)]
    #[validate(length(min = 1, message = "semester is required"))]
    pub semester: String,
}

/// Optional semester filter; defaults to the active term.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct SemesterQuery {
    pub semester_id: Option<i32>,
}

// ===================== Fees =====================

/// Fee catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FeeDto {
    pub fee_id: i32,
    pub fee_name: String,
    pub fee_amount: Decimal,
    /// `"0"` non-officer, `"1"` officer
    pub role: String,
    pub semester_id: i32,
}

/// Request body for adding a fee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateFeeRequest {
    #[validate(length(min = 1, message = "fee_name is required"))]
    pub fee_name: String,
    pub fee_amount: Decimal,
    pub role: String,
    /// Defaults to the active semester
    pub semester_id: Option<i32>,
}

/// Request body for editing a fee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct UpdateFeeRequest {
    #[validate(range(min = 1, message = "fee_id must be positive"))]
    pub fee_id: i32,
    #[validate(length(min = 1, message = "fee_name is required"))]
    pub fee_name: String,
    pub fee_amount: Decimal,
    pub role: String,
}

/// Fee creation log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FeeHistoryDto {
    pub history_id: i32,
    pub fee_id: i32,
    pub semester_id: i32,
    pub fee_name: String,
    pub fee_amount: Decimal,
    pub role: String,
    pub created_at: NaiveDateTime,
}

// ===================== Students =====================

/// A student as enrolled in one semester.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StudentDto {
    pub student_id: String,
    pub student_firstname: String,
    pub student_lastname: String,
    pub semester_id: i32,
    pub department_id: Option<i32>,
    pub course_id: Option<i32>,
    pub status_id: i32,
    pub is_officer: bool,
    pub is_removed: bool,
}

/// Request body for enrolling a student in a semester.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "student_id is required"))]
    pub student_id: String,
    #[validate(length(min = 1, message = "student_firstname is required"))]
    pub student_firstname: String,
    #[validate(length(min = 1, message = "student_lastname is required"))]
    pub student_lastname: String,
    pub department_id: Option<i32>,
    pub course_id: Option<i32>,
    #[serde(default)]
    pub is_officer: bool,
    /// Defaults to the active semester
    pub semester_id: Option<i32>,
}

/// Request body for editing a student's enrollment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpdateStudentRequest {
    /// Defaults to the active semester
    pub semester_id: Option<i32>,
    pub student_firstname: Option<String>,
    pub student_lastname: Option<String>,
    pub department_id: Option<i32>,
    pub course_id: Option<i32>,
    pub is_officer: Option<bool>,
}

// ===================== Catalogs =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DepartmentDto {
    pub department_id: i32,
    pub department_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, message = "department_name is required"))]
    pub department_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CourseDto {
    pub course_id: i32,
    pub course_name: String,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "course_name is required"))]
    pub course_name: String,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StatusDto {
    pub status_id: i32,
    pub status_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RoleDto {
    pub role_id: i32,
    pub role_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, message = "role_name is required"))]
    pub role_name: String,
}

// ===================== Users =====================

/// Login credentials as sent by the sign-in form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct LoginRequest {
    #[serde(rename = "userId", default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Staff user without credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserDto {
    pub user_id: String,
    #[serde(rename = "user_firstName")]
    pub user_first_name: String,
    #[serde(rename = "user_lastName")]
    pub user_last_name: String,
    pub role_id: Option<i32>,
}

/// Request body for creating a staff user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(rename = "user_firstName")]
    #[validate(length(min = 1, message = "user_firstName is required"))]
    pub user_first_name: String,
    #[serde(rename = "user_lastName")]
    #[validate(length(min = 1, message = "user_lastName is required"))]
    pub user_last_name: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub role_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_uses_camel_case_user_id() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"userId":"admin","password":"secret"}"#).unwrap();
        assert_eq!(request.user_id, "admin");
        assert!(request.validate().is_ok());

        let empty: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_user_dto_field_names() {
        let dto = UserDto {
            user_id: "u1".to_string(),
            user_first_name: "Maria".to_string(),
            user_last_name: "Santos".to_string(),
            role_id: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["user_firstName"], "Maria");
        assert_eq!(json["user_lastName"], "Santos");
    }

    #[test]
    fn test_update_term_request_requires_both_labels() {
        let request = UpdateTermRequest {
            year: "2024-2025".to_string(),
            semester: String::new(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.to_string().contains("semester is required"));
    }
}
