use crate::schemas::{
    ApiError, ApiResponse, AppState, Empty, ErrorResponse, json_rejection, ledger_error,
};
use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use common::{CreateStudentRequest, SemesterQuery, StudentDto, UpdateStudentRequest};
use serde::Serialize;
use tracing::{debug, instrument, trace};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentList {
    pub students: Vec<StudentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentPayload {
    pub student: StudentDto,
}

/// Enroll a student in a semester (defaults to the active one)
#[utoipa::path(
    post,
    path = "/api/students",
    tag = "students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student enrolled", body = ApiResponse<StudentPayload>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Student already enrolled in the semester", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<StudentPayload>>), ApiError> {
    trace!("Entering create_student function");
    let Json(request) = payload.map_err(json_rejection)?;

    let student = ledger::enrollment::enroll_student(&state.db, request, Local::now().naive_local())
        .await
        .map_err(ledger_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Student added successfully", StudentPayload { student })),
    ))
}

/// List the students enrolled in a semester
#[utoipa::path(
    get,
    path = "/api/students",
    tag = "students",
    params(SemesterQuery),
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<StudentList>),
        (status = 404, description = "No semester given and no active term", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<StudentList>>, ApiError> {
    trace!("Entering get_students function");
    let semester_id = state
        .semester_or_active(query.semester_id)
        .await
        .map_err(ledger_error)?;
    let students = ledger::enrollment::list_students(&state.db, semester_id)
        .await
        .map_err(ledger_error)?;
    debug!("Semester {} has {} students", semester_id, students.len());
    Ok(Json(ApiResponse::ok(
        "Students retrieved successfully",
        StudentList { students },
    )))
}

/// Get one student's enrollment
#[utoipa::path(
    get,
    path = "/api/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student ID"),
        SemesterQuery,
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<StudentPayload>),
        (status = 404, description = "Student not enrolled in the semester", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<StudentPayload>>, ApiError> {
    trace!("Entering get_student function for {}", student_id);
    let semester_id = state
        .semester_or_active(query.semester_id)
        .await
        .map_err(ledger_error)?;
    let student = ledger::enrollment::get_student(&state.db, &student_id, semester_id)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok(
        "Student retrieved successfully",
        StudentPayload { student },
    )))
}

/// Edit a student's enrollment and re-derive its status
#[utoipa::path(
    put,
    path = "/api/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student ID"),
    ),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<StudentPayload>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Student not enrolled in the semester", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<StudentPayload>>, ApiError> {
    trace!("Entering update_student function for {}", student_id);
    let Json(request) = payload.map_err(json_rejection)?;

    let student = ledger::enrollment::update_student(&state.db, &student_id, request)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok(
        "Student updated successfully",
        StudentPayload { student },
    )))
}

/// Remove a student from a semester; payments are kept
#[utoipa::path(
    delete,
    path = "/api/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student ID"),
        SemesterQuery,
    ),
    responses(
        (status = 200, description = "Student removed successfully", body = ApiResponse<Empty>),
        (status = 404, description = "Student not enrolled in the semester", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    trace!("Entering delete_student function for {}", student_id);
    let semester_id = state
        .semester_or_active(query.semester_id)
        .await
        .map_err(ledger_error)?;
    ledger::enrollment::remove_student(&state.db, &student_id, semester_id)
        .await
        .map_err(ledger_error)?;
    Ok(Json(ApiResponse::ok("Student removed successfully", Empty {})))
}
