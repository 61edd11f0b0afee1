//! Lookup tables used by the enrollment forms.

use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse, json_rejection, ledger_error};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use common::{
    CourseDto, CreateCourseRequest, CreateDepartmentRequest, CreateRoleRequest, DepartmentDto,
    RoleDto, StatusDto,
};
use ledger::{LedgerError, error::is_unique_violation};
use model::entities::{course, department, role, status};
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, QueryOrder, Set};
use serde::Serialize;
use tracing::{info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentList {
    pub departments: Vec<DepartmentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseList {
    pub courses: Vec<CourseDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleList {
    pub roles: Vec<RoleDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusList {
    pub statuses: Vec<StatusDto>,
}

fn db_error(err: DbErr) -> ApiError {
    ledger_error(LedgerError::from(err))
}

fn conflict_or_db(err: DbErr, what: &str, name: &str) -> ApiError {
    if is_unique_violation(&err) {
        ledger_error(LedgerError::Conflict(format!("{} '{}' already exists", what, name)))
    } else {
        db_error(err)
    }
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "catalog",
    responses(
        (status = 200, description = "Departments retrieved successfully", body = ApiResponse<DepartmentList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_departments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DepartmentList>>, ApiError> {
    trace!("Entering get_departments function");
    let departments = department::Entity::find()
        .order_by_asc(department::Column::DepartmentName)
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|d| DepartmentDto {
            department_id: d.department_id,
            department_name: d.department_name,
        })
        .collect();
    Ok(Json(ApiResponse::ok(
        "Departments retrieved successfully",
        DepartmentList { departments },
    )))
}

/// Add a department
#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "catalog",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created successfully", body = ApiResponse<DepartmentDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Department already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_department(
    State(state): State<AppState>,
    payload: Result<Json<CreateDepartmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<DepartmentDto>>), ApiError> {
    trace!("Entering create_department function");
    let Json(request) = payload.map_err(json_rejection)?;
    request.validate().map_err(|e| ledger_error(e.into()))?;
    let name = request.department_name.trim().to_string();

    let created = department::ActiveModel {
        department_name: Set(name.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_or_db(e, "Department", &name))?;

    info!("Department {} created", created.department_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Department created successfully",
            DepartmentDto {
                department_id: created.department_id,
                department_name: created.department_name,
            },
        )),
    ))
}

/// List courses
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "catalog",
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<CourseList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CourseList>>, ApiError> {
    trace!("Entering get_courses function");
    let courses = course::Entity::find()
        .order_by_asc(course::Column::CourseName)
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|c| CourseDto {
            course_id: c.course_id,
            course_name: c.course_name,
            department_id: c.department_id,
        })
        .collect();
    Ok(Json(ApiResponse::ok(
        "Courses retrieved successfully",
        CourseList { courses },
    )))
}

/// Add a course, optionally under a department
#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "catalog",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created successfully", body = ApiResponse<CourseDto>),
        (status = 400, description = "Invalid request or unknown department", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CourseDto>>), ApiError> {
    trace!("Entering create_course function");
    let Json(request) = payload.map_err(json_rejection)?;
    request.validate().map_err(|e| ledger_error(e.into()))?;

    if let Some(department_id) = request.department_id {
        let exists = department::Entity::find_by_id(department_id)
            .one(&state.db)
            .await
            .map_err(db_error)?;
        if exists.is_none() {
            return Err(ledger_error(LedgerError::validation(format!(
                "Department {} does not exist",
                department_id
            ))));
        }
    }

    let created = course::ActiveModel {
        course_name: Set(request.course_name.trim().to_string()),
        department_id: Set(request.department_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Course {} created", created.course_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Course created successfully",
            CourseDto {
                course_id: created.course_id,
                course_name: created.course_name,
                department_id: created.department_id,
            },
        )),
    ))
}

/// List the enrollment statuses
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "catalog",
    responses(
        (status = 200, description = "Statuses retrieved successfully", body = ApiResponse<StatusList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_statuses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatusList>>, ApiError> {
    trace!("Entering get_statuses function");
    let statuses = status::Entity::find()
        .order_by_asc(status::Column::StatusId)
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|s| StatusDto {
            status_id: s.status_id,
            status_name: s.status_name,
        })
        .collect();
    Ok(Json(ApiResponse::ok(
        "Statuses retrieved successfully",
        StatusList { statuses },
    )))
}

/// List staff roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "catalog",
    responses(
        (status = 200, description = "Roles retrieved successfully", body = ApiResponse<RoleList>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RoleList>>, ApiError> {
    trace!("Entering get_roles function");
    let roles = role::Entity::find()
        .order_by_asc(role::Column::RoleId)
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|r| RoleDto {
            role_id: r.role_id,
            role_name: r.role_name,
        })
        .collect();
    Ok(Json(ApiResponse::ok("Roles retrieved successfully", RoleList { roles })))
}

/// Add a staff role
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "catalog",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created successfully", body = ApiResponse<RoleDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Role already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_role(
    State(state): State<AppState>,
    payload: Result<Json<CreateRoleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RoleDto>>), ApiError> {
    trace!("Entering create_role function");
    let Json(request) = payload.map_err(json_rejection)?;
    request.validate().map_err(|e| ledger_error(e.into()))?;
    let name = request.role_name.trim().to_string();

    let created = role::ActiveModel {
        role_name: Set(name.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_or_db(e, "Role", &name))?;

    info!("Role {} created", created.role_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Role created successfully",
            RoleDto {
                role_id: created.role_id,
                role_name: created.role_name,
            },
        )),
    ))
}
