//! Student identities and their per-semester enrollments.

use chrono::NaiveDateTime;
use common::{CreateStudentRequest, StudentDto, UpdateStudentRequest};
use model::entities::{student, student_enrollment};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::catalog::{applicable_fee_ids, semester_fees};
use crate::error::{LedgerError, Result, is_unique_violation};
use crate::status::{TermStatus, recompute_status};
use crate::term::resolve_semester;

fn to_dto(enrollment: student_enrollment::Model, identity: student::Model) -> StudentDto {
    StudentDto {
        student_id: identity.student_id,
        student_firstname: identity.student_firstname,
        student_lastname: identity.student_lastname,
        semester_id: enrollment.semester_id,
        department_id: enrollment.department_id,
        course_id: enrollment.course_id,
        status_id: enrollment.status_id,
        is_officer: enrollment.is_officer,
        is_removed: enrollment.is_removed,
    }
}

fn enrollment_not_found(student_id: &str, semester_id: i32) -> LedgerError {
    LedgerError::not_found(format!(
        "Student {} is not enrolled in semester {}",
        student_id, semester_id
    ))
}

/// Creates or refreshes the identity and enrolls it as Unpaid.
#[instrument(skip(db))]
pub async fn enroll_student(
    db: &DatabaseConnection,
    request: CreateStudentRequest,
    now: NaiveDateTime,
) -> Result<StudentDto> {
    request.validate()?;
    let student_id = request.student_id.trim().to_string();

    let txn = db.begin().await?;
    let semester_id = resolve_semester(&txn, request.semester_id).await?;

    if student_enrollment::Entity::find_by_id((student_id.clone(), semester_id))
        .one(&txn)
        .await?
        .is_some()
    {
        warn!("Student {} already enrolled in semester {}", student_id, semester_id);
        return Err(LedgerError::Conflict(format!(
            "Student {} is already enrolled in semester {}",
            student_id, semester_id
        )));
    }

    let identity = match student::Entity::find_by_id(student_id.clone()).one(&txn).await? {
        Some(existing) => {
            debug!("Refreshing identity of student {}", student_id);
            let mut active: student::ActiveModel = existing.into();
            active.student_firstname = Set(request.student_firstname.trim().to_string());
            active.student_lastname = Set(request.student_lastname.trim().to_string());
            active.update(&txn).await?
        }
        None => {
            student::ActiveModel {
                student_id: Set(student_id.clone()),
                student_firstname: Set(request.student_firstname.trim().to_string()),
                student_lastname: Set(request.student_lastname.trim().to_string()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?
        }
    };

    let enrollment = student_enrollment::ActiveModel {
        student_id: Set(student_id.clone()),
        semester_id: Set(semester_id),
        department_id: Set(request.department_id),
        course_id: Set(request.course_id),
        status_id: Set(TermStatus::Unpaid.id()),
        is_officer: Set(request.is_officer),
        is_removed: Set(false),
        created_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            LedgerError::Conflict(format!(
                "Student {} is already enrolled in semester {}",
                student_id, semester_id
            ))
        } else {
            LedgerError::from(err)
        }
    })?;

    txn.commit().await?;
    info!("Enrolled student {} in semester {}", student_id, semester_id);
    Ok(to_dto(enrollment, identity))
}

/// Non-removed enrollments of a semester, ordered by last name.
pub async fn list_students<C: ConnectionTrait>(
    conn: &C,
    semester_id: i32,
) -> Result<Vec<StudentDto>> {
    let rows = student_enrollment::Entity::find()
        .filter(student_enrollment::Column::SemesterId.eq(semester_id))
        .filter(student_enrollment::Column::IsRemoved.eq(false))
        .find_also_related(student::Entity)
        .order_by_asc(student::Column::StudentLastname)
        .order_by_asc(student::Column::StudentFirstname)
        .order_by_asc(student_enrollment::Column::StudentId)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(enrollment, identity)| identity.map(|identity| to_dto(enrollment, identity)))
        .collect())
}

pub async fn get_student<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    semester_id: i32,
) -> Result<StudentDto> {
    let found = student_enrollment::Entity::find_by_id((student_id.to_string(), semester_id))
        .find_also_related(student::Entity)
        .one(conn)
        .await?;
    match found {
        Some((enrollment, Some(identity))) => Ok(to_dto(enrollment, identity)),
        _ => Err(enrollment_not_found(student_id, semester_id)),
    }
}

/// Applies the given changes and re-derives the status from the catalog.
/// Exempt enrollments keep their status.
#[instrument(skip(db))]
pub async fn update_student(
    db: &DatabaseConnection,
    student_id: &str,
    request: UpdateStudentRequest,
) -> Result<StudentDto> {
    let txn = db.begin().await?;
    let semester_id = resolve_semester(&txn, request.semester_id).await?;

    let (enrollment, identity) = match student_enrollment::Entity::find_by_id((
        student_id.to_string(),
        semester_id,
    ))
    .find_also_related(student::Entity)
    .one(&txn)
    .await?
    {
        Some((enrollment, Some(identity))) => (enrollment, identity),
        _ => return Err(enrollment_not_found(student_id, semester_id)),
    };

    let identity = if request.student_firstname.is_some() || request.student_lastname.is_some() {
        let mut active: student::ActiveModel = identity.into();
        if let Some(first) = request.student_firstname.as_deref().map(str::trim) {
            if first.is_empty() {
                return Err(LedgerError::validation("student_firstname must not be empty"));
            }
            active.student_firstname = Set(first.to_string());
        }
        if let Some(last) = request.student_lastname.as_deref().map(str::trim) {
            if last.is_empty() {
                return Err(LedgerError::validation("student_lastname must not be empty"));
            }
            active.student_lastname = Set(last.to_string());
        }
        active.update(&txn).await?
    } else {
        identity
    };

    let is_exempt = TermStatus::from_id(enrollment.status_id) == Some(TermStatus::Exempt);
    let unchanged = enrollment.clone();
    let mut active: student_enrollment::ActiveModel = enrollment.into();
    if request.department_id.is_some() {
        active.department_id = Set(request.department_id);
    }
    if request.course_id.is_some() {
        active.course_id = Set(request.course_id);
    }
    if let Some(is_officer) = request.is_officer {
        active.is_officer = Set(is_officer);
    }
    let mut enrollment = if active.is_changed() {
        active.update(&txn).await?
    } else {
        unchanged
    };

    if !is_exempt {
        let fees = semester_fees(&txn, semester_id).await?;
        let considered = applicable_fee_ids(&fees, enrollment.is_officer);
        let outcome = recompute_status(&txn, student_id, semester_id, &considered).await?;
        enrollment.status_id = outcome.status.id();
    }

    txn.commit().await?;
    info!("Updated student {} for semester {}", student_id, semester_id);
    Ok(to_dto(enrollment, identity))
}

/// Soft-removes an enrollment; payments and identity are kept.
#[instrument(skip(conn))]
pub async fn remove_student<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    semester_id: i32,
) -> Result<()> {
    let result = student_enrollment::Entity::update_many()
        .col_expr(student_enrollment::Column::IsRemoved, Expr::value(true))
        .filter(student_enrollment::Column::StudentId.eq(student_id))
        .filter(student_enrollment::Column::SemesterId.eq(semester_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        warn!("No enrollment of {} in semester {} to remove", student_id, semester_id);
        return Err(enrollment_not_found(student_id, semester_id));
    }
    info!("Removed student {} from semester {}", student_id, semester_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn create_request(id: &str, semester_id: Option<i32>) -> CreateStudentRequest {
        CreateStudentRequest {
            student_id: id.to_string(),
            student_firstname: "Ana".to_string(),
            student_lastname: "Cruz".to_string(),
            department_id: None,
            course_id: None,
            is_officer: false,
            semester_id,
        }
    }

    #[tokio::test]
    async fn test_enroll_twice_conflicts_but_new_term_is_fine() {
        let db = setup_db().await.unwrap();
        let old = seed_term(&db, "2023-2024", "2nd Semester", false).await;
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        let now = at(2024, 6, 1, 8, 0);

        let created = enroll_student(&db, create_request("S1", None), now).await.unwrap();
        assert_eq!(created.semester_id, sem);
        assert_eq!(created.status_id, TermStatus::Unpaid.id());

        let err = enroll_student(&db, create_request("S1", None), now).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        let mut renamed = create_request("S1", Some(old));
        renamed.student_lastname = "Cruz-Reyes".to_string();
        enroll_student(&db, renamed, now).await.unwrap();

        let current = get_student(&db, "S1", sem).await.unwrap();
        assert_eq!(current.student_lastname, "Cruz-Reyes");
    }

    #[tokio::test]
    async fn test_officer_flag_change_rederives_status() {
        let db = setup_db().await.unwrap();
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        let regular = seed_fee(&db, sem, "Org Fee", "100", "0").await;
        seed_fee(&db, sem, "Officer Fee", "200", "1").await;
        seed_student(&db, "S1", "Ana", "Cruz", sem, false).await;
        seed_payment(&db, "S1", sem, regular, "100", "C1", at(2024, 6, 3, 9, 0)).await;

        let updated = update_student(
            &db,
            "S1",
            UpdateStudentRequest { semester_id: Some(sem), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(updated.status_id, TermStatus::Paid.id());

        let updated = update_student(
            &db,
            "S1",
            UpdateStudentRequest { is_officer: Some(true), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(updated.is_officer);
        assert_eq!(updated.status_id, TermStatus::Unpaid.id());
        assert_eq!(enrollment_status(&db, "S1", sem).await, TermStatus::Unpaid.id());
    }

    #[tokio::test]
    async fn test_remove_hides_from_listing() {
        let db = setup_db().await.unwrap();
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        seed_student(&db, "S1", "Ana", "Cruz", sem, false).await;
        seed_student(&db, "S2", "Ben", "Abad", sem, false).await;

        let listed = list_students(&db, sem).await.unwrap();
        assert_eq!(
            listed.iter().map(|s| s.student_id.as_str()).collect::<Vec<_>>(),
            vec!["S2", "S1"]
        );

        remove_student(&db, "S2", sem).await.unwrap();
        let listed = list_students(&db, sem).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(get_student(&db, "S2", sem).await.unwrap().is_removed);

        assert!(matches!(
            remove_student(&db, "S9", sem).await.unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_exempt_enrollment_keeps_status_on_update() {
        let db = setup_db().await.unwrap();
        let sem = seed_term(&db, "2024-2025", "1st Semester", true).await;
        let regular = seed_fee(&db, sem, "Org Fee", "100", "0").await;
        seed_fee(&db, sem, "Officer Fee", "200", "1").await;
        seed_student(&db, "S1", "Ana", "Cruz", sem, false).await;
        student_enrollment::Entity::update_many()
            .col_expr(
                student_enrollment::Column::StatusId,
                Expr::value(TermStatus::Exempt.id()),
            )
            .filter(student_enrollment::Column::StudentId.eq("S1"))
            .exec(&db)
            .await
            .unwrap();

        let updated = update_student(
            &db,
            "S1",
            UpdateStudentRequest { is_officer: Some(true), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(updated.is_officer);
        assert_eq!(updated.status_id, TermStatus::Exempt.id());

        // Every applicable fee paid would derive Paid for anyone else.
        seed_payment(&db, "S1", sem, regular, "100", "C1", at(2024, 6, 3, 9, 0)).await;
        let updated = update_student(
            &db,
            "S1",
            UpdateStudentRequest { is_officer: Some(false), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(updated.status_id, TermStatus::Exempt.id());
        assert_eq!(enrollment_status(&db, "S1", sem).await, TermStatus::Exempt.id());
    }
}
