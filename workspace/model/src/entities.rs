//! SeaORM entity modules for the fee-collection schema.
//!
//! Terms (`year`, `semester`) scope everything else. A student has one
//! immutable identity row and one enrollment row per semester; payments hang
//! off the identity and reference fees by id only.

pub mod course;
pub mod department;
pub mod fee;
pub mod history_fee;
pub mod payment;
pub mod role;
pub mod semester;
pub mod status;
pub mod student;
pub mod student_enrollment;
pub mod user;
pub mod year;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::course::Entity as Course;
    pub use super::department::Entity as Department;
    pub use super::fee::Entity as Fee;
    pub use super::history_fee::Entity as HistoryFee;
    pub use super::payment::Entity as Payment;
    pub use super::role::Entity as Role;
    pub use super::semester::Entity as Semester;
    pub use super::status::Entity as Status;
    pub use super::student::Entity as Student;
    pub use super::student_enrollment::Entity as StudentEnrollment;
    pub use super::user::Entity as User;
    pub use super::year::Entity as Year;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn at(hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 12)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let year = year::ActiveModel {
            year_name: Set("2024-2025".to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let first = semester::ActiveModel {
            semester_name: Set("1st Semester".to_string()),
            year_id: Set(year.year_id),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let membership = fee::ActiveModel {
            semester_id: Set(first.semester_id),
            fee_name: Set("Membership".to_string()),
            fee_amount: Set(Decimal::new(30000, 2)),
            role: Set(fee::ROLE_NON_OFFICER.to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let student = student::ActiveModel {
            student_id: Set("2021-0001".to_string()),
            student_firstname: Set("Ana".to_string()),
            student_lastname: Set("Reyes".to_string()),
            created_at: Set(at(8)),
        }
        .insert(&db)
        .await?;

        student_enrollment::ActiveModel {
            student_id: Set(student.student_id.clone()),
            semester_id: Set(first.semester_id),
            department_id: Set(None),
            course_id: Set(None),
            status_id: Set(1),
            is_officer: Set(false),
            is_removed: Set(false),
            created_at: Set(at(8)),
        }
        .insert(&db)
        .await?;

        let payment = payment::ActiveModel {
            student_id: Set(student.student_id.clone()),
            semester_id: Set(first.semester_id),
            fee_id: Set(membership.fee_id),
            amount_paid: Set(Decimal::new(30000, 2)),
            payment_date: Set(at(9)),
            control_number: Set("C-0001".to_string()),
            issued_by: Set("treasurer".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Semester belongs to its year
        let parent = first.find_related(Year).one(&db).await?.unwrap();
        assert_eq!(parent.year_name, "2024-2025");

        // Enrollment is reachable from the identity
        let enrollments = student.find_related(StudentEnrollment).all(&db).await?;
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].semester_id, first.semester_id);

        // Payment joins back to its fee name
        let (_, joined_fee) = Payment::find_by_id(payment.payment_id)
            .find_also_related(Fee)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(joined_fee.unwrap().fee_name, "Membership");

        // Statuses are seeded
        let statuses = Status::find().all(&db).await?;
        assert!(statuses.iter().any(|s| s.status_id == 1 && s.status_name == "Unpaid"));
        assert!(statuses.iter().any(|s| s.status_id == 2 && s.status_name == "Paid"));

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_triple_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let year = year::ActiveModel {
            year_name: Set("2024-2025".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let term = semester::ActiveModel {
            semester_name: Set("2nd Semester".to_string()),
            year_id: Set(year.year_id),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        student::ActiveModel {
            student_id: Set("2021-0002".to_string()),
            student_firstname: Set("Ben".to_string()),
            student_lastname: Set("Cruz".to_string()),
            created_at: Set(at(8)),
        }
        .insert(&db)
        .await?;

        let row = |control: &str| payment::ActiveModel {
            student_id: Set("2021-0002".to_string()),
            semester_id: Set(term.semester_id),
            fee_id: Set(7),
            amount_paid: Set(Decimal::new(35000, 2)),
            payment_date: Set(at(10)),
            control_number: Set(control.to_string()),
            issued_by: Set("treasurer".to_string()),
            ..Default::default()
        };

        row("C-1").insert(&db).await?;
        assert!(row("C-2").insert(&db).await.is_err());

        let stored = Payment::find()
            .filter(payment::Column::StudentId.eq("2021-0002"))
            .all(&db)
            .await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].control_number, "C-1");

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_survives_fee_deletion() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let year = year::ActiveModel {
            year_name: Set("2025-2026".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let term = semester::ActiveModel {
            semester_name: Set("1st Semester".to_string()),
            year_id: Set(year.year_id),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let shirt = fee::ActiveModel {
            semester_id: Set(term.semester_id),
            fee_name: Set("Org Shirt".to_string()),
            fee_amount: Set(Decimal::new(25000, 2)),
            role: Set(fee::ROLE_OFFICER.to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        student::ActiveModel {
            student_id: Set("2022-0100".to_string()),
            student_firstname: Set("Carla".to_string()),
            student_lastname: Set("Diaz".to_string()),
            created_at: Set(at(8)),
        }
        .insert(&db)
        .await?;
        let paid = payment::ActiveModel {
            student_id: Set("2022-0100".to_string()),
            semester_id: Set(term.semester_id),
            fee_id: Set(shirt.fee_id),
            amount_paid: Set(Decimal::new(25000, 2)),
            payment_date: Set(at(11)),
            control_number: Set("C-9".to_string()),
            issued_by: Set("treasurer".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        Fee::delete_by_id(shirt.fee_id).exec(&db).await?;

        let (kept, missing_fee) = Payment::find_by_id(paid.payment_id)
            .find_also_related(Fee)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(kept.fee_id, shirt.fee_id);
        assert!(missing_fee.is_none());

        Ok(())
    }
}
