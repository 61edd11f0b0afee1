use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// A student's record for one semester, holding the derived payment status.
/// Keyed by `(student_id, semester_id)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student_enrollment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub semester_id: i32,
    pub department_id: Option<i32>,
    pub course_id: Option<i32>,
    pub status_id: i32,
    #[sea_orm(default_value = "false")]
    pub is_officer: bool,
    #[sea_orm(default_value = "false")]
    pub is_removed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::StudentId",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::semester::Entity",
        from = "Column::SemesterId",
        to = "super::semester::Column::SemesterId",
        on_delete = "Cascade"
    )]
    Semester,
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::StatusId"
    )]
    Status,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
