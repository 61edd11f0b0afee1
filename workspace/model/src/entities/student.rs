use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// Immutable identity of a student, independent of any term.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: String,
    pub student_firstname: String,
    pub student_lastname: String,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student_enrollment::Entity")]
    Enrollment,
}

impl Related<super::student_enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Name as printed on receipts and reports.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.student_firstname, self.student_lastname)
    }
}
