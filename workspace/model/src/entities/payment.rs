use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// One fee paid by one student in one semester.
///
/// Rows sharing a `control_number` form a single receipt. The storage layer
/// keeps `(student_id, semester_id, fee_id)` unique. `fee_id` is a lookup key
/// only; the fee may since have been deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub payment_id: i32,
    pub student_id: String,
    pub semester_id: i32,
    pub fee_id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount_paid: Decimal,
    pub payment_date: NaiveDateTime,
    pub control_number: String,
    pub issued_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fee::Entity",
        from = "Column::FeeId",
        to = "super::fee::Column::FeeId"
    )]
    Fee,
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::StudentId"
    )]
    Student,
}

impl Related<super::fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fee.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
