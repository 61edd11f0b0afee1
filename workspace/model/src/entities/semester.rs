use sea_orm::entity::prelude::*;

/// A school half-year. Fees, enrollments and payments are all scoped to one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "semester")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub semester_id: i32,
    pub semester_name: String,
    pub year_id: i32,
    #[sea_orm(default_value = "false")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::year::Entity",
        from = "Column::YearId",
        to = "super::year::Column::YearId",
        on_delete = "Cascade"
    )]
    Year,
    #[sea_orm(has_many = "super::fee::Entity")]
    Fee,
}

impl Related<super::year::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Year.def()
    }
}

impl Related<super::fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
