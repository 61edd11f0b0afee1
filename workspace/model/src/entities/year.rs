use sea_orm::entity::prelude::*;

/// An academic year such as `2024-2025`.
/// At most one year is active at a time, always the parent of the active semester.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "year")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub year_id: i32,
    #[sea_orm(unique)]
    pub year_name: String,
    #[sea_orm(default_value = "false")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::semester::Entity")]
    Semester,
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
