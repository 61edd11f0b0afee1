use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Role flag value for fees that apply to non-officer students.
pub const ROLE_NON_OFFICER: &str = "0";
/// Role flag value for fees that apply to officer students.
pub const ROLE_OFFICER: &str = "1";

/// A fee definition belonging to exactly one semester.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub fee_id: i32,
    pub semester_id: i32,
    pub fee_name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub fee_amount: Decimal,
    /// `"0"` for non-officers, `"1"` for officers.
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::semester::Entity",
        from = "Column::SemesterId",
        to = "super::semester::Column::SemesterId",
        on_delete = "Cascade"
    )]
    Semester,
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Role flag matching an enrollment's officer flag.
pub fn role_for_officer(is_officer: bool) -> &'static str {
    if is_officer { ROLE_OFFICER } else { ROLE_NON_OFFICER }
}
