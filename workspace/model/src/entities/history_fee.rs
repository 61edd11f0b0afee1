use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Append-only log of fee creations.
///
/// `fee_id` is deliberately not a foreign key: the row must survive deletion of
/// the fee it describes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "history_fee")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub history_id: i32,
    pub fee_id: i32,
    pub semester_id: i32,
    pub fee_name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub fee_amount: Decimal,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
