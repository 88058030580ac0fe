use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// A stocked coffee. Quantities are kilograms with three decimals, prices are per kilogram.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coffee_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub type_id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))")]
    pub quantity_in_stock: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_per_kg: Decimal,
    pub description: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::coffee_type::Entity",
        from = "Column::TypeId",
        to = "super::coffee_type::Column::Id"
    )]
    CoffeeType,
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::coffee_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoffeeType.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        active_model.last_updated = Set(Utc::now());
        Ok(active_model)
    }
}
