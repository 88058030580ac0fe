use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub coffee_id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))", nullable)]
    pub quantity: Option<Decimal>,
    /// Price per kilogram at the time the order was placed.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_price: Decimal,
}

impl Model {
    /// `quantity * unit_price` rounded to cents; zero when the quantity is missing.
    pub fn subtotal(&self) -> Decimal {
        self.quantity
            .map(|quantity| (quantity * self.unit_price).round_dp(2))
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::coffee_item::Entity",
        from = "Column::CoffeeId",
        to = "super::coffee_item::Column::Id"
    )]
    CoffeeItem,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::coffee_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoffeeItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
