use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_statuses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    /// Operator-facing name.
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The seeded rows of `order_statuses`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatusCode {
    Pending,
    Cancelled,
    Completed,
}

impl OrderStatusCode {
    pub const ALL: [OrderStatusCode; 3] = [Self::Pending, Self::Cancelled, Self::Completed];

    pub fn id(self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::Cancelled => 2,
            Self::Completed => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.id() == id)
    }

    /// Status assigned to every order at checkout.
    pub fn initial() -> Self {
        Self::Completed
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Cancelled is terminal; completed orders may only move to cancelled.
    pub fn can_transition_to(self, next: OrderStatusCode) -> bool {
        match (self, next) {
            (Self::Pending, Self::Completed) => true,
            (Self::Pending, Self::Cancelled) => true,
            (Self::Completed, Self::Cancelled) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ids_round_trip() {
        for code in OrderStatusCode::ALL {
            assert_eq!(OrderStatusCode::from_id(code.id()), Some(code));
        }
        assert_eq!(OrderStatusCode::from_id(99), None);
    }

    #[test]
    fn parses_snake_case_codes() {
        assert_eq!(
            OrderStatusCode::from_str("cancelled").unwrap(),
            OrderStatusCode::Cancelled
        );
        assert_eq!(OrderStatusCode::Completed.to_string(), "completed");
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(OrderStatusCode::Cancelled.is_terminal());
        for next in OrderStatusCode::ALL {
            assert!(!OrderStatusCode::Cancelled.can_transition_to(next));
        }
        assert!(OrderStatusCode::Completed.can_transition_to(OrderStatusCode::Cancelled));
        assert!(!OrderStatusCode::Completed.can_transition_to(OrderStatusCode::Pending));
    }
}
