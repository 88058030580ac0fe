use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::services::inventory::{CoffeeItemView, InventoryService};
use crate::services::orders::{OrderService, OrderSummary};

#[derive(Clone, Debug, Serialize)]
pub struct DashboardSnapshot {
    pub inventory: Vec<CoffeeItemView>,
    pub recent_orders: Vec<OrderSummary>,
    pub low_stock: Vec<CoffeeItemView>,
    pub low_stock_threshold_kg: Decimal,
}

#[derive(Clone)]
pub struct DashboardService {
    inventory: InventoryService,
    orders: OrderService,
    low_stock_threshold: Decimal,
    recent_orders_limit: u64,
}

impl DashboardService {
    pub fn new(
        inventory: InventoryService,
        orders: OrderService,
        low_stock_threshold: Decimal,
        recent_orders_limit: u64,
    ) -> Self {
        Self {
            inventory,
            orders,
            low_stock_threshold,
            recent_orders_limit,
        }
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, ServiceError> {
        let inventory = self.inventory.list_items_by_name().await?;
        let recent_orders = self.orders.recent_orders(self.recent_orders_limit).await?;

        Ok(DashboardSnapshot {
            low_stock: low_stock(&inventory, self.low_stock_threshold),
            inventory,
            recent_orders,
            low_stock_threshold_kg: self.low_stock_threshold,
        })
    }
}

/// Items strictly below `threshold`, lowest stock first.
fn low_stock(items: &[CoffeeItemView], threshold: Decimal) -> Vec<CoffeeItemView> {
    let mut low: Vec<CoffeeItemView> = items
        .iter()
        .filter(|item| item.quantity_in_stock < threshold)
        .cloned()
        .collect();
    low.sort_by(|a, b| {
        a.quantity_in_stock
            .cmp(&b.quantity_in_stock)
            .then(a.id.cmp(&b.id))
    });
    low
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(id: i32, quantity: Decimal) -> CoffeeItemView {
        CoffeeItemView {
            id,
            name: format!("coffee {id}"),
            type_id: 1,
            type_name: None,
            quantity_in_stock: quantity,
            price_per_kg: dec!(100.00),
            description: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn low_stock_is_strictly_below_threshold_and_sorted() {
        let items = vec![
            item(1, dec!(12)),
            item(2, dec!(9.999)),
            item(3, dec!(10)),
            item(4, dec!(0.5)),
        ];
        let ids: Vec<i32> = low_stock(&items, dec!(10)).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 2]);
    }
}
