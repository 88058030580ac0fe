use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::config::AppConfig;

pub mod coffee_types;
pub mod dashboard;
pub mod inventory;
pub mod mutation_guard;
pub mod order_status;
pub mod orders;

pub use coffee_types::CoffeeTypeService;
pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use mutation_guard::OrderMutationGuard;
pub use order_status::OrderStatusService;
pub use orders::OrderService;

/// Operator answer to a yes/no prompt in front of a destructive action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Every service the HTTP layer talks to, sharing one pool.
#[derive(Clone)]
pub struct AppServices {
    pub coffee_types: CoffeeTypeService,
    pub inventory: InventoryService,
    pub orders: OrderService,
    pub order_status: OrderStatusService,
    pub dashboard: DashboardService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        let orders = OrderService::new(
            db.clone(),
            config.api_default_page_size,
            config.api_max_page_size,
        );
        let inventory = InventoryService::new(db.clone(), config.search_result_limit);

        Self {
            coffee_types: CoffeeTypeService::new(db.clone()),
            order_status: OrderStatusService::new(db.clone(), OrderMutationGuard::default()),
            dashboard: DashboardService::new(
                inventory.clone(),
                orders.clone(),
                config.low_stock_threshold_kg,
                config.recent_orders_limit,
            ),
            inventory,
            orders,
        }
    }
}
