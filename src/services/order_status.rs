use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::db::finish_transaction;
use crate::db::transaction::TrackedTransaction;
use crate::entities::order_status::OrderStatusCode;
use crate::entities::{coffee_item, order, order_line, order_status};
use crate::errors::ServiceError;
use crate::messages;
use crate::services::{Confirmation, OrderMutationGuard};
use crate::validation;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RestoredStock {
    pub coffee_id: i32,
    pub quantity: Decimal,
    pub stock_after: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusChange {
    Updated {
        order_id: i32,
        previous: OrderStatusCode,
        current: OrderStatusCode,
        status_name: String,
        restored: Vec<RestoredStock>,
    },
    Unchanged {
        order_id: i32,
        status: OrderStatusCode,
        status_name: String,
    },
    AlreadyCancelled {
        order_id: i32,
    },
    Declined {
        order_id: i32,
    },
}

impl StatusChange {
    pub fn message(&self) -> String {
        match self {
            Self::Updated {
                current: OrderStatusCode::Cancelled,
                ..
            } => messages::ORDER_CANCELLED.to_string(),
            Self::Updated { status_name, .. } | Self::Unchanged { status_name, .. } => {
                messages::order_status_updated(status_name)
            }
            Self::AlreadyCancelled { .. } => messages::ORDER_ALREADY_CANCELLED.to_string(),
            Self::Declined { .. } => messages::CANCELLATION_DECLINED.to_string(),
        }
    }
}

/// Order status changes. Cancelling puts every sold kilogram back in stock
/// within the same transaction as the status write.
#[derive(Clone)]
pub struct OrderStatusService {
    db: Arc<DatabaseConnection>,
    guard: OrderMutationGuard,
}

impl OrderStatusService {
    pub fn new(db: Arc<DatabaseConnection>, guard: OrderMutationGuard) -> Self {
        Self { db, guard }
    }

    pub fn guard(&self) -> &OrderMutationGuard {
        &self.guard
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        order_id: i32,
        confirmation: Confirmation,
    ) -> Result<StatusChange, ServiceError> {
        if !confirmation.is_confirmed() {
            info!(order_id, "Cancellation declined by operator");
            return Ok(StatusChange::Declined { order_id });
        }

        let change = self
            .change_status(order_id, OrderStatusCode::Cancelled.id())
            .await?;
        if matches!(change, StatusChange::Updated { .. }) {
            counter!("coffee_grinder.orders.cancelled", 1);
        }
        Ok(change)
    }

    /// Moves an order to `target_status_id`. The target must exist in the
    /// status table and be reachable from the current status. Cancelling
    /// restores stock and needs the operator's confirmation, so it only goes
    /// through [`Self::cancel_order`].
    #[instrument(skip(self), fields(order_id = %order_id, target_status_id = %target_status_id))]
    pub async fn update_status(
        &self,
        order_id: i32,
        target_status_id: i32,
    ) -> Result<StatusChange, ServiceError> {
        if target_status_id == OrderStatusCode::Cancelled.id() {
            warn!(order_id, "Cancellation requested through a status update");
            return Err(ServiceError::InvalidOperation(
                messages::CANCEL_REQUIRES_CONFIRMATION.to_string(),
            ));
        }
        self.change_status(order_id, target_status_id).await
    }

    async fn change_status(
        &self,
        order_id: i32,
        target_status_id: i32,
    ) -> Result<StatusChange, ServiceError> {
        let _permit = self.guard.try_acquire(order_id)?;

        match self.apply(order_id, target_status_id).await {
            Ok(change) => Ok(change),
            Err(err) => {
                if err.is_store_failure() {
                    error!(order_id, error = %err, "Order status update failed in the store");
                    counter!("coffee_grinder.orders.status_update_failed", 1, "kind" => "store");
                } else {
                    warn!(order_id, error = %err, "Order status update rejected");
                    counter!("coffee_grinder.orders.status_update_failed", 1, "kind" => "logical");
                }
                Err(err.into_status_update_failure())
            }
        }
    }

    async fn apply(&self, order_id: i32, target_status_id: i32) -> Result<StatusChange, ServiceError> {
        let target_row = order_status::Entity::find_by_id(target_status_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::InvalidStatus(messages::unknown_status(target_status_id)))?;
        let target = OrderStatusCode::from_id(target_row.id)
            .ok_or_else(|| ServiceError::InvalidStatus(messages::unknown_status(target_row.id)))?;

        let tracked = TrackedTransaction::begin(&self.db, "update_order_status").await?;
        let result = update_status_in(tracked.txn(), order_id, target, target_row.name).await;
        let change = finish_transaction(tracked, result).await?;

        if let StatusChange::Updated {
            previous, current, ..
        } = &change
        {
            info!(order_id, from = %previous, to = %current, "Order status updated");
        }
        Ok(change)
    }
}

async fn update_status_in(
    txn: &DatabaseTransaction,
    order_id: i32,
    target: OrderStatusCode,
    target_name: String,
) -> Result<StatusChange, ServiceError> {
    let order = order::Entity::find_by_id(order_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(messages::order_not_found(order_id)))?;

    let current = OrderStatusCode::from_id(order.status_id)
        .ok_or_else(|| ServiceError::InvalidStatus(messages::unknown_status(order.status_id)))?;

    if current == target {
        return Ok(if target == OrderStatusCode::Cancelled {
            StatusChange::AlreadyCancelled { order_id }
        } else {
            StatusChange::Unchanged {
                order_id,
                status: target,
                status_name: target_name,
            }
        });
    }

    if !current.can_transition_to(target) {
        let current_name = order_status::Entity::find_by_id(order.status_id)
            .one(txn)
            .await?
            .map(|s| s.name)
            .unwrap_or_else(|| current.to_string());
        return Err(ServiceError::InvalidStatus(messages::invalid_transition(
            &current_name,
            &target_name,
        )));
    }

    let updated = order::Entity::update_many()
        .col_expr(order::Column::StatusId, Expr::value(target.id()))
        .col_expr(order::Column::Version, Expr::value(order.version + 1))
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Version.eq(order.version))
        .exec(txn)
        .await?;
    if updated.rows_affected == 0 {
        return Err(ServiceError::ConcurrentModification(order_id));
    }

    let restored = if target == OrderStatusCode::Cancelled {
        restore_inventory(txn, order_id).await?
    } else {
        Vec::new()
    };

    Ok(StatusChange::Updated {
        order_id,
        previous: current,
        current: target,
        status_name: target_name,
        restored,
    })
}

/// Adds each line's quantity back to its coffee. A line without a quantity
/// or whose coffee no longer exists aborts the whole restore.
async fn restore_inventory(
    txn: &DatabaseTransaction,
    order_id: i32,
) -> Result<Vec<RestoredStock>, ServiceError> {
    let lines = order_line::Entity::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .all(txn)
        .await?;

    // coffee id -> (first line id, total quantity)
    let mut per_coffee: BTreeMap<i32, (i32, Decimal)> = BTreeMap::new();
    for line in &lines {
        let quantity = line
            .quantity
            .ok_or_else(|| ServiceError::InventoryError(messages::invalid_order_line(line.id)))?;
        per_coffee
            .entry(line.coffee_id)
            .and_modify(|(_, total)| *total += quantity)
            .or_insert((line.id, quantity));
    }

    let mut restored = Vec::with_capacity(per_coffee.len());
    for (coffee_id, (line_id, quantity)) in per_coffee {
        let item = coffee_item::Entity::find_by_id(coffee_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::InventoryError(messages::invalid_order_line(line_id)))?;

        let stock_after = validation::normalize_kilograms(
            validation::normalize_kilograms(item.quantity_in_stock) + quantity,
        );
        let mut active = item.into_active_model();
        active.quantity_in_stock = Set(stock_after);
        active.update(txn).await?;

        restored.push(RestoredStock {
            coffee_id,
            quantity: validation::normalize_kilograms(quantity),
            stock_after,
        });
    }

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_messages() {
        let cancelled = StatusChange::Updated {
            order_id: 1,
            previous: OrderStatusCode::Completed,
            current: OrderStatusCode::Cancelled,
            status_name: "ملغى".into(),
            restored: vec![],
        };
        assert_eq!(cancelled.message(), messages::ORDER_CANCELLED);

        let completed = StatusChange::Updated {
            order_id: 1,
            previous: OrderStatusCode::Pending,
            current: OrderStatusCode::Completed,
            status_name: "مكتمل".into(),
            restored: vec![],
        };
        assert_eq!(completed.message(), messages::order_status_updated("مكتمل"));

        assert_eq!(
            StatusChange::AlreadyCancelled { order_id: 1 }.message(),
            messages::ORDER_ALREADY_CANCELLED
        );
        assert_eq!(
            StatusChange::Declined { order_id: 1 }.message(),
            messages::CANCELLATION_DECLINED
        );
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let value = serde_json::to_value(StatusChange::AlreadyCancelled { order_id: 4 }).unwrap();
        assert_eq!(value["outcome"], "already_cancelled");
        assert_eq!(value["order_id"], 4);
    }
}
