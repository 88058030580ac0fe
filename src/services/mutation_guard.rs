use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use crate::errors::ServiceError;
use crate::messages;

/// Tracks orders with a status change in flight in this process. A second
/// attempt on the same order is refused until the first one's permit drops.
#[derive(Clone, Debug, Default)]
pub struct OrderMutationGuard {
    in_flight: Arc<DashMap<i32, ()>>,
}

impl OrderMutationGuard {
    pub fn try_acquire(&self, order_id: i32) -> Result<OrderMutationPermit, ServiceError> {
        match self.in_flight.entry(order_id) {
            Entry::Occupied(_) => {
                debug!(order_id, "Order already being updated");
                Err(ServiceError::Conflict(
                    messages::ORDER_UPDATE_IN_PROGRESS.to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(OrderMutationPermit {
                    in_flight: self.in_flight.clone(),
                    order_id,
                })
            }
        }
    }

    pub fn is_held(&self, order_id: i32) -> bool {
        self.in_flight.contains_key(&order_id)
    }
}

/// Released on drop, whichever way the update ended.
#[derive(Debug)]
pub struct OrderMutationPermit {
    in_flight: Arc<DashMap<i32, ()>>,
    order_id: i32,
}

impl OrderMutationPermit {
    pub fn order_id(&self) -> i32 {
        self.order_id
    }
}

impl Drop for OrderMutationPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.order_id);
    }
}
