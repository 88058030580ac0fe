use crate::errors::ServiceError;
use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::time::Instant;
use tracing::{debug, error, warn};

/// An open transaction plus the bookkeeping needed to report how it ended.
pub struct TrackedTransaction {
    txn: DatabaseTransaction,
    operation: &'static str,
    started: Instant,
}

impl TrackedTransaction {
    pub async fn begin(
        db: &DatabaseConnection,
        operation: &'static str,
    ) -> Result<Self, ServiceError> {
        let txn = db.begin().await.map_err(|e| {
            error!(operation, error = %e, "Failed to start transaction");
            ServiceError::DatabaseError(e)
        })?;
        counter!("coffee_grinder_db.transaction.started", 1, "operation" => operation);
        debug!(operation, "Transaction started");

        Ok(Self {
            txn,
            operation,
            started: Instant::now(),
        })
    }

    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }
}

/// Commits on `Ok`, rolls back on `Err`. A commit failure is returned as a
/// database error; a rollback failure is logged and the original error wins.
pub async fn finish_transaction<T>(
    tracked: TrackedTransaction,
    result: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let TrackedTransaction {
        txn,
        operation,
        started,
    } = tracked;

    let outcome = match result {
        Ok(value) => match txn.commit().await {
            Ok(()) => {
                counter!("coffee_grinder_db.transaction.committed", 1, "operation" => operation);
                debug!(operation, "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                counter!("coffee_grinder_db.transaction.rolled_back", 1, "operation" => operation);
                error!(operation, error = %e, "Transaction commit failed");
                Err(ServiceError::DatabaseError(e))
            }
        },
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!(operation, error = %rollback_err, "Transaction rollback failed");
            }
            counter!("coffee_grinder_db.transaction.rolled_back", 1, "operation" => operation);
            warn!(operation, error = %err, "Transaction rolled back");
            Err(err)
        }
    };

    histogram!(
        "coffee_grinder_db.transaction.duration",
        started.elapsed(),
        "operation" => operation
    );
    outcome
}
