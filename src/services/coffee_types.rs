use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::db::transaction::TrackedTransaction;
use crate::db::finish_transaction;
use crate::entities::{coffee_item, coffee_type};
use crate::errors::ServiceError;
use crate::messages;
use crate::services::Confirmation;
use crate::validation;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TypeDeletion {
    Deleted { id: i32, name: String },
    Declined { id: i32 },
}

impl TypeDeletion {
    pub fn message(&self) -> String {
        match self {
            Self::Deleted { name, .. } => messages::type_deleted(name),
            Self::Declined { .. } => messages::DELETE_DECLINED.to_string(),
        }
    }
}

/// Coffee type catalogue. Names are unique regardless of letter case.
#[derive(Clone)]
pub struct CoffeeTypeService {
    db: Arc<DatabaseConnection>,
}

impl CoffeeTypeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_types(&self) -> Result<Vec<coffee_type::Model>, ServiceError> {
        let types = coffee_type::Entity::find()
            .order_by_asc(coffee_type::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(types)
    }

    #[instrument(skip(self))]
    pub async fn get_type(&self, id: i32) -> Result<coffee_type::Model, ServiceError> {
        coffee_type::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::TYPE_NOT_FOUND.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_type(&self, name: &str) -> Result<coffee_type::Model, ServiceError> {
        let name = validation::validate_type_name(name)?;

        let lowered = name.to_lowercase();
        let clash = coffee_type::Entity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .any(|existing| existing.name.to_lowercase() == lowered);
        if clash {
            return Err(ServiceError::Conflict(messages::type_already_exists(&name)));
        }

        let created = coffee_type::ActiveModel {
            name: Set(name.clone()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| unique_violation_as_conflict(e, &name))?;

        info!(type_id = created.id, name = %created.name, "Coffee type created");
        Ok(created)
    }

    /// Refuses while any coffee item still references the type.
    #[instrument(skip(self))]
    pub async fn delete_type(
        &self,
        id: i32,
        confirmation: Confirmation,
    ) -> Result<TypeDeletion, ServiceError> {
        if !confirmation.is_confirmed() {
            return Ok(TypeDeletion::Declined { id });
        }

        let tracked = TrackedTransaction::begin(&self.db, "delete_coffee_type").await?;
        let result = Self::delete_type_in(tracked.txn(), id).await;
        let deletion = finish_transaction(tracked, result).await?;

        info!(type_id = id, "Coffee type deleted");
        Ok(deletion)
    }

    async fn delete_type_in(
        txn: &DatabaseTransaction,
        id: i32,
    ) -> Result<TypeDeletion, ServiceError> {
        let existing = coffee_type::Entity::find_by_id(id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::TYPE_NOT_FOUND.to_string()))?;

        let in_use = coffee_item::Entity::find()
            .filter(coffee_item::Column::TypeId.eq(id))
            .count(txn)
            .await?;
        if in_use > 0 {
            warn!(type_id = id, items = in_use, "Refusing to delete coffee type in use");
            return Err(ServiceError::InvalidOperation(messages::type_in_use(
                &existing.name,
            )));
        }

        let name = existing.name.clone();
        existing.delete(txn).await?;
        Ok(TypeDeletion::Deleted { id, name })
    }
}

fn unique_violation_as_conflict(err: DbErr, name: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(messages::type_already_exists(name))
        }
        _ => ServiceError::DatabaseError(err),
    }
}
