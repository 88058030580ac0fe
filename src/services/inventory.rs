use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::db::finish_transaction;
use crate::db::transaction::TrackedTransaction;
use crate::entities::{coffee_item, coffee_type, order_line};
use crate::errors::ServiceError;
use crate::messages;
use crate::services::Confirmation;
use crate::validation::{self, deserialize_text};

/// Coffee item form as the operator fills it in. Quantity and price stay as
/// typed until validated.
#[derive(Clone, Debug, Deserialize)]
pub struct CoffeeItemInput {
    pub name: String,
    pub type_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub quantity: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub price_per_kg: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoffeeItemView {
    pub id: i32,
    pub name: String,
    pub type_id: i32,
    pub type_name: Option<String>,
    pub quantity_in_stock: Decimal,
    pub price_per_kg: Decimal,
    pub description: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl CoffeeItemView {
    fn new(item: coffee_item::Model, coffee_type: Option<coffee_type::Model>) -> Self {
        Self {
            id: item.id,
            name: item.name,
            type_id: item.type_id,
            type_name: coffee_type.map(|t| t.name),
            quantity_in_stock: validation::normalize_kilograms(item.quantity_in_stock),
            price_per_kg: validation::normalize_money(item.price_per_kg),
            description: item.description,
            last_updated: item.last_updated,
        }
    }

    /// `"{id} - {name} ({type})"`, as listed in the search dropdown.
    pub fn display_text(&self) -> String {
        format!(
            "{} - {} ({})",
            self.id,
            self.name,
            self.type_name.as_deref().unwrap_or(messages::TYPE_UNSPECIFIED)
        )
    }

    fn matches(&self, needle: &str, include_id: bool) -> bool {
        (include_id && self.id.to_string().contains(needle))
            || self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchHit {
    pub id: i32,
    pub display_text: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemFilter {
    pub type_id: Option<i32>,
    /// Matched against id, name and description, ignoring case.
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemDeletion {
    Deleted {
        id: i32,
        name: String,
        removed_order_lines: u64,
    },
    Declined {
        id: i32,
    },
}

impl ItemDeletion {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Deleted { .. } => messages::COFFEE_DELETED,
            Self::Declined { .. } => messages::DELETE_DECLINED,
        }
    }
}

struct ValidatedItem {
    name: String,
    coffee_type: coffee_type::Model,
    description: Option<String>,
    quantity: Decimal,
    price_per_kg: Decimal,
}

/// Inventory of stocked coffees.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    search_limit: u64,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, search_limit: u64) -> Self {
        Self { db, search_limit }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_item(&self, input: CoffeeItemInput) -> Result<CoffeeItemView, ServiceError> {
        let valid = validate_input(&*self.db, &input).await?;

        let created = coffee_item::ActiveModel {
            name: Set(valid.name),
            type_id: Set(valid.coffee_type.id),
            quantity_in_stock: Set(valid.quantity),
            price_per_kg: Set(valid.price_per_kg),
            description: Set(valid.description),
            last_updated: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(coffee_id = created.id, quantity = %created.quantity_in_stock, "Coffee item added");
        Ok(CoffeeItemView::new(created, Some(valid.coffee_type)))
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        id: i32,
        input: CoffeeItemInput,
    ) -> Result<CoffeeItemView, ServiceError> {
        let valid = validate_input(&*self.db, &input).await?;

        let existing = coffee_item::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::COFFEE_NOT_FOUND.to_string()))?;

        let mut active = existing.into_active_model();
        active.name = Set(valid.name);
        active.type_id = Set(valid.coffee_type.id);
        active.quantity_in_stock = Set(valid.quantity);
        active.price_per_kg = Set(valid.price_per_kg);
        active.description = Set(valid.description);
        let updated = active.update(&*self.db).await?;

        info!(coffee_id = id, "Coffee item updated");
        Ok(CoffeeItemView::new(updated, Some(valid.coffee_type)))
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: i32) -> Result<CoffeeItemView, ServiceError> {
        coffee_item::Entity::find_by_id(id)
            .find_also_related(coffee_type::Entity)
            .one(&*self.db)
            .await?
            .map(|(item, coffee_type)| CoffeeItemView::new(item, coffee_type))
            .ok_or_else(|| ServiceError::NotFound(messages::coffee_id_not_found(id)))
    }

    /// Inventory grid, ordered by id.
    #[instrument(skip(self))]
    pub async fn list_items(&self, filter: ItemFilter) -> Result<Vec<CoffeeItemView>, ServiceError> {
        let mut query = coffee_item::Entity::find().find_also_related(coffee_type::Entity);
        if let Some(type_id) = filter.type_id {
            query = query.filter(coffee_item::Column::TypeId.eq(type_id));
        }
        let rows = query
            .order_by_asc(coffee_item::Column::Id)
            .all(&*self.db)
            .await?;

        let needle = filter
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        Ok(rows
            .into_iter()
            .map(|(item, coffee_type)| CoffeeItemView::new(item, coffee_type))
            .filter(|view| needle.as_deref().map_or(true, |n| view.matches(n, true)))
            .collect())
    }

    /// Items ordered by name, for the dashboard.
    pub async fn list_items_by_name(&self) -> Result<Vec<CoffeeItemView>, ServiceError> {
        let rows = coffee_item::Entity::find()
            .find_also_related(coffee_type::Entity)
            .order_by_asc(coffee_item::Column::Name)
            .order_by_asc(coffee_item::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(item, coffee_type)| CoffeeItemView::new(item, coffee_type))
            .collect())
    }

    /// Search-as-you-type suggestions, capped at the configured limit.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        let query = validation::validate_search_text(query)?;
        let items = self
            .list_items(ItemFilter {
                type_id: None,
                text: Some(query),
            })
            .await?;

        let hits: Vec<SearchHit> = items
            .iter()
            .take(self.search_limit as usize)
            .map(|item| SearchHit {
                id: item.id,
                display_text: item.display_text(),
            })
            .collect();
        debug!(hits = hits.len(), "Inventory search finished");
        Ok(hits)
    }

    /// Numeric text looks up the id; anything else returns the first item
    /// whose name or description contains it.
    #[instrument(skip(self))]
    pub async fn find(&self, query: &str) -> Result<CoffeeItemView, ServiceError> {
        let query = validation::validate_search_text(query)?;
        if let Ok(id) = query.parse::<i32>() {
            return self.get_item(id).await;
        }

        let needle = query.to_lowercase();
        self.list_items(ItemFilter::default())
            .await?
            .into_iter()
            .find(|item| item.matches(&needle, false))
            .ok_or_else(|| ServiceError::NotFound(messages::no_search_match(&query)))
    }

    /// Deletes the item together with every order line that sold it.
    #[instrument(skip(self))]
    pub async fn delete_item(
        &self,
        id: i32,
        confirmation: Confirmation,
    ) -> Result<ItemDeletion, ServiceError> {
        if !confirmation.is_confirmed() {
            return Ok(ItemDeletion::Declined { id });
        }

        let tracked = TrackedTransaction::begin(&self.db, "delete_coffee_item").await?;
        let result = delete_item_in(tracked.txn(), id).await;
        let deletion = finish_transaction(tracked, result).await?;

        if let ItemDeletion::Deleted {
            removed_order_lines, ..
        } = &deletion
        {
            info!(coffee_id = id, removed_order_lines, "Coffee item deleted");
        }
        Ok(deletion)
    }
}

async fn validate_input<C>(conn: &C, input: &CoffeeItemInput) -> Result<ValidatedItem, ServiceError>
where
    C: ConnectionTrait,
{
    let name = validation::validate_coffee_name(&input.name)?;

    let type_id = input
        .type_id
        .ok_or_else(|| ServiceError::ValidationError(messages::COFFEE_TYPE_REQUIRED.to_string()))?;
    let coffee_type = coffee_type::Entity::find_by_id(type_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::ValidationError(messages::COFFEE_TYPE_REQUIRED.to_string()))?;

    let description = validation::validate_description(input.description.as_deref())?;
    let quantity = validation::validate_stock_quantity(&input.quantity)?;
    let price_per_kg = validation::validate_price(&input.price_per_kg)?;

    Ok(ValidatedItem {
        name,
        coffee_type,
        description,
        quantity,
        price_per_kg,
    })
}

async fn delete_item_in(txn: &DatabaseTransaction, id: i32) -> Result<ItemDeletion, ServiceError> {
    let item = coffee_item::Entity::find_by_id(id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(messages::COFFEE_NOT_FOUND.to_string()))?;

    let removed = order_line::Entity::delete_many()
        .filter(order_line::Column::CoffeeId.eq(id))
        .exec(txn)
        .await?;

    let name = item.name.clone();
    item.delete(txn).await?;

    Ok(ItemDeletion::Deleted {
        id,
        name,
        removed_order_lines: removed.rows_affected,
    })
}
