use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::db::finish_transaction;
use crate::db::transaction::TrackedTransaction;
use crate::entities::order_status::OrderStatusCode;
use crate::entities::{coffee_item, coffee_type, order, order_line, order_status};
use crate::errors::ServiceError;
use crate::messages;
use crate::models::{Cart, CartProduct, Receipt};
use crate::models::receipt::ReceiptHeader;
use crate::validation::{self, deserialize_text};

#[derive(Clone, Debug, Deserialize)]
pub struct CartLineRequest {
    pub coffee_id: i32,
    /// Kilograms.
    pub quantity: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Tendered amount as typed at the till.
    #[serde(deserialize_with = "deserialize_text")]
    pub amount_paid: String,
    pub items: Vec<CartLineRequest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartLineRequest>,
    /// Blank means nothing tendered yet.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub amount_paid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: i32,
    pub customer_name: String,
    pub phone_number: Option<String>,
    pub total_price: Decimal,
    pub status_id: i32,
    pub status_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderSummary {
    fn new(order: order::Model, status_names: &HashMap<i32, String>) -> Self {
        let status_name = status_names
            .get(&order.status_id)
            .cloned()
            .unwrap_or_else(|| messages::TYPE_UNSPECIFIED.to_string());
        Self {
            id: order.id,
            customer_name: order.customer_name,
            phone_number: order.phone_number,
            total_price: validation::normalize_money(order.total_price),
            status_id: order.status_id,
            status_name,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderLineView {
    pub line_id: i32,
    pub coffee_id: i32,
    /// `None` when the coffee has since been removed from the store.
    pub coffee_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: OrderSummary,
    pub notes_display: String,
    pub lines: Vec<OrderLineView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Checkout and order history.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    default_page_size: u64,
    max_page_size: u64,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, default_page_size: u64, max_page_size: u64) -> Self {
        Self {
            db,
            default_page_size,
            max_page_size,
        }
    }

    /// Validates the request, then writes the order, its lines and the stock
    /// decrements in one transaction. Nothing is written on any failure.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Receipt, ServiceError> {
        let customer_name = validation::validate_customer_name(&request.customer_name)?;
        let phone_number = validation::validate_phone(request.phone_number.as_deref())?;
        let lines = normalize_lines(&request.items)?;
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(messages::CART_EMPTY.to_string()));
        }
        let notes = validation::validate_notes(request.notes.as_deref())?;
        let amount_paid = validation::parse_amount_paid(&request.amount_paid)?;

        let checkout = Checkout {
            customer_name,
            phone_number,
            notes,
            amount_paid,
            lines,
        };

        let tracked = TrackedTransaction::begin(&self.db, "place_order").await?;
        let result = place_order_in(tracked.txn(), checkout).await;
        let receipt = finish_transaction(tracked, result).await?;

        counter!("coffee_grinder.orders.placed", 1);
        info!(
            order_id = receipt.order_id(),
            total = %receipt.total(),
            "Order placed"
        );
        Ok(receipt)
    }

    /// Prices a cart against current stock and prices without writing anything.
    #[instrument(skip(self, request))]
    pub async fn quote(&self, request: QuoteRequest) -> Result<Cart, ServiceError> {
        let lines = normalize_lines(&request.items)?;
        let amount_paid = if request.amount_paid.trim().is_empty() {
            Decimal::ZERO
        } else {
            validation::parse_amount_paid(&request.amount_paid)?
        };

        let (mut cart, _) = build_cart(&*self.db, &lines, false).await?;
        cart.set_amount_paid(amount_paid);
        Ok(cart)
    }

    /// Newest first. `page` is one-based; `per_page` is capped by config.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Result<OrderPage, ServiceError> {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .filter(|p| *p > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);

        let paginator = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let status_names = status_names(&*self.db).await?;
        Ok(OrderPage {
            orders: rows
                .into_iter()
                .map(|o| OrderSummary::new(o, &status_names))
                .collect(),
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        })
    }

    pub async fn recent_orders(&self, limit: u64) -> Result<Vec<OrderSummary>, ServiceError> {
        let rows = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .limit(limit)
            .all(&*self.db)
            .await?;
        let status_names = status_names(&*self.db).await?;
        Ok(rows
            .into_iter()
            .map(|o| OrderSummary::new(o, &status_names))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_order_details(&self, order_id: i32) -> Result<OrderDetails, ServiceError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::order_not_found(order_id)))?;

        let lines = order_line::Entity::find()
            .filter(order_line::Column::OrderId.eq(order_id))
            .find_also_related(coffee_item::Entity)
            .order_by_asc(order_line::Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|(line, coffee)| OrderLineView {
                line_id: line.id,
                coffee_id: line.coffee_id,
                coffee_name: coffee.map(|c| c.name),
                quantity: line.quantity.map(validation::normalize_kilograms),
                unit_price: validation::normalize_money(line.unit_price),
                subtotal: validation::normalize_money(line.subtotal()),
            })
            .collect();

        let status_names = status_names(&*self.db).await?;
        let notes_display = order
            .notes
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| messages::NO_NOTES.to_string());

        Ok(OrderDetails {
            order: OrderSummary::new(order, &status_names),
            notes_display,
            lines,
        })
    }
}

struct Checkout {
    customer_name: String,
    phone_number: Option<String>,
    notes: Option<String>,
    amount_paid: Decimal,
    lines: Vec<CartLineRequest>,
}

async fn place_order_in(
    txn: &DatabaseTransaction,
    checkout: Checkout,
) -> Result<Receipt, ServiceError> {
    let (mut cart, items) = build_cart(txn, &checkout.lines, true).await?;
    if cart.is_empty() {
        return Err(ServiceError::ValidationError(messages::CART_EMPTY.to_string()));
    }
    cart.set_amount_paid(checkout.amount_paid);
    if !cart.is_fully_paid() {
        return Err(ServiceError::InsufficientPayment(
            messages::amount_paid_below_total(cart.amount_paid(), cart.total()),
        ));
    }

    let status = OrderStatusCode::initial();
    let status_row = order_status::Entity::find_by_id(status.id())
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::InvalidStatus(messages::unknown_status(status.id())))?;

    let created = order::ActiveModel {
        customer_name: Set(checkout.customer_name),
        phone_number: Set(checkout.phone_number),
        total_price: Set(cart.total()),
        status_id: Set(status_row.id),
        notes: Set(checkout.notes),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for line in cart.lines() {
        order_line::ActiveModel {
            order_id: Set(created.id),
            coffee_id: Set(line.coffee_id),
            quantity: Set(Some(line.quantity)),
            unit_price: Set(line.unit_price),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    for item in items {
        let Some(line) = cart.line(item.id) else {
            continue;
        };
        let remaining = validation::normalize_kilograms(
            validation::normalize_kilograms(item.quantity_in_stock) - line.quantity,
        );
        let mut active = item.into_active_model();
        active.quantity_in_stock = Set(remaining);
        active.update(txn).await?;
    }

    let header = ReceiptHeader {
        order_id: created.id,
        created_at: created.created_at,
        customer_name: created.customer_name,
        phone_number: created.phone_number,
        status: status_row.name,
        notes: created.notes,
    };
    Ok(Receipt::new(header, &cart))
}

/// Rejects negative quantities and repeated coffees, rounds to whole grams,
/// then drops lines that come out as zero.
fn normalize_lines(lines: &[CartLineRequest]) -> Result<Vec<CartLineRequest>, ServiceError> {
    if lines.iter().any(|l| l.quantity < Decimal::ZERO) {
        return Err(ServiceError::ValidationError(
            messages::QUANTITY_NEGATIVE.to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    if !lines.iter().all(|l| seen.insert(l.coffee_id)) {
        return Err(ServiceError::ValidationError(
            messages::CART_DUPLICATE_LINE.to_string(),
        ));
    }

    Ok(lines
        .iter()
        .map(|l| CartLineRequest {
            coffee_id: l.coffee_id,
            quantity: validation::normalize_kilograms(l.quantity),
        })
        .filter(|l| !l.quantity.is_zero())
        .collect())
}

/// Loads each referenced coffee and fills a cart, enforcing stock limits.
/// With `lock` the rows are first read `FOR UPDATE` in ascending id order,
/// so concurrent checkouts over the same coffees queue instead of deadlocking.
/// Cart lines keep the request order.
async fn build_cart<C>(
    conn: &C,
    lines: &[CartLineRequest],
    lock: bool,
) -> Result<(Cart, Vec<coffee_item::Model>), ServiceError>
where
    C: ConnectionTrait,
{
    if lock {
        let mut ids: Vec<i32> = lines.iter().map(|l| l.coffee_id).collect();
        ids.sort_unstable();
        coffee_item::Entity::find()
            .filter(coffee_item::Column::Id.is_in(ids))
            .order_by_asc(coffee_item::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await?;
    }

    let mut cart = Cart::new();
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let item = coffee_item::Entity::find_by_id(line.coffee_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(messages::coffee_id_not_found(line.coffee_id)))?;

        let type_name = coffee_type::Entity::find_by_id(item.type_id)
            .one(conn)
            .await?
            .map(|t| t.name);

        let product = CartProduct {
            coffee_id: item.id,
            name: item.name.clone(),
            type_name,
            price_per_kg: validation::normalize_money(item.price_per_kg),
            quantity_in_stock: validation::normalize_kilograms(item.quantity_in_stock),
        };
        cart.set_quantity(&product, line.quantity)?;
        items.push(item);
    }

    Ok((cart, items))
}

async fn status_names<C>(conn: &C) -> Result<HashMap<i32, String>, ServiceError>
where
    C: ConnectionTrait,
{
    Ok(order_status::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect())
}
