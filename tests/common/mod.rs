#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use coffee_grinder::{
    config::AppConfig,
    db,
    entities::{coffee_item, coffee_type, order, order_line},
    services::AppServices,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, Statement,
};
use serde_json::Value;
use tower::ServiceExt;

/// Application state and router over a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = coffee_grinder::build_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn services(&self) -> &AppServices {
        &self.state.services
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_type(&self, name: &str) -> i32 {
        coffee_type::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("insert coffee type")
        .id
    }

    /// Inserts a coffee directly, bypassing the operator quantity rules.
    pub async fn seed_coffee(
        &self,
        name: &str,
        type_id: i32,
        quantity: Decimal,
        price_per_kg: Decimal,
    ) -> i32 {
        coffee_item::ActiveModel {
            name: Set(name.to_string()),
            type_id: Set(type_id),
            quantity_in_stock: Set(quantity),
            price_per_kg: Set(price_per_kg),
            description: Set(None),
            last_updated: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("insert coffee item")
        .id
    }

    pub async fn stock_of(&self, coffee_id: i32) -> Decimal {
        coffee_item::Entity::find_by_id(coffee_id)
            .one(self.db())
            .await
            .expect("load coffee item")
            .expect("coffee item exists")
            .quantity_in_stock
            .round_dp(3)
    }

    pub async fn order_status_of(&self, order_id: i32) -> i32 {
        order::Entity::find_by_id(order_id)
            .one(self.db())
            .await
            .expect("load order")
            .expect("order exists")
            .status_id
    }

    pub async fn order_count(&self) -> u64 {
        order::Entity::find()
            .count(self.db())
            .await
            .expect("count orders")
    }

    pub async fn line_count_for_coffee(&self, coffee_id: i32) -> u64 {
        order_line::Entity::find()
            .filter(order_line::Column::CoffeeId.eq(coffee_id))
            .count(self.db())
            .await
            .expect("count order lines")
    }

    pub async fn insert_order_line(
        &self,
        order_id: i32,
        coffee_id: i32,
        quantity: Option<Decimal>,
    ) -> i32 {
        order_line::ActiveModel {
            order_id: Set(order_id),
            coffee_id: Set(coffee_id),
            quantity: Set(quantity),
            unit_price: Set(Decimal::ONE),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("insert order line")
        .id
    }

    pub async fn execute_sql(&self, sql: &str) {
        self.db()
            .execute(Statement::from_string(
                self.db().get_database_backend(),
                sql.to_string(),
            ))
            .await
            .expect("execute raw sql");
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimals are serialized as strings; accept plain numbers too.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {other}"),
    }
}
