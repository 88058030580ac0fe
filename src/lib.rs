//! Coffee Grinder point of sale
//!
//! Inventory, checkout, cancellation and order history for a coffee
//! grinder shop, served over HTTP.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod messages;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod services;
pub mod tracing;
pub mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use http::HeaderValue;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::services::AppServices;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        let services = AppServices::new(db.clone(), &config);
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }
}

/// Envelope for every successful JSON body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    use handlers::{coffee_types, dashboard, inventory, orders};

    Router::new()
        .route(
            "/coffee-types",
            get(coffee_types::list_coffee_types).post(coffee_types::create_coffee_type),
        )
        .route("/coffee-types/:id", delete(coffee_types::delete_coffee_type))
        .route(
            "/coffees",
            get(inventory::list_coffees).post(inventory::create_coffee),
        )
        .route("/coffees/search", get(inventory::search_coffees))
        .route("/coffees/find", get(inventory::find_coffee))
        .route(
            "/coffees/:id",
            get(inventory::get_coffee)
                .put(inventory::update_coffee)
                .delete(inventory::delete_coffee),
        )
        .route("/cart/quote", post(orders::quote_cart))
        .route("/orders", get(orders::list_orders).post(orders::place_order))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/cancel", post(orders::cancel_order))
        .route("/orders/:id/status", put(orders::update_order_status))
        .route("/dashboard", get(dashboard::get_dashboard))
}

/// Full application router: health, the v1 API and the HTTP middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        // Outermost so every span and error body sees the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                ::tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else if config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn message_is_carried_alongside_data() {
        let response = ApiResponse::with_message(7, messages::ORDER_CREATED);
        assert!(response.success);
        assert_eq!(response.data, Some(7));
        assert_eq!(response.message.as_deref(), Some(messages::ORDER_CREATED));
    }
}
