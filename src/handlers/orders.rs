use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::entities::order_status::OrderStatusCode;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, message_response, success_response, ConfirmParams, PaginationParams,
};
use crate::handlers::AppState;
use crate::messages;
use crate::services::orders::{PlaceOrderRequest, QuoteRequest};

/// Either a raw status id or a status code such as `"completed"`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status_id: Option<i32>,
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    fn target_status_id(&self) -> Result<i32, ApiError> {
        match (self.status_id, self.status.as_deref()) {
            (Some(id), _) => Ok(id),
            (None, Some(code)) => OrderStatusCode::from_str(code.trim())
                .map(OrderStatusCode::id)
                .map_err(|_| ApiError::bad_request(format!("Unknown order status '{}'", code))),
            (None, None) => Err(ApiError::bad_request("status_id or status is required")),
        }
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let page = state
        .services
        .orders
        .list_orders(params.page, params.per_page)
        .await?;
    Ok(success_response(page))
}

pub async fn get_order(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let details = state.services.orders.get_order_details(id).await?;
    Ok(success_response(details))
}

/// Checkout. Responds with the receipt.
pub async fn place_order(
    State(state): State<AppState>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let receipt = state.services.orders.place_order(request).await?;
    Ok(created_response(receipt, messages::ORDER_CREATED))
}

pub async fn quote_cart(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let cart = state.services.orders.quote(request).await?;
    Ok(success_response(cart))
}

/// `POST /orders/:id/cancel?confirm=true`
pub async fn cancel_order(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    params: Result<Query<ConfirmParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let change = state
        .services
        .order_status
        .cancel_order(id, params.confirmation())
        .await?;
    let message = change.message();
    Ok(message_response(change, message))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let target = request.target_status_id()?;
    let change = state.services.order_status.update_status(id, target).await?;
    let message = change.message();
    Ok(message_response(change, message))
}
