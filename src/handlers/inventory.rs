use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    Json,
};

use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, message_response, success_response, ConfirmParams, SearchParams,
};
use crate::handlers::AppState;
use crate::messages;
use crate::services::inventory::{CoffeeItemInput, ItemFilter};

/// `GET /coffees?type_id=&text=`
pub async fn list_coffees(
    State(state): State<AppState>,
    filter: Result<Query<ItemFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(filter) = filter?;
    let items = state.services.inventory.list_items(filter).await?;
    Ok(success_response(items))
}

pub async fn get_coffee(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let item = state.services.inventory.get_item(id).await?;
    Ok(success_response(item))
}

pub async fn create_coffee(
    State(state): State<AppState>,
    payload: Result<Json<CoffeeItemInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload?;
    let item = state.services.inventory.create_item(input).await?;
    Ok(created_response(item, messages::COFFEE_ADDED))
}

pub async fn update_coffee(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CoffeeItemInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let item = state.services.inventory.update_item(id, input).await?;
    Ok(message_response(item, messages::COFFEE_UPDATED))
}

pub async fn delete_coffee(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    params: Result<Query<ConfirmParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let outcome = state
        .services
        .inventory
        .delete_item(id, params.confirmation())
        .await?;
    let message = outcome.message();
    Ok(message_response(outcome, message))
}

/// Dropdown suggestions: `GET /coffees/search?q=`
pub async fn search_coffees(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let hits = state.services.inventory.search(&params.q).await?;
    Ok(success_response(hits))
}

/// Single lookup by id, name or description: `GET /coffees/find?q=`
pub async fn find_coffee(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let item = state.services.inventory.find(&params.q).await?;
    Ok(success_response(item))
}
