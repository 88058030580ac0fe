use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::handlers::common::{created_response, message_response, success_response, ConfirmParams};
use crate::handlers::AppState;
use crate::messages;

#[derive(Debug, Deserialize)]
pub struct CreateCoffeeTypeRequest {
    pub name: String,
}

pub async fn list_coffee_types(State(state): State<AppState>) -> Result<Response, ApiError> {
    let types = state.services.coffee_types.list_types().await?;
    Ok(success_response(types))
}

pub async fn create_coffee_type(
    State(state): State<AppState>,
    payload: Result<Json<CreateCoffeeTypeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let created = state.services.coffee_types.create_type(&request.name).await?;
    Ok(created_response(created, messages::TYPE_ADDED))
}

pub async fn delete_coffee_type(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    params: Result<Query<ConfirmParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let outcome = state
        .services
        .coffee_types
        .delete_type(id, params.confirmation())
        .await?;
    let message = outcome.message();
    Ok(message_response(outcome, message))
}
