use axum::{extract::State, response::Response};

use crate::errors::ApiError;
use crate::handlers::common::success_response;
use crate::handlers::AppState;

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Response, ApiError> {
    let snapshot = state.services.dashboard.snapshot().await?;
    Ok(success_response(snapshot))
}
