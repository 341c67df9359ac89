//! Plan catalog routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use clinicloud_billing::Plan;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<Plan>,
}

/// List every plan in the catalog
pub async fn list_plans(State(state): State<AppState>) -> Json<PlansResponse> {
    Json(PlansResponse {
        plans: state.quotes.catalog().plans().to_vec(),
    })
}

/// Get a single plan by slug
pub async fn get_plan(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Plan>, ApiError> {
    state
        .quotes
        .catalog()
        .get(&slug)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound)
}
