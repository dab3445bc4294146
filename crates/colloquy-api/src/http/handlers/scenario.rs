//! Scenario catalog handlers.
//!
//! Endpoints:
//! - GET /api/v1/scenarios       - List the scenario catalog
//! - GET /api/v1/scenarios/{id}  - Get one scenario

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use colloquy_types::error::SessionError;
use colloquy_types::scenario::Scenario;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/scenarios - List all scenarios, sorted by name.
pub async fn list_scenarios(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Scenario>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let scenarios: Vec<Scenario> = state
        .sessions
        .catalog()
        .list()
        .into_iter()
        .cloned()
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(scenarios, request_id, elapsed)
        .with_link("self", "/api/v1/scenarios");

    Ok(Json(resp))
}

/// GET /api/v1/scenarios/{id} - Get a single scenario by id.
pub async fn get_scenario(
    State(state): State<AppState>,
    Path(scenario_id): Path<String>,
) -> Result<Json<ApiResponse<Scenario>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let scenario = state
        .sessions
        .catalog()
        .get(&scenario_id)
        .ok_or_else(|| SessionError::ScenarioNotFound(scenario_id.clone()))?
        .clone();

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(scenario, request_id, elapsed)
        .with_link("self", &format!("/api/v1/scenarios/{scenario_id}"));

    Ok(Json(resp))
}
