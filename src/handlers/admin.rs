//! Administrative handlers: cache eviction and counter snapshots.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::collections::BTreeMap;

pub async fn evict_cache(State(state): State<AppState>) -> StatusCode {
    state.service.evict_all();
    StatusCode::NO_CONTENT
}

pub async fn metrics(State(state): State<AppState>) -> Json<BTreeMap<String, u64>> {
    Json(state.service.counters().snapshot())
}
