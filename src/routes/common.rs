//! Common routes: health and version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    /// Persisted record count per registered entity name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    entities: BTreeMap<&'static str, u64>,
}

async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthBody>, (StatusCode, Json<HealthBody>)> {
    let mut entities = BTreeMap::new();
    for entry in state.registry.iter() {
        match entry.ops().count(&state.service).await {
            Ok(count) => {
                entities.insert(entry.meta.name, count);
            }
            Err(err) => {
                tracing::warn!(entity = entry.meta.name, %err, "health count failed");
                return Err((
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthBody {
                        status: "degraded",
                        entities: BTreeMap::new(),
                    }),
                ));
            }
        }
    }
    Ok(Json(HealthBody {
        status: "ok",
        entities,
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes: GET /health (per-entity record counts), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .with_state(state)
}
