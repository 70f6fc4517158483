//! Administrative routes: cache eviction and metrics.

use crate::handlers::admin::{evict_cache, metrics};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/admin/cache/evict", post(evict_cache))
        .route("/admin/metrics", get(metrics))
        .with_state(state)
}
