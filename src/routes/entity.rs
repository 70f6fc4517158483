//! Dynamic entity CRUD routes.
//!
//! Paths are parameterized on the entity name; handlers resolve the concrete
//! type through the registry. The static `getAll` segment takes precedence
//! over the id parameter during matching.

use crate::handlers::entity::{create, delete as delete_handler, get_all, get_one, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/web/:entity", post(create))
        .route("/web/:entity/getAll", get(get_all))
        .route(
            "/web/:entity/:id",
            get(get_one).put(update).delete(delete_handler),
        )
        .with_state(state)
}
