//! Dynamic entity CRUD handlers. Each handler resolves the entity name from
//! the path through the registry and dispatches through the variant's
//! operation table.

use crate::binder::EntityBody;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

pub async fn get_all(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<Json<Value>, AppError> {
    let entry = state.registry.resolve(&entity)?;
    let rows = entry.ops().find_all(&state.service).await?;
    Ok(Json(rows))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((entity, id_str)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let entry = state.registry.resolve(&entity)?;
    let id = parse_id(&id_str)?;
    let row = entry
        .ops()
        .find_one(&state.service, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", entity, id)))?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    body: EntityBody,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entry = state.registry.resolve(body.0.entity)?;
    let row = entry.ops().create(&state.service, body.0.record).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((entity, id_str)): Path<(String, String)>,
    body: EntityBody,
) -> Result<Json<Value>, AppError> {
    let entry = state.registry.resolve(&entity)?;
    let id = parse_id(&id_str)?;
    let row = entry.ops().update(&state.service, id, body.0.record).await?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((entity, id_str)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let entry = state.registry.resolve(&entity)?;
    let id = parse_id(&id_str)?;
    entry.ops().delete(&state.service, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
