//! Generic entity CRUD handlers, dispatched by path segment.

use crate::auth::password;
use crate::error::AppError;
use crate::format;
use crate::model::{EntitySpec, Op};
use crate::response::{ListBody, MessageBody, RecordBody, ToggleBody};
use crate::state::AppState;
use crate::store::EntityStore;
use crate::validate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// Saturates instead of overflowing on absurd client-supplied page numbers.
fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

fn resolve(state: &AppState, path: &str, op: Op) -> Result<&'static EntitySpec, AppError> {
    let entity = state
        .registry
        .by_path(path)
        .ok_or_else(|| AppError::NotFound(format!("Resource '{}'", path)))?;
    if !entity.allows(op) {
        return Err(AppError::BadRequest(format!(
            "operation not supported for {}",
            path
        )));
    }
    Ok(entity)
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

/// Derive hook, validation, then password hashing, in that order: the
/// minimum-length rule applies to the plaintext, never to the hash.
fn prepare_body(entity: &EntitySpec, mut body: Map<String, Value>) -> Result<Map<String, Value>, AppError> {
    if let Some(prepare) = entity.prepare {
        prepare(&mut body);
    }
    validate::validate(&body, entity)?;
    for f in entity.fields {
        if !f.hashed {
            continue;
        }
        if let Some(Value::String(plain)) = body.get(f.name) {
            let hashed = password::hash(plain)?;
            body.insert(f.name.to_string(), Value::String(hashed));
        }
    }
    Ok(body)
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RecordBody>), AppError> {
    let entity = resolve(&state, &path_segment, Op::Create)?;
    let body = prepare_body(entity, body_to_map(body)?)?;
    let row = EntityStore::create(&state.pool, entity, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordBody {
            message: format!("{} created successfully", entity.label),
            data: format::present(entity, row),
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListBody>, AppError> {
    let entity = resolve(&state, &path_segment, Op::Read)?;
    let page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = page_offset(page, limit);
    let (rows, total) =
        EntityStore::page(&state.pool, entity, query.search.as_deref(), limit, offset).await?;
    Ok(Json(ListBody {
        data: format::present_many(entity, rows),
        current_page: page,
        total_pages: format::total_pages(total, limit),
        total_records: total,
    }))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve(&state, &path_segment, Op::Read)?;
    let id = parse_id(&id_str)?;
    let row = EntityStore::get(&state.pool, entity, id)
        .await?
        .ok_or_else(|| AppError::NotFound(entity.label.to_string()))?;
    Ok(Json(format::present(entity, row)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<RecordBody>, AppError> {
    let entity = resolve(&state, &path_segment, Op::Update)?;
    let id = parse_id(&id_str)?;
    let body = prepare_body(entity, body_to_map(body)?)?;
    let row = EntityStore::update(&state.pool, entity, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(entity.label.to_string()))?;
    Ok(Json(RecordBody {
        message: format!("{} updated successfully", entity.label),
        data: format::present(entity, row),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<Json<MessageBody>, AppError> {
    let entity = resolve(&state, &path_segment, Op::Delete)?;
    let id = parse_id(&id_str)?;
    let deleted = EntityStore::delete(&state.pool, entity, id).await?;
    if !deleted {
        return Err(AppError::NotFound(entity.label.to_string()));
    }
    Ok(Json(MessageBody {
        message: format!("{} deleted successfully", entity.label),
    }))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<Json<ToggleBody>, AppError> {
    let entity = resolve(&state, &path_segment, Op::Toggle)?;
    let id = parse_id(&id_str)?;
    let row = EntityStore::toggle_status(&state.pool, entity, id)
        .await?
        .ok_or_else(|| AppError::NotFound(entity.label.to_string()))?;
    let status = row
        .get("status")
        .and_then(Value::as_bool)
        .unwrap_or_default();
    Ok(Json(ToggleBody {
        message: format!(
            "{} has been {}",
            entity.label,
            if status { "activated" } else { "deactivated" }
        ),
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
    }

    #[test]
    fn huge_page_numbers_saturate_instead_of_overflowing() {
        assert_eq!(page_offset(i64::MAX, 10), i64::MAX);
        assert_eq!(page_offset(i64::MAX, i64::MAX), i64::MAX);
    }
}
