//! Remark history for an enquiry. Remarks hold the one hard foreign key in
//! the model, so both routes resolve the enquiry first.

use crate::error::AppError;
use crate::format;
use crate::model::EntitySpec;
use crate::response::RecordBody;
use crate::state::AppState;
use crate::store::EntityStore;
use crate::validate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Serialize)]
pub struct HistoryBody {
    pub data: Vec<Value>,
}

fn entity(state: &AppState, path: &str) -> Result<&'static EntitySpec, AppError> {
    state
        .registry
        .by_path(path)
        .ok_or_else(|| AppError::Config(format!("{} entity missing from registry", path)))
}

async fn ensure_enquiry(state: &AppState, enquiry_id: i64) -> Result<(), AppError> {
    let enquiries = entity(state, "enquiries")?;
    EntityStore::get(&state.pool, enquiries, enquiry_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enquiry".into()))?;
    Ok(())
}

pub async fn add(
    State(state): State<AppState>,
    Path(enquiry_id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RecordBody>), AppError> {
    ensure_enquiry(&state, enquiry_id).await?;
    let remarks = entity(&state, "remarks")?;

    let mut record = Map::new();
    record.insert("enquiryId".into(), json!(enquiry_id));
    if let Some(text) = body.get("remarks").cloned() {
        record.insert("remarks".into(), text);
    }
    validate::validate(&record, remarks)?;

    let row = EntityStore::create(&state.pool, remarks, &record).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordBody {
            message: "Remark added successfully".into(),
            data: format::present(remarks, row),
        }),
    ))
}

pub async fn history(
    State(state): State<AppState>,
    Path(enquiry_id): Path<i64>,
) -> Result<Json<HistoryBody>, AppError> {
    ensure_enquiry(&state, enquiry_id).await?;
    let remarks = entity(&state, "remarks")?;
    let rows =
        EntityStore::find_by(&state.pool, remarks, "enquiryId", &json!(enquiry_id)).await?;
    Ok(Json(HistoryBody {
        data: format::present_many(remarks, rows),
    }))
}
