//! Response shaping: date presentation, sensitive-column stripping, and
//! pagination arithmetic.

use crate::model::EntitySpec;
use chrono::DateTime;
use serde_json::Value;

/// Zero-padded day-month-year, the format the frontend renders verbatim.
const DATE_FMT: &str = "%d-%m-%Y";

/// Prepare one stored row for a response: drop sensitive columns (password
/// hashes) and render both server timestamps as DD-MM-YYYY.
pub fn present(entity: &EntitySpec, mut row: Value) -> Value {
    if let Value::Object(ref mut map) = row {
        for f in entity.fields {
            if f.sensitive {
                map.remove(f.name);
            }
        }
        for key in ["createdAt", "updatedAt"] {
            if let Some(Value::String(raw)) = map.get(key) {
                if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
                    map.insert(key.into(), Value::String(ts.format(DATE_FMT).to_string()));
                }
            }
        }
    }
    row
}

pub fn present_many(entity: &EntitySpec, rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter().map(|r| present(entity, r)).collect()
}

/// totalPages = ceil(totalRecords / limit); zero limit yields zero pages
/// rather than a division panic.
pub fn total_pages(total_records: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total_records + limit - 1) / limit
}
