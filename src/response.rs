//! Response bodies shared across handlers. Field names are the wire contract
//! the existing frontend consumes.

use serde::Serialize;
use serde_json::Value;

/// Create/update result: human message plus the affected record.
#[derive(Serialize)]
pub struct RecordBody {
    pub message: String,
    pub data: Value,
}

/// Paginated list with the metadata triple.
#[derive(Serialize)]
pub struct ListBody {
    pub data: Vec<Value>,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "totalRecords")]
    pub total_records: i64,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Status-toggle result: message plus the new flag value.
#[derive(Serialize)]
pub struct ToggleBody {
    pub message: String,
    pub status: bool,
}

#[derive(Serialize)]
pub struct LoginBody {
    pub message: String,
    pub token: String,
    pub user: Value,
}
