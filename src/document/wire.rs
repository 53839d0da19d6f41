//! JSON bodies shared by the HTTP document service and its client.

use serde::{Deserialize, Serialize};

use super::{Fields, Precondition, WriteMode};

/// Query string addressing a single document: `?id=<document id>`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetRequest {
    pub fields: Fields,
    pub mode: WriteMode,
    #[serde(default)]
    pub precondition: Precondition,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetResponse {
    pub version: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub precondition: Precondition,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub existed: bool,
}

/// Error body. `actual` is the stored version on a failed precondition.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<u64>,
}
