use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeRequest {
    pub v: u32,
    pub id: String,
    pub cmd: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct BridgeResponse<T> {
    pub v: u32,
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> BridgeResponse<T> {
    pub fn ok(v: u32, id: String, data: T) -> Self {
        Self {
            v,
            id,
            status: "ok",
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(v: u32, id: String, code: &'static str, error: String) -> Self {
        Self {
            v,
            id,
            status: "error",
            data: None,
            error: Some(error),
            code: Some(code),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BridgeEvent {
    pub v: u32,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl BridgeEvent {
    pub fn data(event: &'static str, seq: Option<u64>, data: serde_json::Value) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            event,
            seq,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(seq: Option<u64>, code: &'static str, error: String) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            event: "error",
            seq,
            data: None,
            error: Some(error),
            code: Some(code),
        }
    }
}

// Payloads

#[derive(Debug, Deserialize)]
pub struct OpenPayload {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct TablePayload {
    pub table: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterPayload {
    #[serde(default)]
    pub text: String,
    /// A column name, or absent / "All Columns" for every text column.
    #[serde(default)]
    pub column: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageSizePayload {
    pub size: u64,
}
