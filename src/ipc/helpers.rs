use crate::ipc::error::err;
use crate::roster::ImportKind;
use serde_json::Value;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        HandlerErr {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn parse_kind(params: &Value) -> Result<ImportKind, HandlerErr> {
    let raw = get_required_str(params, "kind")?;
    ImportKind::parse(&raw).map_err(|e| HandlerErr::new("bad_params", e.to_string()))
}

/// Upload contents come inline as `text` or from disk via `inPath`.
pub fn read_upload(params: &Value) -> Result<Vec<u8>, HandlerErr> {
    if let Some(text) = params.get("text").and_then(|v| v.as_str()) {
        return Ok(text.as_bytes().to_vec());
    }
    let in_path = get_required_str(params, "inPath")
        .map_err(|_| HandlerErr::new("bad_params", "missing text or inPath"))?;
    std::fs::read(&in_path).map_err(|e| HandlerErr {
        code: "read_failed",
        message: e.to_string(),
        details: Some(serde_json::json!({ "path": in_path })),
    })
}

pub fn db_err(e: anyhow::Error) -> HandlerErr {
    HandlerErr::new("db_query_failed", format!("{e:#}"))
}
