//! In-memory key-value store used by the frontend framework.

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

pub async fn kv_get(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> AppResult<Json<Value>> {
    state
        .kv_get(&key)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Key '{key}' not found")))
}

/// Store the body, unwrapping `{"value": ...}` envelopes.
pub async fn kv_set(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Bytes,
) -> Json<Value> {
    let value = stored_value(&body);
    state.kv_set(key.clone(), value);
    Json(json!({ "status": "ok", "key": key }))
}

pub async fn kv_delete(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<Value> {
    state.kv_delete(&key);
    Json(json!({ "status": "ok" }))
}

/// Unparsable bodies are stored as `null`.
fn stored_value(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) if map.contains_key("value") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        Ok(value) => value,
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_value() {
        assert_eq!(stored_value(br#"{"value": [1, 2]}"#), json!([1, 2]));
        assert_eq!(stored_value(br#"{"other": 1}"#), json!({"other": 1}));
        assert_eq!(stored_value(b"42"), json!(42));
        assert_eq!(stored_value(b"not json"), Value::Null);
        assert_eq!(stored_value(b""), Value::Null);
    }
}
