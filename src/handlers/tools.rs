use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::core::tools::ToolArguments;
use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<Value>,
    pub tool_choice: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct FunctionCallRequest {
    pub name: String,
    /// Call id supplied by the realtime model
    pub call_id: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

#[derive(Debug, Serialize)]
pub struct FunctionCallResponse {
    pub call_id: String,
    pub output: Map<String, Value>,
}

/// Tool definitions for the frontend to register with its session.
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.tools.list_definitions(),
        tool_choice: "auto",
    })
}

/// Execute a tool requested by the model.
pub async fn function_call(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FunctionCallRequest>,
) -> AppResult<Json<FunctionCallResponse>> {
    info!(name = %request.name, call_id = %request.call_id, "Executing function call");

    let output = state.tools.execute(&request.name, request.arguments).await?;

    Ok(Json(FunctionCallResponse {
        call_id: request.call_id,
        output,
    }))
}
