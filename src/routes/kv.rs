use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, kv};
use crate::state::AppState;
use std::sync::Arc;

/// Routes used by the frontend framework runtime (`/_spark/*`)
pub fn create_kv_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/_spark/loaded", post(api::spark_loaded))
        .route(
            "/_spark/kv/{key}",
            get(kv::kv_get).post(kv::kv_set).delete(kv::kv_delete),
        )
        .layer(TraceLayer::new_for_http())
}
