pub mod api;
pub mod frontend;
pub mod kv;
pub mod voicelive;

use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Assemble every route group and, when configured, the static frontend.
pub fn create_app_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .merge(api::create_api_router())
        .merge(voicelive::create_voicelive_router())
        .merge(kv::create_kv_router());

    let router = match &state.config.frontend_dist_dir {
        Some(dist_dir) => {
            info!(dist_dir = %dist_dir.display(), "Serving frontend");
            router.fallback_service(frontend::frontend_service(dist_dir))
        }
        None => router,
    };

    router.with_state(state)
}
