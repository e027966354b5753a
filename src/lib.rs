pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::{ApiMode, ServerConfig};
pub use crate::core::{
    AzureCredential, BrokerError, SessionBroker, SessionGrant, ToolArguments, ToolError,
    ToolExecutor, ToolRegistry,
};
pub use errors::app_error::{AppError, AppResult};
pub use state::AppState;
