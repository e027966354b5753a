pub mod broker;
pub mod credentials;
pub mod relay;
pub mod tools;
pub mod voice_live;

pub use broker::{BrokerError, SessionBroker, SessionGrant};
pub use credentials::{AzureCredential, CredentialError, StaticTokenProvider, TokenProvider};
pub use tools::{FnTool, ToolArguments, ToolError, ToolExecutor, ToolRegistry};
