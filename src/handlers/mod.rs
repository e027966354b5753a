//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check, runtime config script, frontend load hook
//! - `mode` - API mode selection (GPT Realtime or Voice Live)
//! - `session` - Ephemeral GPT Realtime session broker
//! - `tools` - Tool definitions and function-call execution
//! - `kv` - Scratch key-value store for the frontend
//! - `voicelive` - Voice Live relay WebSocket, config, voices and synthesis

pub mod api;
pub mod kv;
pub mod mode;
pub mod session;
pub mod tools;
pub mod voicelive;

pub use voicelive::voicelive_ws_handler;
