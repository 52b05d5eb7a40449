//! Language server plumbing
//!
//! - JSON-RPC 2.0 protocol types
//! - Content-Length framed transport
//! - Request-multiplexing client
//! - Default server commands per language
//! - Lazy per-language client lifecycle

pub mod client;
pub mod manager;
pub mod protocol;
pub mod servers;
pub mod transport;

pub use client::LspClient;
pub use manager::LspManager;
pub use servers::{ServerCommand, resolve_command};
