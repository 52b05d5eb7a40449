//! Error types for symlens

use std::time::Duration;

use thiserror::Error;

use crate::models::symbol::Language;

pub type SymlensResult<T> = std::result::Result<T, SymlensError>;

#[derive(Debug, Error)]
pub enum SymlensError {
    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Facade(#[from] FacadeError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The only failure the façade reports to its caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacadeError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

/// Conditions the façade absorbs into empty-but-valid answers
#[derive(Debug, Error)]
pub enum Degraded {
    #[error("{0}")]
    NotFound(String),

    #[error("'{name}' matched {count} symbols, using the first")]
    Ambiguous { name: String, count: usize },

    #[error("{operation} timed out after {}ms", after.as_millis())]
    ProviderTimeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    #[error("{operation} failed: {source}")]
    ProviderError {
        operation: &'static str,
        #[source]
        source: LspError,
    },
}

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Failed to start server: {0}")]
    ServerStart(String),

    #[error("Server not connected")]
    NotConnected,

    #[error("Server not installed: {name}. Install: {install_hint}")]
    ServerNotInstalled { name: String, install_hint: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("{language} language server terminated unexpectedly")]
    ServerTerminated { language: Language },

    #[error("{0}")]
    Timeout(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error [{code}]: {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LspError {
    pub fn server_error_friendly(code: i32, message: String) -> Self {
        let friendly_message = match code {
            -32601 => Self::format_method_not_found(&message),
            -32002 => "Server initializing. Try again in a moment.".to_string(),
            -32603 | -32801 => Self::classify_internal_error(&message),
            _ => message,
        };

        Self::ServerError {
            code,
            message: friendly_message,
        }
    }

    fn format_method_not_found(message: &str) -> String {
        let lower = message.to_lowercase();

        if lower.contains("callhierarchy") {
            "Call hierarchy not supported. Try: symlens refs <reference>".into()
        } else if lower.contains("typehierarchy") {
            "Type hierarchy not supported. Try: symlens impl <reference>".into()
        } else if lower.contains("implementation") {
            "Find implementations not supported. Try: symlens refs <reference>".into()
        } else if lower.contains("typedefinition") || lower.contains("declaration") {
            "Not supported by this server. Try: symlens def <reference>".into()
        } else {
            format!("Feature not supported: {}", message)
        }
    }

    fn classify_internal_error(message: &str) -> String {
        let msg = message.trim();
        let lower = msg.to_lowercase();

        if msg.is_empty() || lower == "internal error" || lower == "internal error." {
            return "Operation failed. The position may be invalid.".to_string();
        }

        if lower.contains("invalid offset") || lower.contains("out of bounds") {
            "Invalid position: line or column exceeds file bounds.".to_string()
        } else if lower.contains("content modified") || lower.contains("version mismatch") {
            "File changed during operation. Please retry.".to_string()
        } else if lower.contains("not found") || lower.contains("no such file") {
            "File not found or inaccessible.".to_string()
        } else {
            msg.to_string()
        }
    }
}

impl From<crate::infra::lsp::protocol::ResponseError> for LspError {
    fn from(err: crate::infra::lsp::protocol::ResponseError) -> Self {
        LspError::server_error_friendly(err.code, err.message)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
