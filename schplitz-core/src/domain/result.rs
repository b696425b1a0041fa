//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown for every failure where a wrong answer and corrupted data
/// cannot be told apart.
pub const GENERIC_DECRYPT_MESSAGE: &str = "Wrong answer or corrupted data";

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid expense at index {index}: {reason}")]
    InvalidExpense { index: usize, reason: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Authenticated decryption failed. Deliberately carries no detail.
    #[error("Decryption failed")]
    AuthFailure,

    #[error("Unsupported data version: {0}")]
    UnsupportedVersion(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a malformed payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for failures that must be reported with the generic message
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::AuthFailure | Self::Transport(_))
    }

    /// Stable category name. Safe to log: carries no user data.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidExpense { .. } => "invalid_expense",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::AuthFailure => "auth_failure",
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::Transport(_) => "transport",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Single status line for the user at the import/export boundary
    pub fn user_message(&self) -> String {
        if self.is_opaque() {
            GENERIC_DECRYPT_MESSAGE.to_string()
        } else {
            format!("Import failed: {}", self)
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Attach a context value
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.user_message()),
        }
    }
}
