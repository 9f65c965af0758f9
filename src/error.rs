//! Error types for resource dispatch
//!
//! Configuration problems (unknown resources, unknown actions, methods the
//! transport cannot serve) are reported before any request leaves the
//! process. Everything else surfaces as the failure of an action's future
//! and, while it is still inside a chain, can be recovered by an
//! interceptor's failure hook.

use crate::resource::HttpMethod;

/// Result alias used throughout the crate.
pub type Result<T, E = ResourceError> = std::result::Result<T, E>;

/// Errors produced while binding or dispatching resource actions.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The resource key has no registered definition.
    #[error("Resource '{0}' is not a configured resource")]
    Configuration(String),

    /// The resource exists but does not declare the requested action.
    #[error("Resource '{resource}' has no action '{action}'")]
    UnknownAction { resource: String, action: String },

    /// The transport has no request function for this method.
    #[error("{0} is not a valid request method for this transport")]
    MethodResolution(HttpMethod),

    /// An array action received something other than a sequence.
    #[error("Action '{action}' expects an array response but received {found}")]
    ShapeMismatch { action: String, found: &'static str },

    /// A success or failure hook rejected.
    #[error("Interceptor failed: {0}")]
    Interceptor(String),

    /// Opaque failure raised by the transport layer.
    #[error("Transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-success status.
    #[error("API request failed: {status}")]
    Status { status: u16, body: String },

    /// The options argument of an action call could not be decoded.
    #[error("Invalid request options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl ResourceError {
    /// Build an interceptor failure from any displayable reason.
    pub fn interceptor(reason: impl std::fmt::Display) -> Self {
        ResourceError::Interceptor(reason.to_string())
    }

    /// Wrap a transport-level error.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ResourceError::Transport(Box::new(err))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Name of a JSON value's shape, for error messages.
pub(crate) fn shape_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
