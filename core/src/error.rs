//! Error types for the resource request builder.
//!
//! # Design
//! `MissingParameter` is the only failure the builders themselves raise. It is
//! returned before any part of a descriptor is built, so callers never see a
//! half-built request. The remaining variants cover codec failures, registry
//! misses and the status mapping applied by `HttpRequest::parse`.

use thiserror::Error;

/// Errors returned by builders, codecs and response parsing.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required identifier or payload was absent.
    #[error("required parameter `{parameter}` was null or undefined when calling {operation}")]
    MissingParameter {
        parameter: String,
        operation: String,
    },

    /// No metadata is registered under this resource name.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be turned into the expected entity.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The payload could not be rendered to wire JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Name of the missing parameter, if this is a `MissingParameter` error.
    pub fn missing_parameter(&self) -> Option<&str> {
        match self {
            ApiError::MissingParameter { parameter, .. } => Some(parameter.as_str()),
            _ => None,
        }
    }

    /// Operation that raised a `MissingParameter` error.
    pub fn operation(&self) -> Option<&str> {
        match self {
            ApiError::MissingParameter { operation, .. } => Some(operation.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_message_names_parameter_and_operation() {
        let err = ApiError::MissingParameter {
            parameter: "id".to_string(),
            operation: "deleteAgent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "required parameter `id` was null or undefined when calling deleteAgent"
        );
        assert_eq!(err.missing_parameter(), Some("id"));
        assert_eq!(err.operation(), Some("deleteAgent"));
    }

    #[test]
    fn other_variants_have_no_parameter() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert!(err.missing_parameter().is_none());
        assert!(err.operation().is_none());
    }
}
