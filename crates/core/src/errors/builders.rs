//! Builder methods for creating errors with context

use super::types::{CacheError, StoreError};
use crate::identity::Identity;
use std::time::Duration;

impl StoreError {
    /// Create a not-found error for the given identity
    #[must_use]
    pub fn not_found(identity: Identity) -> Self {
        StoreError::NotFound { identity }
    }

    /// Create a timeout error for a named remote operation
    #[must_use]
    pub fn timeout(operation: &'static str, duration: Duration) -> Self {
        StoreError::Timeout {
            operation,
            duration,
        }
    }

    /// Create a transport error wrapping the underlying failure
    #[must_use]
    pub fn transport(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::Transport {
            operation,
            source: source.into(),
        }
    }

    /// Create a permission-denied error with the store's message
    #[must_use]
    pub fn permission_denied(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::PermissionDenied {
            operation,
            message: message.into(),
        }
    }
}

impl CacheError {
    /// Create a definition error without an underlying decode failure
    #[must_use]
    pub fn definition(identity: Identity, message: impl Into<String>) -> Self {
        CacheError::Definition {
            identity,
            message: message.into(),
            source: None,
        }
    }

    /// Create a definition error carrying the decode failure
    #[must_use]
    pub fn definition_decode(
        identity: Identity,
        message: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        CacheError::Definition {
            identity,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a not-cached error for the given identity
    #[must_use]
    pub fn not_cached(identity: Identity) -> Self {
        CacheError::NotCached { identity }
    }
}
