//! Display implementations for error types

use super::types::{CacheError, StoreError};
use std::fmt;

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { identity } => {
                write!(f, "resource '{identity}' not found in the remote store")
            }
            StoreError::Timeout {
                operation,
                duration,
            } => {
                write!(f, "remote {operation} timed out after {duration:?}")
            }
            StoreError::Transport { operation, source } => {
                write!(f, "remote {operation} failed: {source}")
            }
            StoreError::PermissionDenied { operation, message } => {
                write!(f, "remote {operation} denied: {message}")
            }
        }
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Store(source) => source.fmt(f),
            CacheError::Definition {
                identity, message, ..
            } => {
                write!(f, "invalid definition for '{identity}': {message}")
            }
            CacheError::NotCached { identity } => {
                write!(f, "'{identity}' is not in the cache")
            }
        }
    }
}
