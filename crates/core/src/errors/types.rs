//! Core error type definitions

use crate::identity::Identity;
use std::time::Duration;

/// Result type alias for rekon operations
pub type Result<T, E = CacheError> = std::result::Result<T, E>;

/// A failure reported by a collaborator: the remote store or a
/// definition source.
///
/// The cache performs no retries and no translation. Collaborator
/// failures pass through cache operations verbatim so reconcile logic
/// can decide what each one means.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The remote store has no resource with this identity
    NotFound { identity: Identity },

    /// A remote call did not complete in time
    Timeout {
        operation: &'static str,
        duration: Duration,
    },

    /// Transport-level failure while talking to the remote store
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The remote store rejected the call
    PermissionDenied {
        operation: &'static str,
        message: String,
    },
}

/// A failure surfaced by a cache operation
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A collaborator failed; carried through unchanged
    Store(#[from] StoreError),

    /// A raw definition could not be decoded into a live object
    Definition {
        identity: Identity,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Deletion was asked to evict an instance that is not in the cache
    NotCached { identity: Identity },
}
