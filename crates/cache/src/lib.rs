//! Identity cache for reconcile loops
//!
//! This crate provides an in-process, per-resource-type object cache with:
//! - At most one live instance per `(namespace, name)` identity
//! - Merge-in-place observation loading with deletion-marker eviction
//! - Read-through lookups against a pluggable remote store
//! - Lazy list streams that fold definitions into the cache as they arrive
//! - Per-object locks for serializing multi-step reconcile sequences
//!
//! The cache trusts its collaborators: failures from the remote store or
//! the definition source pass through unchanged, and nothing here retries.

pub mod cache;
pub mod object;
pub mod observed;
pub mod stats;
pub mod store;

// Re-export main types and traits selectively
pub use cache::IdentityCache;
pub use object::{LiveObject, ObjectState};
pub use observed::ObservedFields;
pub use stats::CacheStatsSnapshot;
pub use store::{DefinitionSource, RemoteStore};

// Re-export the core vocabulary so downstream crates only need this one
pub use rekon_core::{
    CacheError, Identity, LabelSelector, ObjectMeta, RawDefinition, Result, StoreError,
};
