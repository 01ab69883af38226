//! Core domain types and errors for the `rekon` identity cache.
//!
//! This crate establishes the vocabulary shared by the cache and the
//! reconcile loops built on top of it. It carries no runtime machinery;
//! everything here is plain data plus the error types.
//!
//! ## Key Components
//!
//! - **`identity`**: The `(namespace, name)` key a resource type's cache
//!   maps instances under.
//! - **`definition`**: `RawDefinition` and `ObjectMeta`, the decoded
//!   payloads collaborators hand to the cache.
//! - **`selector`**: Equality-based `LabelSelector` for list operations.
//! - **`errors`**: `StoreError` for collaborator failures, `CacheError`
//!   for cache operations, and the `Result` alias.

pub mod definition;
pub mod errors;
pub mod identity;
pub mod selector;

pub use self::{
    definition::{ObjectMeta, RawDefinition},
    errors::{CacheError, Result, StoreError},
    identity::Identity,
    selector::LabelSelector,
};
