//! Collaborator contracts: the remote store and the definition source.

use async_trait::async_trait;
use futures::stream::BoxStream;
use rekon_core::{Identity, LabelSelector, RawDefinition, Result, StoreError};

/// The system of record for resource existence, fields, and deletion.
///
/// Implementations own transport, authentication, and retries. The cache
/// calls these without holding any lock and passes failures through
/// unchanged.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the current definition of one resource.
    async fn fetch(&self, identity: &Identity) -> Result<RawDefinition, StoreError>;

    /// Delete one resource from the remote store.
    async fn delete(&self, identity: &Identity) -> Result<(), StoreError>;
}

/// Produces raw definitions for list operations.
///
/// Each call returns a fresh stream. Streams are pulled lazily, one
/// definition per consumed element, so a caller that stops early never
/// causes the remainder to be fetched.
pub trait DefinitionSource: Send + Sync {
    /// Enumerate definitions in a namespace, or across all of them when
    /// `namespace` is `None`, optionally narrowed by a label selector.
    fn list_definitions<'a>(
        &'a self,
        namespace: Option<&'a str>,
        selector: Option<&'a LabelSelector>,
    ) -> BoxStream<'a, Result<RawDefinition, StoreError>>;
}
