//! Partial observations delivered to the cache's load path.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One partial observation of a resource, as reported by whatever feeds
/// the reconcile loop.
///
/// Every field is optional: `Some` overwrites the object's current value
/// when merged, `None` leaves it alone. The deletion timestamp is
/// monotonic under merges: an observation can set it but never clear it.
/// Only a full definition replace clears the marker.
#[derive(Debug, Clone)]
pub struct ObservedFields<S> {
    pub spec: Option<S>,
    pub uid: Option<String>,
    pub resource_version: Option<String>,
    pub generation: Option<i64>,
    pub labels: Option<BTreeMap<String, String>>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl<S> Default for ObservedFields<S> {
    fn default() -> Self {
        Self {
            spec: None,
            uid: None,
            resource_version: None,
            generation: None,
            labels: None,
            deletion_timestamp: None,
        }
    }
}

impl<S> ObservedFields<S> {
    /// An observation that carries nothing. Merging it is a no-op.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn spec(mut self, spec: S) -> Self {
        self.spec = Some(spec);
        self
    }

    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn resource_version(mut self, resource_version: impl Into<String>) -> Self {
        self.resource_version = Some(resource_version.into());
        self
    }

    #[must_use]
    pub fn generation(mut self, generation: i64) -> Self {
        self.generation = Some(generation);
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Adds a single label, creating the label set if this is the first.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn deletion_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.deletion_timestamp = Some(at);
        self
    }
}
