//! Live objects: the canonical in-memory instance of one external resource.

use crate::observed::ObservedFields;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rekon_core::{CacheError, Identity, RawDefinition, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::{Mutex, MutexGuard};

/// The mutable fields of a live object, guarded by its state lock.
#[derive(Debug, Clone)]
pub struct ObjectState<S> {
    pub spec: Option<S>,
    pub uid: Option<String>,
    pub resource_version: Option<String>,
    pub generation: Option<i64>,
    pub labels: BTreeMap<String, String>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

/// The canonical, shared representation of one external resource.
///
/// The cache hands out `Arc<LiveObject<S>>` and keeps at most one instance
/// per identity, so every holder observes the same mutations. Construction
/// goes through the cache; holders receive shared references and must not
/// build competing instances for the same identity.
///
/// Two locks live here. The state lock guards the mutable fields and is
/// only ever held for plain reads and writes, never across a suspension
/// point. The object lock ([`LiveObject::lock`]) is the coarse mutual
/// exclusion handle reconcile logic holds across whole multi-step
/// sequences, remote calls included.
pub struct LiveObject<S> {
    identity: Identity,
    state: RwLock<ObjectState<S>>,
    lock: Mutex<()>,
}

impl<S> LiveObject<S> {
    pub(crate) fn from_fields(identity: Identity, observed: ObservedFields<S>) -> Self {
        Self {
            identity,
            state: RwLock::new(ObjectState {
                spec: observed.spec,
                uid: observed.uid,
                resource_version: observed.resource_version,
                generation: observed.generation,
                labels: observed.labels.unwrap_or_default(),
                deletion_timestamp: observed.deletion_timestamp,
            }),
            lock: Mutex::new(()),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.identity.namespace.as_deref()
    }

    /// Acquire the object lock.
    ///
    /// Unlike the state lock this one is meant to be held across `.await`:
    /// take it around a read-decide-write sequence to keep concurrent
    /// reconcile steps for the same resource from interleaving.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn uid(&self) -> Option<String> {
        self.state.read().uid.clone()
    }

    pub fn resource_version(&self) -> Option<String> {
        self.state.read().resource_version.clone()
    }

    pub fn generation(&self) -> Option<i64> {
        self.state.read().generation
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.state.read().labels.clone()
    }

    pub fn deletion_timestamp(&self) -> Option<DateTime<Utc>> {
        self.state.read().deletion_timestamp
    }

    /// Whether the remote store has begun deleting this resource.
    pub fn marked_for_deletion(&self) -> bool {
        self.state.read().deletion_timestamp.is_some()
    }

    /// Merge a partial observation into the object in place.
    ///
    /// Fields the observation carries overwrite, fields it omits survive.
    /// The deletion timestamp can be set here but never cleared.
    pub fn update(&self, observed: ObservedFields<S>) {
        let mut state = self.state.write();
        if let Some(spec) = observed.spec {
            state.spec = Some(spec);
        }
        if let Some(uid) = observed.uid {
            state.uid = Some(uid);
        }
        if let Some(resource_version) = observed.resource_version {
            state.resource_version = Some(resource_version);
        }
        if let Some(generation) = observed.generation {
            state.generation = Some(generation);
        }
        if let Some(labels) = observed.labels {
            state.labels = labels;
        }
        if let Some(deletion_timestamp) = observed.deletion_timestamp {
            state.deletion_timestamp = Some(deletion_timestamp);
        }
    }
}

impl<S: Clone> LiveObject<S> {
    pub fn spec(&self) -> Option<S> {
        self.state.read().spec.clone()
    }

    /// A point-in-time copy of every mutable field.
    pub fn snapshot(&self) -> ObjectState<S> {
        self.state.read().clone()
    }
}

impl<S: DeserializeOwned> LiveObject<S> {
    pub(crate) fn from_definition(definition: RawDefinition) -> Result<Self> {
        let identity = definition.identity();
        let spec = decode_spec(&identity, definition.spec)?;
        let meta = definition.metadata;
        Ok(Self {
            identity,
            state: RwLock::new(ObjectState {
                spec,
                uid: meta.uid,
                resource_version: meta.resource_version,
                generation: meta.generation,
                labels: meta.labels,
                deletion_timestamp: meta.deletion_timestamp,
            }),
            lock: Mutex::new(()),
        })
    }

    /// Replace the object's fields wholesale from a freshly listed
    /// definition.
    ///
    /// Fields the definition omits become unset, including the deletion
    /// timestamp. The spec payload is decoded before any field is touched,
    /// so a decode failure leaves the object exactly as it was.
    pub fn update_from_definition(&self, definition: &RawDefinition) -> Result<()> {
        debug_assert_eq!(definition.identity(), self.identity);
        let spec = decode_spec(&self.identity, definition.spec.clone())?;
        let meta = &definition.metadata;
        let mut state = self.state.write();
        state.spec = spec;
        state.uid = meta.uid.clone();
        state.resource_version = meta.resource_version.clone();
        state.generation = meta.generation;
        state.labels = meta.labels.clone();
        state.deletion_timestamp = meta.deletion_timestamp;
        Ok(())
    }
}

impl<S> fmt::Debug for LiveObject<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveObject")
            .field("identity", &self.identity)
            .field("marked_for_deletion", &self.marked_for_deletion())
            .finish_non_exhaustive()
    }
}

fn decode_spec<S: DeserializeOwned>(
    identity: &Identity,
    payload: Option<serde_json::Value>,
) -> Result<Option<S>> {
    match payload {
        Some(value) => serde_json::from_value(value).map(Some).map_err(|source| {
            CacheError::definition_decode(
                identity.clone(),
                "spec payload does not match the resource's spec type",
                source,
            )
        }),
        None => Ok(None),
    }
}
