//! Raw definitions, the decoded payloads collaborators hand to the cache.
//!
//! A [`RawDefinition`] is what the remote store or a list source returns:
//! a metadata block plus an undecoded spec payload. The cache turns these
//! into typed live objects; nothing here touches the wire.

use crate::identity::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata block of a raw definition.
///
/// Field names on the wire are camelCase. Everything except `name` is
/// optional so that partial responses still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name, required on every definition.
    pub name: String,
    /// Namespace, absent for cluster-scoped resources.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Server-assigned unique id for this incarnation of the resource.
    #[serde(default)]
    pub uid: Option<String>,
    /// Opaque version token, changes on every remote write.
    #[serde(default)]
    pub resource_version: Option<String>,
    /// Spec generation counter maintained by the remote store.
    #[serde(default)]
    pub generation: Option<i64>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Set once the remote store has begun deleting the resource.
    #[serde(default)]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// The identity this metadata describes. All cache keys derive from
    /// this one rule.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

/// One resource as reported by the remote store: metadata plus the spec
/// payload, still undecoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDefinition {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Option<serde_json::Value>,
}

impl RawDefinition {
    /// The identity of the resource this definition describes.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.metadata.identity()
    }
}
