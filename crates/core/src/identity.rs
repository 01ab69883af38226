//! Resource identity, the key under which the cache maps live objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one external resource within a resource type's cache.
///
/// Equality and hashing are structural: two identities refer to the same
/// resource exactly when both namespace and name match. The namespace is
/// absent for cluster-scoped resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    /// Namespace the resource lives in, `None` for cluster-scoped resources.
    pub namespace: Option<String>,
    /// Resource name, unique within its namespace.
    pub name: String,
}

impl Identity {
    /// Identity of a namespaced resource.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Identity of a cluster-scoped resource.
    #[must_use]
    pub fn cluster_scoped(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Builds an identity from the optional-namespace form used by lookups.
    #[must_use]
    pub fn from_parts(name: &str, namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_owned),
            name: name.to_owned(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
