//! The identity cache: at most one live object per `(namespace, name)`.
//!
//! One `IdentityCache` serves one resource type. The entry map's mutex is
//! the cache-wide lock: every mutation of the identity-to-instance mapping
//! happens inside one of its critical sections, and no critical section
//! ever spans an `.await`. Remote calls run unlocked, which buys liveness
//! at the price of relaxed consistency:
//!
//! - Two racing lookups for an uncached identity may both fetch; the later
//!   install wins and both callers keep working handles.
//! - An eviction can interleave with a fetch already in flight, briefly
//!   resurrecting the entry.
//!
//! Within a single critical section the mapping is always consistent, and
//! identity-map mutations never lose updates.

use crate::object::LiveObject;
use crate::observed::ObservedFields;
use crate::stats::{CacheStats, CacheStatsSnapshot};
use crate::store::{DefinitionSource, RemoteStore};
use futures::stream::{self, Stream, TryStreamExt};
use parking_lot::Mutex;
use rekon_core::{CacheError, Identity, LabelSelector, RawDefinition, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A per-resource-type cache of live objects keyed by identity.
///
/// The cache owns the only construction paths for [`LiveObject`], so a
/// process observes at most one instance per identity at any time. All
/// operations take `&self`; the cache is meant to be shared behind an
/// `Arc` across the tasks of a reconcile loop.
pub struct IdentityCache<S> {
    entries: Mutex<HashMap<Identity, Arc<LiveObject<S>>>>,
    store: Arc<dyn RemoteStore>,
    source: Arc<dyn DefinitionSource>,
    stats: CacheStats,
}

impl<S> IdentityCache<S> {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store,
            source,
            stats: CacheStats::default(),
        }
    }

    /// Fold an observation into the cache and return the canonical
    /// instance for its identity.
    ///
    /// If the identity is already mapped, the observation merges into the
    /// existing instance in place. Otherwise a new instance is built from
    /// the observation alone. An instance whose deletion marker is set
    /// after that step is removed from the mapping, not installed, and
    /// still returned so the caller can run teardown against it.
    ///
    /// The whole sequence runs under the cache-wide lock; concurrent loads
    /// are serialized and never double-construct an identity.
    pub fn load(&self, identity: Identity, observed: ObservedFields<S>) -> Arc<LiveObject<S>> {
        let mut entries = self.entries.lock();
        let object = match entries.get(&identity) {
            Some(existing) => {
                existing.update(observed);
                self.stats.record_merge();
                trace!("Merged observation into {identity}");
                Arc::clone(existing)
            }
            None => Arc::new(LiveObject::from_fields(identity.clone(), observed)),
        };
        if object.marked_for_deletion() {
            if entries.remove(&identity).is_some() {
                self.stats.record_eviction();
                debug!("Evicted {identity}: deletion marker is set");
            }
        } else if entries.insert(identity, Arc::clone(&object)).is_none() {
            self.stats.record_insert();
            debug!("Installed new live object {}", object.identity());
        }
        object
    }

    /// Remove one resource remotely, then drop its cache entry.
    ///
    /// The remote delete runs first, without any lock; if it fails the
    /// entry stays mapped and the failure propagates. The entry is removed
    /// unconditionally afterwards. A missing entry means this instance no
    /// longer matches the mapping, which is reported as
    /// [`CacheError::NotCached`] after the remote delete already happened.
    pub async fn delete(&self, object: &LiveObject<S>) -> Result<()> {
        let identity = object.identity();
        self.store.delete(identity).await?;
        let removed = self.entries.lock().remove(identity);
        match removed {
            Some(_) => {
                self.stats.record_eviction();
                debug!("Deleted {identity} and dropped its cache entry");
                Ok(())
            }
            None => {
                warn!("Deleted {identity} remotely but no cache entry was mapped for it");
                Err(CacheError::not_cached(identity.clone()))
            }
        }
    }

    /// The mapped instance for an identity, if any. Never touches the
    /// remote store or the lookup counters.
    pub fn peek(&self, identity: &Identity) -> Option<Arc<LiveObject<S>>> {
        self.entries.lock().get(identity).cloned()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.lock().contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<S: DeserializeOwned> IdentityCache<S> {
    /// Read-through lookup by name and namespace.
    ///
    /// A mapped identity returns its instance as-is, with no merge and no
    /// remote call. On a miss the definition is fetched outside the lock
    /// and the decoded instance installed afterwards. Two racing misses
    /// may both fetch; whichever installs second overwrites, and both
    /// callers hold working instances.
    pub async fn get(&self, name: &str, namespace: Option<&str>) -> Result<Arc<LiveObject<S>>> {
        let identity = Identity::from_parts(name, namespace);
        {
            let entries = self.entries.lock();
            if let Some(object) = entries.get(&identity) {
                self.stats.record_hit();
                trace!("Cache hit for {identity}");
                return Ok(Arc::clone(object));
            }
        }
        self.stats.record_miss();
        debug!("Cache miss for {identity}, fetching from the remote store");
        let definition = self.store.fetch(&identity).await?;
        let object = Arc::new(LiveObject::from_definition(definition)?);
        self.entries.lock().insert(identity, Arc::clone(&object));
        self.stats.record_insert();
        Ok(object)
    }

    /// Enumerate resources, merging each definition into the cache as it
    /// arrives and yielding the canonical instance.
    ///
    /// The stream is lazy: each yielded element corresponds to exactly one
    /// definition pulled from the source, so dropping the stream early
    /// leaves everything already yielded merged and fetches nothing more.
    /// A source failure is yielded as an error and terminates the stream;
    /// elements yielded before it stay merged.
    pub fn list<'a>(
        &'a self,
        namespace: Option<&'a str>,
        selector: Option<&'a LabelSelector>,
    ) -> impl Stream<Item = Result<Arc<LiveObject<S>>>> + 'a {
        debug!(
            "Listing definitions in {}",
            namespace.unwrap_or("all namespaces")
        );
        let definitions = self.source.list_definitions(namespace, selector);
        stream::try_unfold(definitions, move |mut definitions| async move {
            let Some(definition) = definitions.try_next().await? else {
                return Ok(None);
            };
            let object = self.absorb_definition(definition)?;
            Ok(Some((object, definitions)))
        })
    }

    /// Merge one listed definition into the mapping under the cache-wide
    /// lock and return the canonical instance.
    fn absorb_definition(&self, definition: RawDefinition) -> Result<Arc<LiveObject<S>>> {
        let identity = definition.identity();
        let mut entries = self.entries.lock();
        match entries.get(&identity) {
            Some(existing) => {
                existing.update_from_definition(&definition)?;
                self.stats.record_merge();
                trace!("Merged listed definition into {identity}");
                Ok(Arc::clone(existing))
            }
            None => {
                let object = Arc::new(LiveObject::from_definition(definition)?);
                entries.insert(identity, Arc::clone(&object));
                self.stats.record_insert();
                trace!("Installed listed object {}", object.identity());
                Ok(object)
            }
        }
    }
}

impl<S> fmt::Debug for IdentityCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("entries", &self.len())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
