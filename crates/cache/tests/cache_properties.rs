//! Property-based tests for the identity cache.
//!
//! Random operation sequences run against the cache and an in-memory
//! remote store while a reference model tracks what the mapping should
//! contain. After every step the mapping must mirror the model: at most
//! one instance per identity, reference equality across operations, and
//! last-write-wins field values.

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use parking_lot::Mutex;
use proptest::prelude::*;
use rekon_cache::{
    CacheError, DefinitionSource, Identity, IdentityCache, LabelSelector, LiveObject, ObjectMeta,
    ObservedFields, RawDefinition, RemoteStore, Result, StoreError,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Remote store whose contents the model can inspect and mutate.
#[derive(Default)]
struct PropStore {
    remote: Mutex<BTreeMap<Identity, u32>>,
}

fn remote_definition(identity: &Identity, spec: u32) -> RawDefinition {
    RawDefinition {
        metadata: ObjectMeta {
            name: identity.name.clone(),
            namespace: identity.namespace.clone(),
            ..ObjectMeta::default()
        },
        spec: Some(json!(spec)),
    }
}

#[async_trait]
impl RemoteStore for PropStore {
    async fn fetch(&self, identity: &Identity) -> Result<RawDefinition, StoreError> {
        self.remote
            .lock()
            .get(identity)
            .map(|spec| remote_definition(identity, *spec))
            .ok_or_else(|| StoreError::not_found(identity.clone()))
    }

    async fn delete(&self, identity: &Identity) -> Result<(), StoreError> {
        self.remote
            .lock()
            .remove(identity)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(identity.clone()))
    }
}

impl DefinitionSource for PropStore {
    fn list_definitions<'a>(
        &'a self,
        namespace: Option<&'a str>,
        _selector: Option<&'a LabelSelector>,
    ) -> BoxStream<'a, Result<RawDefinition, StoreError>> {
        let definitions: Vec<_> = self
            .remote
            .lock()
            .iter()
            .filter(|(identity, _)| {
                namespace.is_none() || identity.namespace.as_deref() == namespace
            })
            .map(|(identity, spec)| Ok(remote_definition(identity, *spec)))
            .collect();
        stream::iter(definitions).boxed()
    }
}

/// Identity pool the operation sequences draw from: three namespaced
/// resources and three cluster-scoped ones.
const SLOTS: usize = 6;

fn slot_identity(slot: usize) -> Identity {
    let name = ["alpha", "beta", "gamma"][slot % 3];
    if slot < 3 {
        Identity::namespaced("default", name)
    } else {
        Identity::cluster_scoped(name)
    }
}

fn slot_spec(slot: usize) -> u32 {
    100 + slot as u32
}

#[derive(Debug, Clone)]
enum Op {
    Load { slot: usize, spec: u32 },
    LoadMarked { slot: usize },
    Get { slot: usize },
    List,
    Delete { slot: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SLOTS, any::<u32>()).prop_map(|(slot, spec)| Op::Load { slot, spec }),
        (0..SLOTS).prop_map(|slot| Op::LoadMarked { slot }),
        (0..SLOTS).prop_map(|slot| Op::Get { slot }),
        Just(Op::List),
        (0..SLOTS).prop_map(|slot| Op::Delete { slot }),
    ]
}

/// What the mapping should hold: the canonical instance and its expected
/// spec value.
type Model = BTreeMap<Identity, (Arc<LiveObject<u32>>, Option<u32>)>;

fn assert_mapping_mirrors_model(cache: &IdentityCache<u32>, model: &Model) {
    assert_eq!(cache.len(), model.len());
    for (identity, (object, spec)) in model {
        let mapped = cache
            .peek(identity)
            .unwrap_or_else(|| panic!("model entry {identity} missing from the mapping"));
        assert!(Arc::ptr_eq(&mapped, object));
        assert_eq!(mapped.spec(), *spec);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: under any operation sequence the mapping holds at most
    /// one instance per identity, every operation for an identity returns
    /// that same instance, and field values reflect the latest write.
    #[test]
    fn prop_operation_sequences_preserve_uniqueness(
        ops in prop::collection::vec(arb_op(), 1..48),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let store = Arc::new(PropStore::default());
            {
                let mut remote = store.remote.lock();
                for slot in 0..SLOTS {
                    remote.insert(slot_identity(slot), slot_spec(slot));
                }
            }
            let cache: IdentityCache<u32> = IdentityCache::new(store.clone(), store.clone());
            let mut model: Model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Load { slot, spec } => {
                        let identity = slot_identity(slot);
                        let object =
                            cache.load(identity.clone(), ObservedFields::new().spec(spec));
                        if let Some((existing, _)) = model.get(&identity) {
                            assert!(Arc::ptr_eq(existing, &object));
                        }
                        model.insert(identity, (object, Some(spec)));
                    }
                    Op::LoadMarked { slot } => {
                        let identity = slot_identity(slot);
                        let object = cache.load(
                            identity.clone(),
                            ObservedFields::new().deletion_timestamp(Utc::now()),
                        );
                        assert!(object.marked_for_deletion());
                        assert!(!cache.contains(&identity));
                        model.remove(&identity);
                    }
                    Op::Get { slot } => {
                        let identity = slot_identity(slot);
                        let cached = model.get(&identity).cloned();
                        match cache.get(&identity.name, identity.namespace.as_deref()).await {
                            Ok(object) => match cached {
                                Some((existing, spec)) => {
                                    assert!(Arc::ptr_eq(&existing, &object));
                                    assert_eq!(object.spec(), spec);
                                }
                                None => {
                                    let remote = store.remote.lock().get(&identity).copied();
                                    assert_eq!(object.spec(), remote);
                                    model.insert(identity, (object, remote));
                                }
                            },
                            Err(error) => {
                                assert!(matches!(
                                    error,
                                    CacheError::Store(StoreError::NotFound { .. })
                                ));
                                assert!(cached.is_none());
                                assert!(!cache.contains(&identity));
                            }
                        }
                    }
                    Op::List => {
                        let yielded: Vec<_> =
                            cache.list(None, None).try_collect().await.unwrap();
                        let remote = store.remote.lock().clone();
                        assert_eq!(yielded.len(), remote.len());
                        for object in yielded {
                            let identity = object.identity().clone();
                            let spec = remote.get(&identity).copied();
                            if let Some((existing, _)) = model.get(&identity) {
                                assert!(Arc::ptr_eq(existing, &object));
                            }
                            assert_eq!(object.spec(), spec);
                            model.insert(identity, (object, spec));
                        }
                    }
                    Op::Delete { slot } => {
                        let identity = slot_identity(slot);
                        let Some((object, _)) = model.get(&identity).cloned() else {
                            continue;
                        };
                        let remotely_present = store.remote.lock().contains_key(&identity);
                        let result = cache.delete(&object).await;
                        if remotely_present {
                            result.unwrap();
                            model.remove(&identity);
                        } else {
                            // Remote delete fails first; the entry stays.
                            assert!(matches!(
                                result.unwrap_err(),
                                CacheError::Store(StoreError::NotFound { .. })
                            ));
                        }
                    }
                }
                assert_mapping_mirrors_model(&cache, &model);
            }
        });
    }
}

/// One partial observation: `Some` fields overwrite, `None` fields keep.
#[derive(Debug, Clone)]
struct Patch {
    spec: Option<u32>,
    uid: Option<u8>,
    generation: Option<i64>,
}

fn arb_patch() -> impl Strategy<Value = Patch> {
    (
        prop::option::of(any::<u32>()),
        prop::option::of(0u8..5),
        prop::option::of(0i64..100),
    )
        .prop_map(|(spec, uid, generation)| Patch {
            spec,
            uid,
            generation,
        })
}

proptest! {
    /// Property: merging observations folds left. Each `Some` field
    /// overwrites, each `None` keeps, and the instance reference never
    /// changes across the whole sequence.
    #[test]
    fn prop_observed_merges_fold_left(patches in prop::collection::vec(arb_patch(), 1..32)) {
        let store = Arc::new(PropStore::default());
        let cache: IdentityCache<u32> = IdentityCache::new(store.clone(), store);
        let identity = Identity::namespaced("default", "widget");

        let mut expected_spec = None;
        let mut expected_uid: Option<String> = None;
        let mut expected_generation = None;
        let mut canonical: Option<Arc<LiveObject<u32>>> = None;

        for patch in patches {
            let mut observed = ObservedFields::new();
            if let Some(spec) = patch.spec {
                observed = observed.spec(spec);
                expected_spec = Some(spec);
            }
            if let Some(uid) = patch.uid {
                let uid = format!("uid-{uid}");
                observed = observed.uid(uid.clone());
                expected_uid = Some(uid);
            }
            if let Some(generation) = patch.generation {
                observed = observed.generation(generation);
                expected_generation = Some(generation);
            }

            let object = cache.load(identity.clone(), observed);
            match &canonical {
                Some(first) => assert!(Arc::ptr_eq(first, &object)),
                None => canonical = Some(object),
            }
        }

        let object = canonical.unwrap();
        assert_eq!(object.spec(), expected_spec);
        assert_eq!(object.uid(), expected_uid);
        assert_eq!(object.generation(), expected_generation);
        assert_eq!(cache.len(), 1);
    }
}
