// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory object store
//!
//! Objects are kept per `(kind, namespace)` with a secondary index from
//! `(label key, label value)` to object names. The index is refreshed on
//! every [`MemoryStore::apply`] and [`MemoryStore::delete`].

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{FabricError, FabricResult};
use crate::labels::{is_managed, LabelSelector, Labels};
use crate::objects::{Kind, Object};
use crate::store::ObjectReader;

type LabelIndex = BTreeMap<(String, String), BTreeSet<String>>;

#[derive(Debug, Default)]
struct Scope {
    objects: BTreeMap<String, Object>,
    index: LabelIndex,
}

impl Scope {
    fn unindex(&mut self, name: &str, labels: &Labels) {
        for (key, value) in labels {
            let term = (key.clone(), value.clone());
            if let Some(names) = self.index.get_mut(&term) {
                names.remove(name);
                if names.is_empty() {
                    self.index.remove(&term);
                }
            }
        }
    }

    fn reindex(&mut self, name: &str, labels: &Labels) {
        for (key, value) in labels {
            self.index
                .entry((key.clone(), value.clone()))
                .or_default()
                .insert(name.to_string());
        }
    }

    fn select(&self, selector: &LabelSelector) -> Vec<Object> {
        if selector.is_empty() {
            return self.objects.values().cloned().collect();
        }

        let mut names: Option<BTreeSet<&String>> = None;
        for (key, value) in selector.terms() {
            let matched: BTreeSet<&String> = self
                .index
                .get(&(key.to_string(), value.to_string()))
                .map(|names| names.iter().collect())
                .unwrap_or_default();
            names = Some(match names {
                Some(current) => current.intersection(&matched).copied().collect(),
                None => matched,
            });
        }

        names
            .unwrap_or_default()
            .into_iter()
            .filter_map(|name| self.objects.get(name).cloned())
            .collect()
    }
}

/// Process-local object store
#[derive(Debug, Default)]
pub struct MemoryStore {
    scopes: RwLock<HashMap<(Kind, String), Scope>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an object, recomputing its derived labels
    ///
    /// Managed label keys are replaced by the derivation; user labels are
    /// kept. `uid` and `creation_timestamp` are stamped on first insert and
    /// preserved on update. Returns the stored object.
    pub async fn apply(&self, object: impl Into<Object>) -> FabricResult<Object> {
        let mut object = object.into();
        let kind = object.kind();
        let name = object.name().to_string();
        let namespace = object.meta().namespace.clone();

        if name.is_empty() {
            return Err(FabricError::structural(format!("{kind} object must have a name")));
        }
        if namespace.is_empty() {
            return Err(FabricError::structural(format!("{kind} {name} must have a namespace")));
        }

        let derived = object.derive_labels();
        let mut scopes = self.scopes.write().await;
        let scope = scopes.entry((kind, namespace.clone())).or_default();

        let previous = scope.objects.get(&name).map(|existing| {
            let meta = existing.meta();
            (meta.uid, meta.creation_timestamp, meta.labels.clone())
        });

        {
            let meta = object.meta_mut();
            meta.labels.retain(|key, _| !is_managed(key));
            meta.labels.extend(derived);

            match &previous {
                Some((uid, created, _)) => {
                    meta.uid = *uid;
                    meta.creation_timestamp = *created;
                }
                None => {
                    meta.uid = Some(Uuid::now_v7());
                    meta.creation_timestamp = Some(Utc::now());
                }
            }
        }

        if let Some((_, _, old_labels)) = &previous {
            scope.unindex(&name, old_labels);
        }
        scope.reindex(&name, &object.meta().labels);
        scope.objects.insert(name.clone(), object.clone());

        debug!(
            "Applied {} {}/{} ({} labels)",
            kind,
            namespace,
            name,
            object.meta().labels.len()
        );
        Ok(object)
    }

    /// Remove an object; absence is `NotFound`
    pub async fn delete(&self, kind: Kind, namespace: &str, name: &str) -> FabricResult<Object> {
        let mut scopes = self.scopes.write().await;
        let removed = scopes
            .get_mut(&(kind, namespace.to_string()))
            .and_then(|scope| {
                let removed = scope.objects.remove(name)?;
                scope.unindex(name, &removed.meta().labels);
                Some(removed)
            })
            .ok_or_else(|| FabricError::not_found(kind, namespace, name))?;

        debug!("Deleted {} {}/{}", kind, namespace, name);
        Ok(removed)
    }

    /// Number of stored objects of `kind` in `namespace`
    pub async fn count(&self, kind: Kind, namespace: &str) -> usize {
        self.scopes
            .read()
            .await
            .get(&(kind, namespace.to_string()))
            .map_or(0, |scope| scope.objects.len())
    }
}

#[async_trait]
impl ObjectReader for MemoryStore {
    async fn get(&self, kind: Kind, namespace: &str, name: &str) -> FabricResult<Object> {
        self.scopes
            .read()
            .await
            .get(&(kind, namespace.to_string()))
            .and_then(|scope| scope.objects.get(name).cloned())
            .ok_or_else(|| FabricError::not_found(kind, namespace, name))
    }

    async fn list(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> FabricResult<Vec<Object>> {
        let objects = self
            .scopes
            .read()
            .await
            .get(&(kind, namespace.to_string()))
            .map(|scope| scope.select(selector))
            .unwrap_or_default();

        debug!(
            "Listed {} {} objects in {} matching [{}]",
            objects.len(),
            kind,
            namespace,
            selector
        );
        Ok(objects)
    }
}
