// Copyright (c) 2025 - Cowboy AI, Inc.
//! Object Read Boundary
//!
//! Every service in this crate reads the desired-state graph through
//! [`ObjectReader`] and nothing else. Reads are snapshots: two calls may
//! observe different store states, and no call is retried here.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - in-process store with a label index, used for
//!   embedding and tests
//! - [`NatsObjectReader`](crate::nats::NatsObjectReader) - request/reply
//!   against an external store service
//!
//! # Typed Access
//!
//! [`ObjectReader`] is object safe and returns the untyped [`Object`]. The
//! free functions [`get`], [`find`] and [`list`] downcast to a concrete
//! [`FabricObject`].

use async_trait::async_trait;

use crate::errors::{FabricError, FabricResult};
use crate::labels::LabelSelector;
use crate::objects::{FabricObject, Kind, Object};

pub mod memory;

pub use memory::MemoryStore;

/// Read-only view of the object store
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Fetch one object; absence is [`FabricError::NotFound`]
    async fn get(&self, kind: Kind, namespace: &str, name: &str) -> FabricResult<Object>;

    /// List objects of `kind` matching `selector`, sorted by name
    async fn list(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> FabricResult<Vec<Object>>;
}

/// Fetch a typed object
pub async fn get<T: FabricObject>(
    reader: &dyn ObjectReader,
    namespace: &str,
    name: &str,
) -> FabricResult<T> {
    reader.get(T::KIND, namespace, name).await?.into_typed()
}

/// Fetch a typed object, mapping absence to `None`
pub async fn find<T: FabricObject>(
    reader: &dyn ObjectReader,
    namespace: &str,
    name: &str,
) -> FabricResult<Option<T>> {
    match get::<T>(reader, namespace, name).await {
        Ok(object) => Ok(Some(object)),
        Err(FabricError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// List typed objects matching `selector`
pub async fn list<T: FabricObject>(
    reader: &dyn ObjectReader,
    namespace: &str,
    selector: &LabelSelector,
) -> FabricResult<Vec<T>> {
    reader
        .list(T::KIND, namespace, selector)
        .await?
        .into_iter()
        .map(|object| object.into_typed::<T>())
        .collect()
}
