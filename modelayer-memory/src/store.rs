//! In-memory storage implementation for the connector.
//!
//! This module provides a simple in-memory backend that keeps each collection as a list
//! of BSON documents, in insertion order, behind an async-safe read-write lock.

use std::{collections::HashMap, sync::Arc, cmp::Ordering};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};
use tracing::debug;

use modelayer_core::{
    backend::{IDENTITY_FIELD, StoreBackend, StoreBackendBuilder},
    error::{ConnectorError, ConnectorResult},
    query::{SortDirection, StoreQuery},
};

use crate::evaluator::{DocumentEvaluator, Comparable};

type StoreMap = HashMap<String, Vec<Document>>;


/// Thread-safe in-memory document storage backend.
///
/// Documents without an identity are assigned a fresh [`ObjectId`], mirroring what a
/// document store does on insert. Identities are unique per collection.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data.
///
/// # Performance
///
/// Queries scan all documents in a collection (no indexing).
///
/// # Example
///
/// ```ignore
/// use modelayer_memory::InMemoryStore;
/// use modelayer::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document(doc! { "name": "Alice" }, "users").await?;
/// assert!(id.as_object_id().is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> documents
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the documents of a collection matching the filter, in insertion order.
    fn select<'a>(documents: &'a [Document], query: &StoreQuery) -> ConnectorResult<Vec<&'a Document>> {
        match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(documents, filter),
            None => Ok(documents.iter().collect()),
        }
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, mut document: Document, collection: &str) -> ConnectorResult<Bson> {
        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        let identity = match document.get(IDENTITY_FIELD) {
            Some(identity) => identity.clone(),
            None => {
                let identity = Bson::ObjectId(ObjectId::new());
                document.insert(IDENTITY_FIELD, identity.clone());
                identity
            }
        };

        let existing = Comparable::from(&identity);
        if documents
            .iter()
            .filter_map(|d| d.get(IDENTITY_FIELD))
            .any(|id| Comparable::from(id) == existing)
        {
            return Err(ConnectorError::DocumentAlreadyExists(identity.to_string(), collection.to_string()));
        }

        documents.push(document);
        debug!(target: "modelayer::memory", collection, id = %identity, "Document inserted");

        Ok(identity)
    }

    async fn find_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<Vec<Document>> {
        let store = self.store.read().await;
        let documents = match store.get(collection) {
            Some(documents) => documents,
            None => return Ok(vec![]),
        };

        let mut selected = Self::select(documents, query)?;

        if let Some(sort) = &query.sort {
            selected.sort_by(|a, b| {
                let left = a
                    .get(&sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);
                let right = b
                    .get(&sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        Ok(
            selected
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect()
        )
    }

    async fn count_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64> {
        let store = self.store.read().await;

        match store.get(collection) {
            Some(documents) => Ok(Self::select(documents, query)?.len() as u64),
            None => Ok(0),
        }
    }

    async fn delete_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64> {
        let mut store = self.store.write().await;
        let documents = match store.get_mut(collection) {
            Some(documents) => documents,
            None => return Ok(0),
        };

        let mut retained = Vec::with_capacity(documents.len());
        let mut removed = 0;

        for document in documents.drain(..) {
            let matched = match &query.filter {
                Some(filter) => DocumentEvaluator::new(&document).evaluate(filter)?,
                None => true,
            };

            if matched {
                removed += 1;
            } else {
                retained.push(document);
            }
        }

        *documents = retained;
        debug!(target: "modelayer::memory", collection, removed, "Documents deleted");

        Ok(removed)
    }

    async fn drop_collection(&self, name: &str) -> ConnectorResult<()> {
        self.store.write().await.remove(name);

        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> ConnectorResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
