//! Storage backend abstraction for the connector.
//!
//! This module defines the traits that abstract over document store implementations,
//! allowing the connector to work with various backends (in-memory, MongoDB, ...).
//!
//! # Overview
//!
//! Backends operate purely in store terms: documents carry their identity in the
//! [`IDENTITY_FIELD`] and queries arrive as [`StoreQuery`] values that have already been
//! translated. Backends never see application id property names or unencoded id
//! literals.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;

use crate::{error::ConnectorResult, query::StoreQuery};

/// Name of the store's reserved identity field.
pub const IDENTITY_FIELD: &str = "_id";

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks.
///
/// # Error Handling
///
/// Failures of the underlying store are reported as
/// [`ConnectorError::Transport`](crate::error::ConnectorError::Transport), or
/// [`ConnectorError::DocumentAlreadyExists`](crate::error::ConnectorError::DocumentAlreadyExists)
/// for identity collisions. The connector passes them through unchanged.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a document into a collection and returns its identity.
    ///
    /// If the document has no [`IDENTITY_FIELD`], the backend assigns a freshly generated
    /// native object identifier. The collection is created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::DocumentAlreadyExists`](crate::error::ConnectorError::DocumentAlreadyExists)
    /// if a document with the same identity is already stored.
    async fn insert_document(&self, document: Document, collection: &str) -> ConnectorResult<Bson>;

    /// Returns documents matching the query's filter, sorted and paginated as requested.
    ///
    /// Documents are returned with their [`IDENTITY_FIELD`] intact.
    async fn find_documents(
        &self,
        query: &StoreQuery,
        collection: &str,
    ) -> ConnectorResult<Vec<Document>>;

    /// Counts documents matching the query's filter.
    async fn count_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64>;

    /// Deletes documents matching the query's filter and returns how many were removed.
    ///
    /// Deleting from a collection that does not exist removes nothing.
    async fn delete_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64>;

    /// Drops a collection and all its documents.
    async fn drop_collection(&self, name: &str) -> ConnectorResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op, but backends with external connections
    /// should override this.
    async fn shutdown(self) -> ConnectorResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn insert_document(&self, document: Document, collection: &str) -> ConnectorResult<Bson> {
        (*self)
            .insert_document(document, collection)
            .await
    }

    async fn find_documents(
        &self,
        query: &StoreQuery,
        collection: &str,
    ) -> ConnectorResult<Vec<Document>> {
        (*self)
            .find_documents(query, collection)
            .await
    }

    async fn count_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64> {
        (*self)
            .count_documents(query, collection)
            .await
    }

    async fn delete_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64> {
        (*self)
            .delete_documents(query, collection)
            .await
    }

    async fn drop_collection(&self, name: &str) -> ConnectorResult<()> {
        (*self).drop_collection(name).await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> ConnectorResult<Self::Backend>;
}
