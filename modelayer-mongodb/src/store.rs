use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, doc};
use mongodb::{
    Client, Collection as MongoCollection,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions},
};
use tracing::debug;
use modelayer_core::{
    backend::{IDENTITY_FIELD, StoreBackend, StoreBackendBuilder},
    error::{ConnectorError, ConnectorResult},
    query::{SortDirection, StoreQuery},
};

use crate::query::MongoQueryTranslator;

const DUPLICATE_KEY: i32 = 11000;


#[derive(Debug, Clone)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    pub(crate) fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn find_options(query: &StoreQuery) -> ConnectorResult<FindOptions> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(
                i64::try_from(limit)
                    .map_err(|_| ConnectorError::InvalidQuery(format!("limit {limit} is out of range")))?,
            );
        }
        if let Some(skip) = query.offset {
            options.skip = Some(
                u64::try_from(skip)
                    .map_err(|_| ConnectorError::InvalidQuery(format!("offset {skip} is out of range")))?,
            );
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            })
        }

        Ok(options)
    }

    fn is_duplicate_key(error: &MongoError) -> bool {
        matches!(
            error.kind.as_ref(),
            ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
        )
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_document(&self, document: Document, collection: &str) -> ConnectorResult<Bson> {
        let identity = document.get(IDENTITY_FIELD).cloned();

        let result = self
            .get_collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| match identity {
                Some(identity) if Self::is_duplicate_key(&e) => {
                    ConnectorError::DocumentAlreadyExists(identity.to_string(), collection.to_string())
                }
                _ => ConnectorError::Transport(e.to_string()),
            })?;
        debug!(target: "modelayer::mongodb", collection, id = %result.inserted_id, "Document inserted");

        Ok(result.inserted_id)
    }

    async fn find_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<Vec<Document>> {
        let options = Self::find_options(query)?;

        self.get_collection(collection)
            .find(MongoQueryTranslator::filter(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(|e| ConnectorError::Transport(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| ConnectorError::Transport(e.to_string()))
    }

    async fn count_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64> {
        self.get_collection(collection)
            .count_documents(MongoQueryTranslator::filter(query.filter.as_ref())?)
            .await
            .map_err(|e| ConnectorError::Transport(e.to_string()))
    }

    async fn delete_documents(&self, query: &StoreQuery, collection: &str) -> ConnectorResult<u64> {
        let result = self
            .get_collection(collection)
            .delete_many(MongoQueryTranslator::filter(query.filter.as_ref())?)
            .await
            .map_err(|e| ConnectorError::Transport(e.to_string()))?;
        debug!(target: "modelayer::mongodb", collection, removed = result.deleted_count, "Documents deleted");

        Ok(result.deleted_count)
    }

    async fn drop_collection(&self, name: &str) -> ConnectorResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(|e| ConnectorError::Transport(e.to_string()))?;

        Ok(())
    }

    async fn shutdown(self) -> ConnectorResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> ConnectorResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| ConnectorError::Initialization(e.to_string()))?,
            )
            .map_err(|e| ConnectorError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelayer_core::query::Sort;

    #[test]
    fn find_options_carry_paging_and_sort() {
        let mut query = StoreQuery::default();
        query.limit = Some(5);
        query.offset = Some(10);
        query.sort = Some(Sort { field: "_id".into(), direction: SortDirection::Desc });

        let options = MongoDbStore::find_options(&query).unwrap();
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.skip, Some(10));
        assert_eq!(options.sort, Some(doc! { "_id": -1 }));
    }

    #[test]
    fn find_options_reject_limits_beyond_the_driver_range() {
        let mut query = StoreQuery::default();
        query.limit = Some(usize::MAX);

        assert!(matches!(
            MongoDbStore::find_options(&query),
            Err(ConnectorError::InvalidQuery(_))
        ));
    }
}
