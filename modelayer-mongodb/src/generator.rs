use async_trait::async_trait;
use bson::{Document, doc};
use mongodb::options::ReturnDocument;
use modelayer_core::{
    error::{ConnectorError, ConnectorResult},
    generator::IdGenerator,
};

use crate::store::MongoDbStore;

/// Collection holding one counter document per model.
pub const SEQUENCES_COLLECTION: &str = "_sequences";


/// Sequence generator backed by atomic counter documents in MongoDB.
///
/// Each call increments `{ _id: <model>, value }` in [`SEQUENCES_COLLECTION`], creating
/// it on first use, so sequences start at 1 and are shared by every process using the
/// same database.
#[derive(Debug, Clone)]
pub struct MongoSequenceGenerator {
    store: MongoDbStore,
}

impl MongoSequenceGenerator {
    pub fn new(store: MongoDbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdGenerator for MongoSequenceGenerator {
    async fn next_sequence(&self, model: &str) -> ConnectorResult<i64> {
        let counter: Option<Document> = self
            .store
            .get_collection(SEQUENCES_COLLECTION)
            .find_one_and_update(doc! { "_id": model }, doc! { "$inc": { "value": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ConnectorError::Transport(e.to_string()))?;

        counter
            .as_ref()
            .and_then(|counter| counter.get_i64("value").ok())
            .ok_or_else(|| ConnectorError::Transport(format!("sequence counter for {model} was not returned")))
    }
}
