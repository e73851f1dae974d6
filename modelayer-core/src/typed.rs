//! Typed access to a registered model.

use bson::Bson;
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    connector::{Connector, DeleteResult},
    document::{Model, ModelExt},
    error::ConnectorResult,
    query::Query,
};

/// A handle that converts between a [`Model`] type and the connector's property documents.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the connector reference
/// * `B` - The storage backend type
/// * `M` - The model type
#[derive(Debug)]
pub struct TypedModel<'a, B: StoreBackend, M: Model> {
    connector: &'a Connector<B>,
    _marker: PhantomData<M>,
}

impl<'a, B: StoreBackend, M: Model> TypedModel<'a, B, M> {
    pub(crate) fn new(connector: &'a Connector<B>) -> Self {
        Self { connector, _marker: PhantomData }
    }

    /// Returns the name of the underlying model.
    pub fn name(&self) -> &'static str {
        M::model_name()
    }

    /// Creates an instance and returns it with its id populated.
    pub async fn create(&self, instance: &M) -> ConnectorResult<M> {
        M::from_document(
            self.connector
                .create(M::model_name(), instance.to_document()?)
                .await?,
        )
    }

    pub async fn find_by_id(&self, id: impl Into<Bson>) -> ConnectorResult<Option<M>> {
        self.connector
            .find_by_id(M::model_name(), id)
            .await?
            .map(M::from_document)
            .transpose()
    }

    pub async fn find(&self, query: &Query) -> ConnectorResult<Vec<M>> {
        self.connector
            .find(M::model_name(), query)
            .await?
            .into_iter()
            .map(M::from_document)
            .collect()
    }

    pub async fn destroy_by_id(&self, id: impl Into<Bson>) -> ConnectorResult<DeleteResult> {
        self.connector
            .destroy_by_id(M::model_name(), id)
            .await
    }
}
