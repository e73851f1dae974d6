//! The connector facade: model-level operations over a store backend.
//!
//! Each operation is a single request–response cycle. Id policy, codec and translation
//! work happens synchronously up front; the backend call is the only suspension point.
//! Policy and codec errors are raised before anything reaches the store, and backend
//! errors are returned unchanged.
//!
//! # Example
//!
//! ```ignore
//! use modelayer::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! let registry = ModelRegistry::builder()
//!     .register_json(r#"{ "name": "customer1", "properties": { "name": "String" } }"#)?
//!     .build();
//! let connector = Connector::new(InMemoryStore::new(), registry);
//!
//! let customer = connector.create("customer1", doc! { "name": "John1" }).await?;
//! let id = customer.get_str("id")?;
//! let found = connector.find_by_id("customer1", id).await?;
//! ```

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    backend::{IDENTITY_FIELD, StoreBackend},
    codec::IdentifierCodec,
    document::Model,
    error::{ConnectorError, ConnectorResult},
    generator::{IdGenerator, generate_id},
    id::DeclaredType,
    policy::{IdPolicyResolver, ResolvedId},
    query::{Expr, FieldOp, Query, StoreQuery},
    registry::{ModelRegistry, RegisteredModel},
    translate::QueryPredicateTranslator,
    typed::TypedModel,
    where_clause::WhereClause,
};

/// Result of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Number of documents removed.
    pub count: u64,
}

/// Maps registered models onto a store backend.
#[derive(Debug)]
pub struct Connector<B: StoreBackend> {
    backend: B,
    registry: ModelRegistry,
    generator: Option<Arc<dyn IdGenerator>>,
}

impl<B: StoreBackend> Connector<B> {
    /// Creates a connector without an id generator.
    ///
    /// Models with opaque generated ids need one; see [`Connector::with_id_generator`].
    pub fn new(backend: B, registry: ModelRegistry) -> Self {
        Self { backend, registry, generator: None }
    }

    /// Sets the generator used for opaque generated ids.
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a typed handle for the specified model type.
    pub fn typed<M: Model>(&self) -> TypedModel<'_, B, M> {
        TypedModel::new(self)
    }

    /// Creates a model instance and returns it with its id property populated.
    ///
    /// # Errors
    ///
    /// - [`ConnectorError::AutogeneratedIdConflict`] if an id was supplied for a generated id
    /// - [`ConnectorError::MissingRequiredId`] if a required id was not supplied
    /// - [`ConnectorError::InvalidObjectIdFormat`] if an id-typed value is malformed
    /// - any backend error, unchanged
    pub async fn create(&self, model: &str, mut properties: Document) -> ConnectorResult<Document> {
        let model = self.registry.get(model)?;
        let spec = &model.id;

        if spec.id_property != IDENTITY_FIELD && properties.remove(IDENTITY_FIELD).is_some() {
            warn!(
                target: "modelayer::connector",
                model = %model.name,
                "Ignoring {IDENTITY_FIELD} in properties; the identity comes from {}",
                spec.id_property
            );
        }

        let supplied = properties.remove(&spec.id_property);
        let resolved = IdPolicyResolver::resolve(spec, supplied.as_ref())
            .inspect_err(|e| Self::rejected(model, "create", e))?;

        let mut stored = Document::new();
        let mut encoded = Document::new();
        for (key, value) in properties {
            let value = match model.id_typed(&key) {
                Some(declared) => Self::encode_property(value, declared)
                    .inspect_err(|e| Self::rejected(model, "create", e))?,
                None => value,
            };
            encoded.insert(key, value);
        }

        let id = match resolved {
            ResolvedId::Supplied(value) => Some(value),
            ResolvedId::DeferToStore => None,
            ResolvedId::DeferToGenerator => Some(generate_id(self.generator.as_deref(), spec).await?),
        };
        if let Some(id) = id {
            stored.insert(IDENTITY_FIELD, id.into_store()?);
        }
        stored.extend(encoded);

        let identity = self
            .backend
            .insert_document(stored.clone(), &model.collection)
            .await?;
        stored.insert(IDENTITY_FIELD, identity);

        let instance = Self::decode(model, stored);
        debug!(
            target: "modelayer::connector",
            model = %model.name,
            id = ?instance.get(&spec.id_property),
            "Created model instance"
        );

        Ok(instance)
    }

    /// Finds a model instance by id.
    ///
    /// The id may be given in either application or native form.
    pub async fn find_by_id(&self, model: &str, id: impl Into<Bson>) -> ConnectorResult<Option<Document>> {
        let model = self.registry.get(model)?;
        let mut query = Self::identity_query(model, &id.into())?;
        query.limit = Some(1);

        let found = self
            .backend
            .find_documents(&query, &model.collection)
            .await?
            .into_iter()
            .next()
            .map(|document| Self::decode(model, document));
        debug!(
            target: "modelayer::connector",
            model = %model.name,
            found = found.is_some(),
            "Find by id"
        );

        Ok(found)
    }

    /// Finds model instances matching a query over application property names.
    pub async fn find(&self, model: &str, query: &Query) -> ConnectorResult<Vec<Document>> {
        let model = self.registry.get(model)?;
        let query = QueryPredicateTranslator::new(model)
            .translate(query)
            .inspect_err(|e| Self::rejected(model, "find", e))?;

        let found = self
            .backend
            .find_documents(&query, &model.collection)
            .await?
            .into_iter()
            .map(|document| Self::decode(model, document))
            .collect::<Vec<_>>();
        debug!(
            target: "modelayer::connector",
            model = %model.name,
            count = found.len(),
            "Find"
        );

        Ok(found)
    }

    /// Finds model instances matching an ORM-style where clause.
    pub async fn find_where(&self, model: &str, clause: &Document) -> ConnectorResult<Vec<Document>> {
        let query = Query { filter: WhereClause::parse(clause)?, ..Default::default() };
        self.find(model, &query).await
    }

    /// Counts model instances matching a filter, or all instances without one.
    pub async fn count(&self, model: &str, filter: Option<&Expr>) -> ConnectorResult<u64> {
        let model = self.registry.get(model)?;
        let query = StoreQuery::new(
            QueryPredicateTranslator::new(model)
                .translate_filter(filter)
                .inspect_err(|e| Self::rejected(model, "count", e))?,
        );

        self.backend
            .count_documents(&query, &model.collection)
            .await
    }

    /// Deletes the model instance with the given id.
    pub async fn destroy_by_id(&self, model: &str, id: impl Into<Bson>) -> ConnectorResult<DeleteResult> {
        let model = self.registry.get(model)?;
        let query = Self::identity_query(model, &id.into())?;

        let count = self
            .backend
            .delete_documents(&query, &model.collection)
            .await?;
        debug!(target: "modelayer::connector", model = %model.name, count, "Destroy by id");

        Ok(DeleteResult { count })
    }

    /// Deletes model instances matching a filter, or all instances without one.
    pub async fn destroy_all(&self, model: &str, filter: Option<&Expr>) -> ConnectorResult<DeleteResult> {
        let model = self.registry.get(model)?;
        let query = StoreQuery::new(
            QueryPredicateTranslator::new(model)
                .translate_filter(filter)
                .inspect_err(|e| Self::rejected(model, "destroy_all", e))?,
        );

        let count = self
            .backend
            .delete_documents(&query, &model.collection)
            .await?;
        debug!(target: "modelayer::connector", model = %model.name, count, "Destroy all");

        Ok(DeleteResult { count })
    }

    /// Shuts down the connector and its backend.
    pub async fn shutdown(self) -> ConnectorResult<()> {
        self.backend.shutdown().await
    }

    fn identity_query(model: &RegisteredModel, id: &Bson) -> ConnectorResult<StoreQuery> {
        let encoded = IdentifierCodec::encode_value(id, &model.id.declared_type)
            .inspect_err(|e| Self::rejected(model, "identity lookup", e))?;

        Ok(StoreQuery::new(Some(Expr::field(
            IDENTITY_FIELD.to_string(),
            FieldOp::Eq,
            encoded,
        ))))
    }

    fn encode_property(value: Bson, declared: &DeclaredType) -> ConnectorResult<Bson> {
        match value {
            Bson::Null => Ok(Bson::Null),
            Bson::Array(items) => Ok(Bson::Array(
                items
                    .iter()
                    .map(|item| IdentifierCodec::encode_value(item, declared))
                    .collect::<ConnectorResult<Vec<_>>>()?,
            )),
            other => IdentifierCodec::encode_value(&other, declared),
        }
    }

    /// Maps a stored document back into a model instance.
    fn decode(model: &RegisteredModel, mut document: Document) -> Document {
        let mut instance = Document::new();

        if let Some(identity) = document.remove(IDENTITY_FIELD) {
            instance.insert(
                model.id.id_property.as_str(),
                IdentifierCodec::decode_from_store(identity, &model.id.declared_type),
            );
        }

        for (key, value) in document {
            let value = match model.id_typed(&key) {
                Some(declared) => IdentifierCodec::decode_from_store(value, declared),
                None => value,
            };
            instance.insert(key, value);
        }

        instance
    }

    fn rejected(model: &RegisteredModel, operation: &str, error: &ConnectorError) {
        warn!(
            target: "modelayer::connector",
            model = %model.name,
            operation,
            error = %error,
            "Operation rejected"
        );
    }
}
