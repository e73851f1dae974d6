//! Main modelayer crate: identifier and query mapping between a model layer and a document store.
//!
//! This crate is the primary entry point for users of the modelayer framework.
//! It re-exports the core types and functionality from various sub-crates and provides
//! convenient access to different storage backends.
//!
//! # Features
//!
//! - **Id policies** - Native, opaque generated and user-supplied ids, decided per model
//! - **Identifier codec** - Native object ids are hex strings to the application and binary in the store
//! - **Query translation** - Filters over application property names, rewritten for the store
//! - **Multiple backends** - Support for in-memory and MongoDB storage with extensible trait system
//!
//! # Quick Start
//!
//! ```ignore
//! use modelayer::{prelude::*, memory::{InMemoryStore, SequenceGenerator}};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> ConnectorResult<()> {
//!     let registry = ModelRegistry::builder()
//!         .register(
//!             ModelDefinition::new("Book")
//!                 .property("id", PropertyDef::new(PropertyType::String).id().store_data_type("ObjectId"))
//!                 .property("title", PropertyType::String),
//!         )?
//!         .register_json(r#"{ "name": "customer1", "properties": { "name": "String" } }"#)?
//!         .build();
//!
//!     let connector = Connector::new(InMemoryStore::new(), registry)
//!         .with_id_generator(SequenceGenerator::new());
//!
//!     // Native generated id: assigned by the store, returned as a hex string
//!     let customer = connector.create("customer1", doc! { "name": "John1" }).await?;
//!     let id = customer.get_str("id").unwrap().to_string();
//!
//!     // Lookups accept the hex string and translate it for the store
//!     let found = connector
//!         .find(
//!             "customer1",
//!             &Query::builder()
//!                 .filter(Filter::inq("id", [id.as_str()]))
//!                 .build(),
//!         )
//!         .await?;
//!     assert_eq!(found, vec![customer]);
//!
//!     connector.shutdown().await
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use modelayer_core::{
    backend, codec, connector, definition, document, error, generator, id, policy, query, registry,
    translate, typed, where_clause,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use modelayer_memory::{InMemoryStore, InMemoryStoreBuilder, SequenceGenerator};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use modelayer_mongodb::{MongoDbStore, MongoDbStoreBuilder, MongoSequenceGenerator};
}
