//! Identifier and query mapping between an ORM's model layer and a document store.
//!
//! This crate is the core of the modelayer project and provides:
//!
//! - **Model definitions** ([`definition`], [`registry`]) - Declarative model descriptions and their registry
//! - **Id policies** ([`id`], [`policy`], [`generator`]) - Which side owns a model's id and how it is produced
//! - **Identifier codec** ([`codec`]) - Conversion between application and native id forms
//! - **Query translation** ([`query`], [`where_clause`], [`translate`]) - Filters over property names, rewritten for the store
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing different storage backends
//! - **Connector** ([`connector`], [`typed`], [`document`]) - The model-level create, find and destroy operations
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use modelayer::prelude::*;
//! use bson::doc;
//!
//! let registry = ModelRegistry::builder()
//!     .register(
//!         ModelDefinition::new("Book")
//!             .property("id", PropertyDef::new(PropertyType::String).id().store_data_type("ObjectId"))
//!             .property("title", PropertyType::String),
//!     )?
//!     .build();
//!
//! let connector = Connector::new(backend, registry);
//! let book = connector
//!     .create("Book", doc! { "id": "7cd2ad46ffc580ba45d3cb1f", "title": "The Jungle" })
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelayer_core;

pub mod backend;
pub mod codec;
pub mod connector;
pub mod definition;
pub mod document;
pub mod error;
pub mod generator;
pub mod id;
pub mod policy;
pub mod query;
pub mod registry;
pub mod translate;
pub mod typed;
pub mod where_clause;
