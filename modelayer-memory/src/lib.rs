//! In-memory document storage backend for modelayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait
//! together with a process-local id sequence generator. It is ideal for development and
//! testing.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Native identities** - Documents inserted without `_id` get a fresh ObjectId
//! - **Full query support** - Supports filtering, sorting, and pagination
//!
//! # Quick Start
//!
//! ```ignore
//! use modelayer::{prelude::*, memory::{InMemoryStore, SequenceGenerator}};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ModelRegistry::builder()
//!         .register_json(r#"{
//!             "name": "customer",
//!             "properties": { "seq": { "type": "Number", "id": true, "generated": true } }
//!         }"#)?
//!         .build();
//!     let connector = Connector::new(InMemoryStore::new(), registry)
//!         .with_id_generator(SequenceGenerator::new());
//!
//!     let customer = connector.create("customer", doc! { "name": "John1" }).await?;
//!     assert_eq!(customer.get_i64("seq")?, 1);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelayer_memory;

pub mod store;
pub mod evaluator;
pub mod generator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
pub use generator::SequenceGenerator;
