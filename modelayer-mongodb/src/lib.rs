//! MongoDB backend implementation for modelayer.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! and a sequence generator for opaque generated ids kept in the same database.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! modelayer = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Native identities** - Documents inserted without `_id` get a server-assigned ObjectId
//! - **Full query support** - Leverages MongoDB's query engine for filtering and sorting
//! - **Shared sequences** - Counter documents updated atomically with `findOneAndUpdate`
//!
//! # Example
//!
//! ```ignore
//! use modelayer::{backend::StoreBackendBuilder, mongodb::{MongoDbStore, MongoSequenceGenerator}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let connector = Connector::new(store.clone(), registry)
//!         .with_id_generator(MongoSequenceGenerator::new(store));
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelayer_mongodb;

pub mod store;
pub mod query;
pub mod generator;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
pub use generator::MongoSequenceGenerator;
