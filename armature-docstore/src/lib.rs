//! Simplified document-store client for the Armature framework.
//!
//! Wraps the `opensearch` REST client for Elasticsearch/OpenSearch-compatible
//! backends and trades raw protocol responses for plain values:
//! - Index administration (exists, create with a raw schema, delete)
//! - Document save, partial update, delete and lookup by ID
//! - Bulk save and delete with per-item status
//! - Counting and typed search
//!
//! The transport client is built lazily on first use and shared by every
//! clone of a [`DocStore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use armature_docstore::{ConnectionConfig, DocStore, Query, SearchRequest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Person {
//!     name: String,
//!     city: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new("localhost")
//!         .with_basic_auth("elastic", "changeme")
//!         .with_default_index("people");
//!     let store = DocStore::new(config)?;
//!
//!     if !store.indices().exists(None).await? {
//!         store.indices().create(None, None).await?;
//!     }
//!
//!     let person = Person { name: "Ada".into(), city: "London".into() };
//!     let id = store.save(None, &person, Some("1")).await?;
//!
//!     let found: Option<Person> = store.get_by_id(None, &id).await?;
//!     println!("{:?}", found);
//!
//!     let londoners: Vec<Person> = store
//!         .search(&SearchRequest::new().index("people").query(Query::matching("city", "London")))
//!         .await?;
//!     println!("{} match", londoners.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bulk;
mod client;
mod config;
mod document;
mod error;
mod index;
mod query;
mod search;

pub use bulk::{BulkAction, BulkItem, BulkItemError, BulkOperation, BulkResponse};
pub use client::{DocStore, PRODUCT_HEADER};
pub use config::{ConnectionConfig, Scheme, ENV_PREFIX};
pub use error::{DocStoreError, Result};
pub use index::IndexAdmin;
pub use query::{BoolQuery, Query};
pub use search::{Hit, SearchRequest, SearchResult, SortOrder};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BulkOperation, BulkResponse, ConnectionConfig, DocStore, DocStoreError, Query, Result,
        SearchRequest,
    };
}
