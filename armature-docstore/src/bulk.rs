//! Bulk operations.

use crate::{
    client::DocStore,
    error::{backend_error, DocStoreError, Result},
};
use opensearch::{http::request::JsonBody, BulkParts};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A single operation in a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Index (create or replace) a document.
    Index {
        /// Target index.
        index: String,
        /// Document ID; the backend assigns one when absent.
        id: Option<String>,
        /// Document source.
        source: Value,
    },
    /// Delete a document.
    Delete {
        /// Target index.
        index: String,
        /// Document ID.
        id: String,
    },
}

impl BulkOperation {
    /// Build an index operation from any serializable document.
    pub fn index<T: Serialize>(
        index: impl Into<String>,
        id: Option<String>,
        doc: &T,
    ) -> Result<Self> {
        Ok(BulkOperation::Index {
            index: index.into(),
            id,
            source: serde_json::to_value(doc)?,
        })
    }

    /// Build a delete operation.
    pub fn delete(index: impl Into<String>, id: impl Into<String>) -> Self {
        BulkOperation::Delete {
            index: index.into(),
            id: id.into(),
        }
    }

    /// Action performed by this operation.
    pub fn action(&self) -> BulkAction {
        match self {
            BulkOperation::Index { .. } => BulkAction::Index,
            BulkOperation::Delete { .. } => BulkAction::Delete,
        }
    }

    /// Convert to bulk request lines.
    pub fn to_bulk_lines(&self) -> Vec<Value> {
        match self {
            BulkOperation::Index { index, id, source } => {
                let header = match id {
                    Some(id) => json!({ "index": { "_index": index, "_id": id } }),
                    None => json!({ "index": { "_index": index } }),
                };
                vec![header, source.clone()]
            }
            BulkOperation::Delete { index, id } => {
                vec![json!({ "delete": { "_index": index, "_id": id } })]
            }
        }
    }
}

/// Bulk action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    /// Index action.
    Index,
    /// Create action.
    Create,
    /// Update action.
    Update,
    /// Delete action.
    Delete,
}

/// Bulk operation response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkResponse {
    /// Time taken in milliseconds.
    pub took: u64,
    /// Whether the backend flagged any item as failed.
    pub errors: bool,
    /// Individual item results, in request order.
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    /// Response for a batch that was never sent because it was empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the batch contained no operations.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether at least one operation failed.
    pub fn has_failures(&self) -> bool {
        self.errors || self.items.iter().any(|item| !item.is_success())
    }

    /// Failed items.
    pub fn failed(&self) -> impl Iterator<Item = &BulkItem> {
        self.items.iter().filter(|item| !item.is_success())
    }

    /// Number of successful operations.
    pub fn succeeded_count(&self) -> usize {
        self.items.len() - self.failed_count()
    }

    /// Number of failed operations.
    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    fn from_json(body: Value) -> Result<Self> {
        let raw: RawBulkResponse = serde_json::from_value(body)?;

        let items = raw
            .items
            .into_iter()
            .filter_map(|entry| entry.into_iter().next())
            .map(|(action, status)| BulkItem {
                action,
                index: status.index,
                id: status.id,
                status: status.status,
                result: status.result,
                error: status.error,
            })
            .collect();

        Ok(Self {
            took: raw.took,
            errors: raw.errors,
            items,
        })
    }
}

/// Result of one operation in a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItem {
    /// Action that was performed.
    pub action: BulkAction,
    /// Index name.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// HTTP status code of this item.
    pub status: u16,
    /// Outcome reported by the backend (`created`, `updated`, `deleted`, `not_found`).
    pub result: Option<String>,
    /// Error details, present when the item failed.
    pub error: Option<BulkItemError>,
}

impl BulkItem {
    /// Check if the operation was successful.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Bulk item error details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemError {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error reason.
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize)]
struct RawBulkResponse {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<BulkAction, RawItemStatus>>,
}

#[derive(Deserialize)]
struct RawItemStatus {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: String,
    status: u16,
    result: Option<String>,
    error: Option<BulkItemError>,
}

impl DocStore {
    /// Index many documents in one request.
    ///
    /// Documents keep their input order. When `ids` is given it must have
    /// one entry per document; otherwise nothing is sent and a validation
    /// error is returned. An empty `docs` slice returns an empty response
    /// without contacting the backend.
    pub async fn bulk_save<T: Serialize>(
        &self,
        index: Option<&str>,
        docs: &[T],
        ids: Option<&[&str]>,
    ) -> Result<BulkResponse> {
        let index = self.resolve_index(index)?;

        if let Some(ids) = ids {
            if ids.len() != docs.len() {
                return Err(DocStoreError::Validation(format!(
                    "Got {} ids for {} documents, bulk aborted",
                    ids.len(),
                    docs.len()
                )));
            }
        }

        if docs.is_empty() {
            return Ok(BulkResponse::empty());
        }

        let operations = docs
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let id = ids.map(|ids| ids[i].to_string());
                BulkOperation::index(index, id, doc)
            })
            .collect::<Result<Vec<_>>>()?;

        self.bulk(operations).await
    }

    /// Delete many documents in one request.
    pub async fn bulk_delete(&self, index: Option<&str>, ids: &[&str]) -> Result<BulkResponse> {
        let index = self.resolve_index(index)?;

        let operations = ids
            .iter()
            .map(|id| BulkOperation::delete(index, *id))
            .collect();

        self.bulk(operations).await
    }

    /// Send a pre-built list of operations as a single bulk request.
    ///
    /// Individual operations may fail while others succeed; inspect the
    /// returned [`BulkResponse`] rather than relying on the `Result` alone.
    pub async fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse> {
        if operations.is_empty() {
            return Ok(BulkResponse::empty());
        }

        debug!("Sending bulk request with {} operations", operations.len());

        let body: Vec<JsonBody<Value>> = operations
            .iter()
            .flat_map(BulkOperation::to_bulk_lines)
            .map(JsonBody::from)
            .collect();

        let response = self
            .client()?
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(backend_error(response).await);
        }

        let result = BulkResponse::from_json(response.json().await?)?;

        if result.has_failures() {
            warn!(
                "Bulk request finished with {} failed of {} operations",
                result.failed_count(),
                result.items.len()
            );
        }

        Ok(result)
    }
}
