//! Single-document operations.

use crate::{
    client::DocStore,
    error::{backend_error, error_details, json_body, DocStoreError, Result},
};
use opensearch::{http::StatusCode, DeleteParts, GetParts, IndexParts, UpdateParts};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;

impl DocStore {
    /// Index a document, replacing any existing document with the same ID.
    ///
    /// Without an `id` the backend assigns one. Returns the document ID.
    pub async fn save<T: Serialize>(
        &self,
        index: Option<&str>,
        doc: &T,
        id: Option<&str>,
    ) -> Result<String> {
        let index = self.resolve_index(index)?;
        debug!("Saving document {:?} in index {}", id, index);

        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let response = self.client()?.index(parts).body(doc).send().await?;

        if !response.status_code().is_success() {
            return Err(backend_error(response).await);
        }

        let body: Value = response.json().await?;

        body["_id"]
            .as_str()
            .or(id)
            .map(str::to_string)
            .ok_or_else(|| {
                DocStoreError::UnexpectedResponse("Response carried no document ID".to_string())
            })
    }

    /// Partially update a document.
    ///
    /// Returns `true` only when the backend reports the document as
    /// `updated`. A no-op update or a missing document yields `false`.
    pub async fn update<T: Serialize>(
        &self,
        index: Option<&str>,
        id: &str,
        partial: &T,
    ) -> Result<bool> {
        let index = self.resolve_index(index)?;
        debug!("Updating document {} in index {}", id, index);

        let response = self
            .client()?
            .update(UpdateParts::IndexId(index, id))
            .body(json!({ "doc": partial }))
            .send()
            .await?;

        if response.status_code() == StatusCode::NOT_FOUND {
            let body = json_body(response).await?;
            let (kind, reason) = error_details(&body);
            if kind == "index_not_found_exception" {
                return Err(DocStoreError::IndexNotFound(index.to_string()));
            }
            debug!("Document {} not updated: {}", id, reason);
            return Ok(false);
        }

        if !response.status_code().is_success() {
            return Err(backend_error(response).await);
        }

        let body: Value = response.json().await?;
        Ok(body["result"].as_str() == Some("updated"))
    }

    /// Delete a document.
    ///
    /// Returns `true` only when the backend reports the document as
    /// `deleted`; a missing document yields `false`.
    pub async fn delete(&self, index: Option<&str>, id: &str) -> Result<bool> {
        let index = self.resolve_index(index)?;
        debug!("Deleting document {} from index {}", id, index);

        let response = self
            .client()?
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(backend_error(response).await);
        }

        let body = json_body(response).await?;

        if status == StatusCode::NOT_FOUND {
            let (kind, _) = error_details(&body);
            if kind == "index_not_found_exception" {
                return Err(DocStoreError::IndexNotFound(index.to_string()));
            }
        }

        Ok(body["result"].as_str() == Some("deleted"))
    }

    /// Get a document by ID.
    ///
    /// Returns `None` when the document does not exist.
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        index: Option<&str>,
        id: &str,
    ) -> Result<Option<T>> {
        let index = self.resolve_index(index)?;
        debug!("Getting document {} from index {}", id, index);

        let response = self
            .client()?
            .get(GetParts::IndexId(index, id))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(backend_error(response).await);
        }

        let body = json_body(response).await?;

        if status == StatusCode::NOT_FOUND {
            let (kind, _) = error_details(&body);
            if kind == "index_not_found_exception" {
                return Err(DocStoreError::IndexNotFound(index.to_string()));
            }
        }

        if !body["found"].as_bool().unwrap_or(false) {
            return Ok(None);
        }

        match body.get("_source") {
            Some(source) => Ok(Some(T::deserialize(source)?)),
            None => Ok(None),
        }
    }
}
