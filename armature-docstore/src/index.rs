//! Index administration.

use crate::{
    client::DocStore,
    error::{backend_error, error_details, json_body, DocStoreError, Result},
};
use opensearch::{
    http::{response::Response, StatusCode},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts},
};
use serde_json::{value::RawValue, Value};
use tracing::{debug, info};

/// Index operations, obtained from [`DocStore::indices`].
///
/// Every method takes an optional index name and falls back to the
/// configured default index.
#[derive(Debug, Clone, Copy)]
pub struct IndexAdmin<'a> {
    store: &'a DocStore,
}

impl<'a> IndexAdmin<'a> {
    pub(crate) fn new(store: &'a DocStore) -> Self {
        Self { store }
    }

    /// Check if an index exists.
    pub async fn exists(&self, index: Option<&str>) -> Result<bool> {
        let name = self.store.resolve_index(index)?;
        debug!("Checking if index exists: {}", name);

        let response = self
            .store
            .client()?
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(backend_error(response).await);
        }

        Ok(true)
    }

    /// Create an index.
    ///
    /// `schema` is sent as the request body exactly as given, minus any
    /// surrounding whitespace. It must be JSON; anything else is rejected
    /// before a request is made. Returns the backend's `acknowledged` flag.
    pub async fn create(&self, index: Option<&str>, schema: Option<&str>) -> Result<bool> {
        let name = self.store.resolve_index(index)?;

        let schema: Option<Box<RawValue>> = schema
            .map(|schema| {
                RawValue::from_string(schema.to_string()).map_err(|e| {
                    DocStoreError::Validation(format!("Index schema is not valid JSON: {}", e))
                })
            })
            .transpose()?;

        info!("Creating index: {}", name);

        let indices = self.store.client()?.indices();
        let request = indices.create(IndicesCreateParts::Index(name));

        let response = match schema {
            Some(schema) => request.body(schema).send().await?,
            None => request.send().await?,
        };

        let status = response.status_code();

        if status == StatusCode::BAD_REQUEST {
            let body = json_body(response).await?;
            let (kind, reason) = error_details(&body);

            if kind == "resource_already_exists_exception" {
                return Err(DocStoreError::IndexExists(name.to_string()));
            }

            return Err(DocStoreError::Backend {
                status: status.as_u16(),
                reason,
            });
        }

        acknowledged(response).await
    }

    /// Delete an index.
    ///
    /// Returns the backend's `acknowledged` flag.
    pub async fn delete(&self, index: Option<&str>) -> Result<bool> {
        let name = self.store.resolve_index(index)?;
        info!("Deleting index: {}", name);

        let response = self
            .store
            .client()?
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await?;

        if response.status_code() == StatusCode::NOT_FOUND {
            return Err(DocStoreError::IndexNotFound(name.to_string()));
        }

        acknowledged(response).await
    }

    /// Refresh an index so recent writes become searchable.
    pub async fn refresh(&self, index: Option<&str>) -> Result<()> {
        let name = self.store.resolve_index(index)?;
        debug!("Refreshing index: {}", name);

        let response = self
            .store
            .client()?
            .indices()
            .refresh(IndicesRefreshParts::Index(&[name]))
            .send()
            .await?;

        if response.status_code() == StatusCode::NOT_FOUND {
            return Err(DocStoreError::IndexNotFound(name.to_string()));
        }

        if !response.status_code().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(())
    }
}

async fn acknowledged(response: Response) -> Result<bool> {
    if !response.status_code().is_success() {
        return Err(backend_error(response).await);
    }

    let body: Value = response.json().await?;
    Ok(body["acknowledged"].as_bool().unwrap_or(false))
}
