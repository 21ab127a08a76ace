//! Document store client and lazily built transport handle.

use crate::{
    config::ConnectionConfig,
    error::{DocStoreError, Result},
    index::IndexAdmin,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::OnceCell;
use opensearch::{
    http::{
        headers::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    OpenSearch,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Header the backend's product compatibility check looks for.
pub const PRODUCT_HEADER: &str = "x-elastic-product";

/// Simplified client for an Elasticsearch/OpenSearch-compatible document store.
///
/// Cloning is cheap; clones share the configuration and the transport handle.
#[derive(Clone)]
pub struct DocStore {
    config: Arc<ConnectionConfig>,
    handle: Arc<OnceCell<OpenSearch>>,
}

impl DocStore {
    /// Create a new document store client.
    ///
    /// The configuration is validated here. No connection is made until the
    /// first operation.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            handle: Arc::new(OnceCell::new()),
        })
    }

    /// Create a client from `ARMATURE_DOCSTORE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ConnectionConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Get the underlying OpenSearch client, building it on first use.
    ///
    /// Concurrent first callers build at most one handle; every later call
    /// returns the same instance.
    pub fn client(&self) -> Result<&OpenSearch> {
        self.handle.get_or_try_init(|| build_client(&self.config))
    }

    /// Get an index admin for index operations.
    pub fn indices(&self) -> IndexAdmin<'_> {
        IndexAdmin::new(self)
    }

    /// Ping the backend.
    ///
    /// Transport failures are reported as `false`.
    pub async fn ping(&self) -> Result<bool> {
        let response = self.client()?.ping().send().await;
        Ok(matches!(response, Ok(r) if r.status_code().is_success()))
    }

    /// Resolve an explicit index name against the configured default.
    pub(crate) fn resolve_index<'a>(&'a self, index: Option<&'a str>) -> Result<&'a str> {
        index
            .or(self.config.default_index.as_deref())
            .ok_or(DocStoreError::MissingIndex)
    }
}

fn build_client(config: &ConnectionConfig) -> Result<OpenSearch> {
    let url = config.parsed_url()?;
    info!("Initializing document store client for {}", url);

    let mut builder = TransportBuilder::new(SingleNodeConnectionPool::new(url))
        .disable_proxy()
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(product) = &config.product_header {
        builder = builder.header(
            HeaderName::from_static(PRODUCT_HEADER),
            header_value(product)?,
        );
    }

    if let Some((user, pass)) = config.credentials() {
        builder = builder.header(AUTHORIZATION, header_value(&basic_auth(user, pass))?);
    }

    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }

    let transport = builder
        .build()
        .map_err(|e| DocStoreError::Connection(e.to_string()))?;

    debug!("Document store client initialized");

    Ok(OpenSearch::new(transport))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| DocStoreError::Connection(format!("Invalid header value: {}", e)))
}

/// Value of a Basic `Authorization` header.
pub(crate) fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

impl std::fmt::Debug for DocStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStore")
            .field("url", &self.config.url())
            .field("default_index", &self.config.default_index)
            .finish()
    }
}
