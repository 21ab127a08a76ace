//! Connection configuration.

use crate::error::{DocStoreError, Result};
use opensearch::http::Url;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Prefix shared by all environment variables read by [`ConnectionConfig::from_env`].
pub const ENV_PREFIX: &str = "ARMATURE_DOCSTORE_";

/// URL scheme used to reach the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Scheme as it appears in a URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = DocStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(DocStoreError::Config(format!("Unsupported scheme: {}", other))),
        }
    }
}

/// Connection parameters for a document store.
///
/// Wrapped by [`DocStore`](crate::DocStore) and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Backend host name or address.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// URL scheme.
    pub scheme: Scheme,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Index used when an operation is not given one.
    pub default_index: Option<String>,
    /// Value of the `X-Elastic-Product` header sent with every request.
    pub product_header: Option<String>,
    /// Request timeout. The transport default applies when unset.
    pub request_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}

impl ConnectionConfig {
    /// Default backend port.
    pub const DEFAULT_PORT: u16 = 9200;

    /// Default product identification header value.
    pub const DEFAULT_PRODUCT: &'static str = "Elasticsearch";

    /// Create a configuration for the given host with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            scheme: Scheme::Http,
            username: None,
            password: None,
            default_index: None,
            product_header: Some(Self::DEFAULT_PRODUCT.to_string()),
            request_timeout: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Uses the following environment variables:
    /// - `ARMATURE_DOCSTORE_HOST`: Host (default: `localhost`)
    /// - `ARMATURE_DOCSTORE_PORT`: Port (default: 9200)
    /// - `ARMATURE_DOCSTORE_SCHEME`: `http` or `https`
    /// - `ARMATURE_DOCSTORE_USERNAME` / `ARMATURE_DOCSTORE_PASSWORD`: Basic auth
    /// - `ARMATURE_DOCSTORE_INDEX`: Default index
    /// - `ARMATURE_DOCSTORE_PRODUCT_HEADER`: Product header value, empty disables it
    /// - `ARMATURE_DOCSTORE_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// `lookup` receives the full variable name, prefix included.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        let mut config = Self::new(var("HOST").unwrap_or_else(|| "localhost".to_string()));

        if let Some(port) = var("PORT") {
            config.port = port.parse().map_err(|_| {
                DocStoreError::Config(format!("Invalid {}PORT: {}", ENV_PREFIX, port))
            })?;
        }

        if let Some(scheme) = var("SCHEME") {
            config.scheme = scheme.parse()?;
        }

        config.username = var("USERNAME");
        config.password = var("PASSWORD");
        config.default_index = var("INDEX");

        if let Some(product) = var("PRODUCT_HEADER") {
            config.product_header = (!product.is_empty()).then_some(product);
        }

        if let Some(timeout) = var("TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| {
                DocStoreError::Config(format!("Invalid {}TIMEOUT_SECS: {}", ENV_PREFIX, timeout))
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set basic authentication credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the default index.
    pub fn with_default_index(mut self, index: impl Into<String>) -> Self {
        self.default_index = Some(index.into());
        self
    }

    /// Set the product identification header value.
    pub fn with_product_header(mut self, product: impl Into<String>) -> Self {
        self.product_header = Some(product.into());
        self
    }

    /// Do not send a product identification header.
    pub fn without_product_header(mut self) -> Self {
        self.product_header = None;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Base URL of the backend.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Basic auth credentials, present only when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    /// Check the configuration for errors.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DocStoreError::Config("Host must not be empty".to_string()));
        }

        if self.port == 0 {
            return Err(DocStoreError::Config("Port must not be 0".to_string()));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(DocStoreError::Config(
                "Username and password must be configured together".to_string(),
            ));
        }

        if matches!(&self.default_index, Some(index) if index.is_empty()) {
            return Err(DocStoreError::Config(
                "Default index must not be empty".to_string(),
            ));
        }

        self.parsed_url().map(|_| ())
    }

    pub(crate) fn parsed_url(&self) -> Result<Url> {
        Url::parse(&self.url()).map_err(|e| DocStoreError::Config(format!("Invalid URL: {}", e)))
    }
}
