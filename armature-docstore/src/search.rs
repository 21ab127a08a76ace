//! Counting and searching.

use crate::{
    client::DocStore,
    error::{backend_error, DocStoreError, Result},
    query::Query,
};
use opensearch::{http::StatusCode, CountParts, SearchParts};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A caller-built search request.
///
/// With no index the search runs across all indices.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    indices: Vec<String>,
    query: Option<Query>,
    q: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
    sort: Vec<(String, SortOrder)>,
}

impl SearchRequest {
    /// Create an empty search request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an index to search.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.indices.push(index.into());
        self
    }

    /// Set the query.
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Set a Lucene query string, sent as the `q` URL parameter.
    pub fn q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Set pagination offset.
    pub fn from(mut self, from: i64) -> Self {
        self.from = Some(from);
        self
    }

    /// Set result size limit.
    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Add sort field.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    /// Indices this request targets.
    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// Build the search body.
    pub fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();

        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.to_json());
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|(field, order)| json!({ field.as_str(): { "order": order.as_str() } }))
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }

        Value::Object(body)
    }
}

/// Search result with hit metadata.
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    /// Total matching documents.
    pub total: u64,
    /// Maximum score.
    pub max_score: Option<f64>,
    /// Time taken in milliseconds.
    pub took_ms: u64,
    /// Matching documents for the current page, in ranking order.
    pub hits: Vec<Hit<T>>,
}

impl<T> SearchResult<T> {
    /// Drop metadata and keep the documents.
    pub fn into_documents(self) -> Vec<T> {
        self.hits.into_iter().map(|hit| hit.source).collect()
    }
}

/// A search hit.
#[derive(Debug, Clone)]
pub struct Hit<T> {
    /// Document ID.
    pub id: String,
    /// Index the document lives in.
    pub index: String,
    /// Relevance score.
    pub score: Option<f64>,
    /// The document.
    pub source: T,
}

impl DocStore {
    /// Count documents.
    ///
    /// Without an explicit index the configured default index is counted;
    /// without either, every index is.
    pub async fn count(&self, index: Option<&str>) -> Result<u64> {
        match index.or(self.config().default_index.as_deref()) {
            Some(index) => self.count_in(&[index]).await,
            None => self.count_all().await,
        }
    }

    /// Count documents across all indices.
    pub async fn count_all(&self) -> Result<u64> {
        self.count_in(&[]).await
    }

    async fn count_in(&self, indices: &[&str]) -> Result<u64> {
        debug!("Counting documents in {:?}", indices);

        let parts = if indices.is_empty() {
            CountParts::None
        } else {
            CountParts::Index(indices)
        };

        let response = self.client()?.count(parts).send().await?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(DocStoreError::IndexNotFound(indices.join(",")));
        }
        if !status.is_success() {
            return Err(backend_error(response).await);
        }

        let body: Value = response.json().await?;
        Ok(body["count"].as_u64().unwrap_or(0))
    }

    /// Run a search and return the matching documents.
    pub async fn search<T: DeserializeOwned>(&self, request: &SearchRequest) -> Result<Vec<T>> {
        Ok(self.search_hits(request).await?.into_documents())
    }

    /// Run a search and return documents with metadata.
    pub async fn search_hits<T: DeserializeOwned>(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResult<T>> {
        debug!("Searching indices: {:?}", request.indices);

        let index_refs: Vec<&str> = request.indices.iter().map(String::as_str).collect();
        let parts = if index_refs.is_empty() {
            SearchParts::None
        } else {
            SearchParts::Index(&index_refs)
        };

        let mut search = self.client()?.search(parts);
        if let Some(q) = &request.q {
            search = search.q(q);
        }

        let response = search.body(request.to_json()).send().await?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(DocStoreError::IndexNotFound(request.indices.join(",")));
        }
        if !status.is_success() {
            return Err(backend_error(response).await);
        }

        parse_search_result(response.json().await?)
    }
}

fn parse_search_result<T: DeserializeOwned>(result: Value) -> Result<SearchResult<T>> {
    let mut hits = Vec::new();

    if let Some(hits_arr) = result["hits"]["hits"].as_array() {
        for hit in hits_arr {
            let id = hit["_id"].as_str().unwrap_or_default().to_string();

            let source = hit.get("_source").ok_or_else(|| {
                DocStoreError::UnexpectedResponse(format!("Hit {} carried no _source", id))
            })?;

            hits.push(Hit {
                index: hit["_index"].as_str().unwrap_or_default().to_string(),
                score: hit["_score"].as_f64(),
                source: T::deserialize(source)?,
                id,
            });
        }
    }

    // Older backends report the total as a bare number.
    let total = &result["hits"]["total"];
    let total = total["value"].as_u64().or(total.as_u64()).unwrap_or(0);

    Ok(SearchResult {
        total,
        max_score: result["hits"]["max_score"].as_f64(),
        took_ms: result["took"].as_u64().unwrap_or(0),
        hits,
    })
}
