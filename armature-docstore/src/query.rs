//! Query DSL.

use serde_json::{json, Value};

/// A search query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Match all documents.
    MatchAll,
    /// Full-text match on one field.
    Match {
        /// Field to search.
        field: String,
        /// Search text.
        query: String,
    },
    /// Exact value on one field.
    Term {
        /// Field to match.
        field: String,
        /// Exact value.
        value: Value,
    },
    /// Lucene query string across all fields.
    QueryString(String),
    /// Combination of clauses.
    Bool(BoolQuery),
    /// Raw JSON query, sent as given.
    Raw(Value),
}

impl Query {
    /// Match query.
    pub fn matching(field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::Match {
            field: field.into(),
            query: query.into(),
        }
    }

    /// Term query.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Query string query.
    pub fn query_string(query: impl Into<String>) -> Self {
        Query::QueryString(query.into())
    }

    /// Convert query to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Match { field, query } => json!({ "match": { field.as_str(): query } }),
            Query::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Query::QueryString(query) => json!({ "query_string": { "query": query } }),
            Query::Bool(b) => b.to_json(),
            Query::Raw(v) => v.clone(),
        }
    }
}

impl From<BoolQuery> for Query {
    fn from(query: BoolQuery) -> Self {
        Query::Bool(query)
    }
}

/// Bool query combining other queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<Query>,
    should: Vec<Query>,
    filter: Vec<Query>,
    must_not: Vec<Query>,
}

impl BoolQuery {
    /// Create an empty bool query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause that must match and contributes to scoring.
    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    /// Add a clause that should match.
    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    /// Add a clause that must match without scoring.
    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    /// Add a clause that must not match.
    pub fn must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    fn to_json(&self) -> Value {
        let mut clauses = serde_json::Map::new();

        for (name, queries) in [
            ("must", &self.must),
            ("should", &self.should),
            ("filter", &self.filter),
            ("must_not", &self.must_not),
        ] {
            if !queries.is_empty() {
                clauses.insert(
                    name.to_string(),
                    Value::Array(queries.iter().map(Query::to_json).collect()),
                );
            }
        }

        json!({ "bool": clauses })
    }
}
