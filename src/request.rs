//! Query parameters a table reads: page size, sort, search and page.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::collections::BTreeMap;
use std::convert::Infallible;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableRequest {
    params: BTreeMap<String, String>,
}

impl TableRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an urlencoded query string, with or without its leading `?`.
    /// A malformed query string yields an empty request.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => pairs.into_iter().collect(),
            Err(e) => {
                log::warn!("Ignoring malformed table query string `{}`: {}", query, e);
                Self::default()
            }
        }
    }

    /// Extracts the query part of a request target such as `/users?rows=5`.
    pub fn from_uri(uri: &str) -> Self {
        match uri.split_once('?') {
            Some((_, query)) => Self::from_query(query),
            None => Self::default(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TableRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TableRequest {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<S> FromRequestParts<S> for TableRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .uri
            .query()
            .map(TableRequest::from_query)
            .unwrap_or_default())
    }
}
