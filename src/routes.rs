//! Route bindings of a table and the links built from them.
//!
//! Patterns follow the Cobalto router syntax: `/users/:id/edit`. Parameters are
//! filled from the serialized row the link belongs to.

use crate::error::Result;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteAction {
    Index,
    Create,
    Edit,
    Destroy,
    Show,
}

impl RouteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteAction::Index => "index",
            RouteAction::Create => "create",
            RouteAction::Edit => "edit",
            RouteAction::Destroy => "destroy",
            RouteAction::Show => "show",
        }
    }

    /// Actions that add a trailing actions column to the table.
    pub fn is_row_action(&self) -> bool {
        matches!(
            self,
            RouteAction::Edit | RouteAction::Destroy | RouteAction::Show
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct Routes {
    bindings: BTreeMap<RouteAction, String>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to a path pattern, replacing any previous binding.
    pub fn bind(mut self, action: RouteAction, pattern: impl Into<String>) -> Self {
        self.bindings.insert(action, pattern.into());
        self
    }

    pub fn get(&self, action: RouteAction) -> Option<&str> {
        self.bindings.get(&action).map(String::as_str)
    }

    pub fn index(&self) -> Option<&str> {
        self.get(RouteAction::Index)
    }

    pub fn has_row_actions(&self) -> bool {
        self.bindings.keys().any(RouteAction::is_row_action)
    }

    /// Builds the URL of `action` for one row, or `None` if the action is unbound.
    pub fn url_for_row(&self, action: RouteAction, row: &Map<String, Value>) -> Option<String> {
        self.get(action).map(|pattern| fill_path(pattern, row))
    }
}

/// Replaces every `:name` segment of `pattern` with the percent-encoded row value.
/// Unknown parameters are left as they are.
pub fn fill_path(pattern: &str, row: &Map<String, Value>) -> String {
    pattern
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => match row.get(name) {
                Some(value) => utf8_percent_encode(&value_to_string(value), PATH_SEGMENT).to_string(),
                None => segment.to_string(),
            },
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Appends an urlencoded query string to `path`.
pub fn with_query(path: &str, params: &[(String, String)]) -> Result<String> {
    if params.is_empty() {
        return Ok(path.to_string());
    }
    let query = serde_urlencoded::to_string(params)?;
    let separator = if path.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", path, separator, query))
}

/// Plain-text form of a serialized cell value.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
