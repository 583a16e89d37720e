//! Column declarations and cell rendering.

use crate::routes::value_to_string;
use crate::sort::SortDirection;
use crate::template::escape_html;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::fmt::Write;

/// Per-row callback producing a cell value, markup or link target.
pub type CellCallback<M> = Box<dyn Fn(&M) -> String + Send + Sync>;

const DATE_TIME_INPUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

pub struct Column<M> {
    db_field: Option<String>,
    title: Option<String>,
    sortable: bool,
    default_sort: Option<SortDirection>,
    searchable: bool,
    string_limit: Option<usize>,
    date_time_format: Option<String>,
    button_classes: Option<String>,
    link: Option<CellCallback<M>>,
    prepend_html: Option<String>,
    append_html: Option<String>,
    value: Option<CellCallback<M>>,
    html: Option<CellCallback<M>>,
}

impl<M> Column<M> {
    /// A column bound to a database field, or display-only when `db_field` is `None`.
    pub fn new(db_field: Option<String>) -> Self {
        Column {
            db_field,
            title: None,
            sortable: false,
            default_sort: None,
            searchable: false,
            string_limit: None,
            date_time_format: None,
            button_classes: None,
            link: None,
            prepend_html: None,
            append_html: None,
            value: None,
            html: None,
        }
    }

    pub fn db_field(&self) -> Option<&str> {
        self.db_field.as_deref()
    }

    /// Declared title, else the database field humanized (`owner_id` -> `Owner id`).
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        let Some(field) = &self.db_field else {
            return String::new();
        };
        let spaced = field.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn default_sort(&self) -> Option<SortDirection> {
        self.default_sort
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    /// Name used in error messages.
    pub(crate) fn label(&self) -> String {
        self.db_field.clone().unwrap_or_else(|| self.title())
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    pub(crate) fn set_sortable(&mut self, sortable: bool) {
        self.sortable = sortable;
    }

    pub(crate) fn set_default_sort(&mut self, direction: SortDirection) {
        self.default_sort = Some(direction);
    }

    pub(crate) fn set_searchable(&mut self, searchable: bool) {
        self.searchable = searchable;
    }

    pub(crate) fn set_string_limit(&mut self, limit: usize) {
        self.string_limit = Some(limit);
    }

    pub(crate) fn set_date_time_format(&mut self, format: String) {
        self.date_time_format = Some(format);
    }

    pub(crate) fn set_button_classes(&mut self, classes: String) {
        self.button_classes = Some(classes);
    }

    pub(crate) fn set_link(&mut self, link: CellCallback<M>) {
        self.link = Some(link);
    }

    pub(crate) fn set_prepend_html(&mut self, html: String) {
        self.prepend_html = Some(html);
    }

    pub(crate) fn set_append_html(&mut self, html: String) {
        self.append_html = Some(html);
    }

    pub(crate) fn set_value(&mut self, value: CellCallback<M>) {
        self.value = Some(value);
    }

    pub(crate) fn set_html(&mut self, html: CellCallback<M>) {
        self.html = Some(html);
    }

    /// Cell markup for one row. `values` is the row serialized by field name.
    ///
    /// A custom html callback replaces everything else. Otherwise the value is
    /// formatted, limited, escaped, then wrapped in button and link markup.
    /// Prepended and appended html only surround non-empty values.
    pub fn render_cell(&self, row: &M, values: &Map<String, Value>) -> String {
        if let Some(html) = &self.html {
            return html(row);
        }

        let mut raw = match (&self.value, &self.db_field) {
            (Some(value), _) => value(row),
            (None, Some(field)) => values.get(field).map(value_to_string).unwrap_or_default(),
            (None, None) => String::new(),
        };
        if let Some(format) = &self.date_time_format {
            if let Some(formatted) = format_date_time(&raw, format) {
                raw = formatted;
            }
        }
        if let Some(limit) = self.string_limit {
            raw = limit_string(&raw, limit);
        }
        if raw.is_empty() {
            return raw;
        }

        let mut content = escape_html(&raw);
        if let Some(classes) = &self.button_classes {
            content = format!(r#"<button class="{}">{}</button>"#, escape_html(classes), content);
        }
        if let Some(link) = &self.link {
            content = format!(
                r#"<a href="{}" title="{}">{}</a>"#,
                escape_html(&link(row)),
                escape_html(&raw),
                content
            );
        }
        if let Some(prepend) = &self.prepend_html {
            content = format!("{} {}", prepend, content);
        }
        if let Some(append) = &self.append_html {
            content = format!("{} {}", content, append);
        }
        content
    }
}

impl<M> std::fmt::Debug for Column<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("db_field", &self.db_field)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("default_sort", &self.default_sort)
            .field("searchable", &self.searchable)
            .finish_non_exhaustive()
    }
}

/// Truncates to `limit` characters, marking the cut with `...`.
pub fn limit_string(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let mut limited: String = value.chars().take(limit).collect();
    limited.push_str("...");
    limited
}

/// Reformats an RFC 3339 or SQL date/time; `None` when `raw` is neither or `format`
/// asks for fields the value does not carry.
pub fn format_date_time(raw: &str, format: &str) -> Option<String> {
    let raw = raw.trim();
    let mut out = String::new();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        write!(out, "{}", date_time.format(format)).ok()?;
        return Some(out);
    }
    let naive = DATE_TIME_INPUTS
        .iter()
        .find_map(|input| NaiveDateTime::parse_from_str(raw, input).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    write!(out, "{}", naive.format(format)).ok()?;
    Some(out)
}
