//! Aggregate result rows displayed below the table data.

/// Aggregation callback; receives the rows of its [`ResultScope`].
pub type ResultCallback<M> = Box<dyn Fn(&[M]) -> String + Send + Sync>;

/// Which rows a result callback receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultScope {
    /// The rows displayed on the current page.
    #[default]
    Page,
    /// Every row matching the table query and search, unpaginated.
    Dataset,
}

pub struct TableResult<M> {
    title: String,
    html: Option<ResultCallback<M>>,
    scope: ResultScope,
}

impl<M> TableResult<M> {
    pub fn new() -> Self {
        TableResult {
            title: String::new(),
            html: None,
            scope: ResultScope::Page,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn scope(&self) -> ResultScope {
        self.scope
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_html(&mut self, html: ResultCallback<M>) {
        self.html = Some(html);
    }

    pub(crate) fn set_scope(&mut self, scope: ResultScope) {
        self.scope = scope;
    }

    /// Runs the callback; a result without one renders an empty value.
    pub fn compute(&self, rows: &[M]) -> String {
        self.html.as_ref().map(|html| html(rows)).unwrap_or_default()
    }
}

impl<M> Default for TableResult<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for TableResult<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableResult")
            .field("title", &self.title)
            .field("scope", &self.scope)
            .field("has_html", &self.html.is_some())
            .finish()
    }
}

/// A computed result, ready to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRow {
    pub title: String,
    /// Callback output, rendered unescaped.
    pub html: String,
    pub colspan: Option<usize>,
}

/// Span of a cell covering the whole table width.
///
/// `None` when the table has at most one column, in which case the cell needs no colspan.
pub fn result_colspan(column_count: usize, has_actions: bool) -> Option<usize> {
    if column_count > 1 {
        Some(column_count + usize::from(has_actions))
    } else {
        None
    }
}

/// Runs every declared result over its scope's rows.
///
/// `dataset` falls back to `page` when no unpaginated rows were loaded.
pub fn compute_results<M>(
    results: &[TableResult<M>],
    page: &[M],
    dataset: Option<&[M]>,
    column_count: usize,
    has_actions: bool,
) -> Vec<ResultRow> {
    let colspan = result_colspan(column_count, has_actions);
    results
        .iter()
        .map(|result| {
            let rows = match result.scope() {
                ResultScope::Page => page,
                ResultScope::Dataset => dataset.unwrap_or(page),
            };
            ResultRow {
                title: result.title().to_string(),
                html: result.compute(rows),
                colspan,
            }
        })
        .collect()
}
