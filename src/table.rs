//! Table declaration and build.
//!
//! A `Table<M>` collects column and result declarations, route bindings and the
//! current request, then `configure` resolves sort, search and pagination, runs
//! the query and computes the result rows.

use crate::column::{CellCallback, Column};
use crate::error::{Result, TableError};
use crate::orm::{Db, Model, SelectQuery};
use crate::pagination::{PageWindow, Paginator, last_page, resolve_page, resolve_rows_number};
use crate::request::TableRequest;
use crate::result::{ResultRow, ResultScope, TableResult, compute_results, result_colspan};
use crate::routes::Routes;
use crate::settings::TableSettings;
use crate::sort::{Sort, SortDirection, resolve_sort};
use log::{debug, info, warn};
use serde_json::{Map, Value};

/// Adjusts the base query before search, sort and pagination are applied.
pub type QueryCallback = Box<dyn Fn(&mut SelectQuery) + Send + Sync>;

pub type RowCondition<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;

pub(crate) struct RowClasses<M> {
    pub(crate) condition: RowCondition<M>,
    pub(crate) classes: String,
}

/// What a build resolved and loaded.
pub(crate) struct TableState<M> {
    pub(crate) sort: Sort,
    pub(crate) search: Option<String>,
    pub(crate) paginator: Paginator<M>,
    pub(crate) values: Vec<Map<String, Value>>,
    pub(crate) result_rows: Vec<ResultRow>,
}

pub struct Table<M> {
    pub(crate) settings: TableSettings,
    identifier: Option<String>,
    pub(crate) routes: Routes,
    rows_number: Option<u32>,
    pub(crate) rows_number_selection: bool,
    request: TableRequest,
    query: Option<QueryCallback>,
    pub(crate) columns: Vec<Column<M>>,
    default_sort_column: Option<usize>,
    results: Vec<TableResult<M>>,
    pub(crate) row_classes: Vec<RowClasses<M>>,
    pub(crate) appended: Vec<(String, String)>,
    pub(crate) state: Option<TableState<M>>,
}

impl<M: Model> Default for Table<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Table<M> {
    pub fn new() -> Self {
        Self::with_settings(TableSettings::default())
    }

    pub fn with_settings(settings: TableSettings) -> Self {
        Table {
            rows_number: settings.value.rows_number,
            rows_number_selection: settings.value.rows_number_selection,
            settings,
            identifier: None,
            routes: Routes::new(),
            request: TableRequest::new(),
            query: None,
            columns: Vec::new(),
            default_sort_column: None,
            results: Vec::new(),
            row_classes: Vec::new(),
            appended: Vec::new(),
            state: None,
        }
    }

    pub fn routes(mut self, routes: Routes) -> Self {
        self.routes = routes;
        self
    }

    /// Page size used when the request does not carry one; `None` disables pagination.
    pub fn rows_number(mut self, rows_number: Option<u32>) -> Self {
        self.rows_number = rows_number;
        self
    }

    pub fn rows_number_selection(mut self, enabled: bool) -> Self {
        self.rows_number_selection = enabled;
        self
    }

    pub fn request(mut self, request: TableRequest) -> Self {
        self.request = request;
        self
    }

    pub fn query<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut SelectQuery) + Send + Sync + 'static,
    {
        self.query = Some(Box::new(callback));
        self
    }

    /// Prefixes every request field name, so several tables can share a page.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Extra query parameter carried by every generated link.
    pub fn append(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.appended.push((key.into(), value.into()));
        self
    }

    /// Adds `classes` to the rows matching `condition`.
    pub fn rows_conditional_classes<F>(mut self, condition: F, classes: impl Into<String>) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.row_classes.push(RowClasses {
            condition: Box::new(condition),
            classes: classes.into(),
        });
        self
    }

    /// Declares a column bound to a database field.
    pub fn column(&mut self, db_field: impl Into<String>) -> ColumnDeclaration<'_, M> {
        self.push_column(Column::new(Some(db_field.into())))
    }

    /// Declares a display-only column, filled by a value or html callback.
    pub fn display_column(&mut self) -> ColumnDeclaration<'_, M> {
        self.push_column(Column::new(None))
    }

    fn push_column(&mut self, column: Column<M>) -> ColumnDeclaration<'_, M> {
        self.columns.push(column);
        let index = self.columns.len() - 1;
        ColumnDeclaration { table: self, index }
    }

    pub fn result(&mut self) -> ResultDeclaration<'_, M> {
        self.results.push(TableResult::new());
        let index = self.results.len() - 1;
        ResultDeclaration { table: self, index }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn get_routes(&self) -> &Routes {
        &self.routes
    }

    pub fn get_request(&self) -> &TableRequest {
        &self.request
    }

    pub fn columns(&self) -> &[Column<M>] {
        &self.columns
    }

    pub fn sortable_columns(&self) -> Vec<&Column<M>> {
        self.columns.iter().filter(|c| c.is_sortable()).collect()
    }

    pub fn searchable_columns(&self) -> Vec<&Column<M>> {
        self.columns.iter().filter(|c| c.is_searchable()).collect()
    }

    pub fn results(&self) -> &[TableResult<M>] {
        &self.results
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_actions(&self) -> bool {
        self.routes.has_row_actions()
    }

    /// Span of cells covering the full table width.
    pub fn colspan(&self) -> Option<usize> {
        result_colspan(self.column_count(), self.has_actions())
    }

    fn field(&self, name: &str) -> String {
        match &self.identifier {
            Some(identifier) => format!("{}_{}", identifier, name),
            None => name.to_string(),
        }
    }

    pub fn rows_number_field(&self) -> String {
        self.field(&self.settings.fields.rows_number)
    }

    pub fn sort_by_field(&self) -> String {
        self.field(&self.settings.fields.sort_by)
    }

    pub fn sort_dir_field(&self) -> String {
        self.field(&self.settings.fields.sort_dir)
    }

    pub fn search_field(&self) -> String {
        self.field(&self.settings.fields.search)
    }

    pub fn page_field(&self) -> String {
        self.field(&self.settings.fields.page)
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    fn default_sort(&self) -> Option<(&str, SortDirection)> {
        let column = &self.columns[self.default_sort_column?];
        Some((column.db_field()?, column.default_sort().unwrap_or_default()))
    }

    /// Field the table is sorted by: the resolved one once configured, else the default.
    pub fn sort_by_value(&self) -> Option<&str> {
        match &self.state {
            Some(state) => state.sort.field.as_deref(),
            None => self.default_sort().map(|(field, _)| field),
        }
    }

    pub fn sort_dir_value(&self) -> SortDirection {
        match &self.state {
            Some(state) => state.sort.direction,
            None => self
                .default_sort()
                .map(|(_, direction)| direction)
                .unwrap_or_default(),
        }
    }

    pub fn search_value(&self) -> Option<&str> {
        self.state.as_ref().and_then(|state| state.search.as_deref())
    }

    pub fn paginator(&self) -> Option<&Paginator<M>> {
        self.state.as_ref().map(|state| &state.paginator)
    }

    /// Result rows computed by the last build; empty before `configure`.
    pub fn result_rows(&self) -> &[ResultRow] {
        self.state
            .as_ref()
            .map(|state| state.result_rows.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn state(&self) -> Result<&TableState<M>> {
        self.state.as_ref().ok_or(TableError::NotConfigured)
    }

    fn validate(&self) -> Result<()> {
        if self.routes.index().is_none() {
            return Err(TableError::MissingIndexRoute);
        }
        for column in &self.columns {
            if column.db_field().is_some() {
                continue;
            }
            if column.is_sortable() {
                return Err(TableError::SortableColumnWithoutField);
            }
            if column.is_searchable() {
                return Err(TableError::SearchableColumnWithoutField);
            }
        }
        Ok(())
    }

    fn resolve_sort(&self) -> Sort {
        let sortable: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.is_sortable())
            .filter_map(|c| c.db_field())
            .collect();
        resolve_sort(
            &sortable,
            self.request.get(&self.sort_by_field()),
            self.request.get(&self.sort_dir_field()),
            self.default_sort(),
        )
    }

    /// Resolves sort, search and pagination from the request, loads the page and
    /// computes the result rows. Configuration errors surface here at the latest.
    pub async fn configure(&mut self, db: &Db) -> Result<()> {
        self.validate()?;

        let sort = self.resolve_sort();
        debug!(
            "Resolved sort for `{}`: {:?} {}",
            M::table_name(),
            sort.field,
            sort.direction
        );
        let search = self
            .request
            .get(&self.search_field())
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string);
        let rows_number = resolve_rows_number(
            self.request.get(&self.rows_number_field()),
            self.rows_number,
            self.settings.value.max_rows_number,
        );
        let page = match rows_number {
            Some(_) => resolve_page(self.request.get(&self.page_field())),
            None => 1,
        };

        let mut query = SelectQuery::new(M::table_name());
        if let Some(callback) = &self.query {
            callback(&mut query);
        }
        if let Some(term) = &search {
            let fields: Vec<&str> = self
                .columns
                .iter()
                .filter(|c| c.is_searchable())
                .filter_map(|c| c.db_field())
                .collect();
            query.where_any_like(&fields, term);
        }
        if let Some(field) = &sort.field {
            query.order_by(field.clone(), sort.direction);
        }

        let total = db.count(&query).await?;
        let page = page.min(last_page(total, rows_number));
        let window = rows_number.map(|rows| PageWindow::new(rows, page));
        let items: Vec<M> = db.fetch_rows(&query, window).await?;

        let needs_dataset = window.is_some()
            && self
                .results
                .iter()
                .any(|result| result.scope() == ResultScope::Dataset);
        let dataset: Option<Vec<M>> = if needs_dataset {
            Some(db.fetch_rows(&query, None).await?)
        } else {
            None
        };

        let values = items
            .iter()
            .map(serialize_row)
            .collect::<Result<Vec<_>>>()?;
        let result_rows = compute_results(
            &self.results,
            &items,
            dataset.as_deref(),
            self.column_count(),
            self.has_actions(),
        );

        let paginator = Paginator::new(items, total, rows_number, page);
        info!(
            "Configured table `{}`: {} of {} rows, page {}/{}",
            M::table_name(),
            paginator.items().len(),
            total,
            paginator.current_page(),
            paginator.last_page()
        );
        self.state = Some(TableState {
            sort,
            search,
            paginator,
            values,
            result_rows,
        });
        Ok(())
    }
}

fn serialize_row<M: Model>(row: &M) -> Result<Map<String, Value>> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        other => {
            warn!(
                "Row of `{}` serialized to a non-object value ({}); its cells stay empty",
                M::table_name(),
                other
            );
            Ok(Map::new())
        }
    }
}

/// Handle returned by [`Table::column`] to finish a column declaration.
pub struct ColumnDeclaration<'a, M> {
    table: &'a mut Table<M>,
    index: usize,
}

impl<M: Model> ColumnDeclaration<'_, M> {
    fn column(&mut self) -> &mut Column<M> {
        &mut self.table.columns[self.index]
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.column().set_title(title.into());
        self
    }

    pub fn sortable(mut self) -> Self {
        self.column().set_sortable(true);
        self
    }

    /// Makes the column sortable and the one the table is sorted by when the
    /// request asks for nothing else. Fails if another column already is.
    pub fn sort_by_default(mut self, direction: SortDirection) -> Result<Self> {
        if let Some(existing) = self.table.default_sort_column {
            return Err(TableError::DefaultSortAlreadyDeclared {
                field: self.table.columns[existing].label(),
            });
        }
        self.table.default_sort_column = Some(self.index);
        let column = self.column();
        column.set_sortable(true);
        column.set_default_sort(direction);
        Ok(self)
    }

    pub fn searchable(mut self) -> Self {
        self.column().set_searchable(true);
        self
    }

    /// Truncates displayed values longer than `limit` characters.
    pub fn string_limit(mut self, limit: usize) -> Self {
        self.column().set_string_limit(limit);
        self
    }

    /// chrono format applied to date/time values, e.g. `%d/%m/%Y %H:%M`.
    pub fn date_time_format(mut self, format: impl Into<String>) -> Self {
        self.column().set_date_time_format(format.into());
        self
    }

    pub fn button(mut self, classes: impl Into<String>) -> Self {
        self.column().set_button_classes(classes.into());
        self
    }

    pub fn link<F>(mut self, url: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        self.column().set_link(Box::new(url));
        self
    }

    pub fn prepend_html(mut self, html: impl Into<String>) -> Self {
        self.column().set_prepend_html(html.into());
        self
    }

    pub fn append_html(mut self, html: impl Into<String>) -> Self {
        self.column().set_append_html(html.into());
        self
    }

    /// Custom cell value, still escaped and formatted like a field value.
    pub fn value<F>(mut self, value: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        self.column().set_value(Box::new(value) as CellCallback<M>);
        self
    }

    /// Custom cell markup, rendered as is.
    pub fn html<F>(mut self, html: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        self.column().set_html(Box::new(html) as CellCallback<M>);
        self
    }
}

/// Handle returned by [`Table::result`] to finish a result declaration.
pub struct ResultDeclaration<'a, M> {
    table: &'a mut Table<M>,
    index: usize,
}

impl<M: Model> ResultDeclaration<'_, M> {
    fn result(&mut self) -> &mut TableResult<M> {
        &mut self.table.results[self.index]
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.result().set_title(title.into());
        self
    }

    /// Aggregation callback; receives the current page rows unless `over_dataset` is set.
    pub fn html<F>(mut self, html: F) -> Self
    where
        F: Fn(&[M]) -> String + Send + Sync + 'static,
    {
        self.result().set_html(Box::new(html));
        self
    }

    /// Hands the callback every row matching the query and search instead of the page.
    pub fn over_dataset(mut self) -> Self {
        self.result().set_scope(ResultScope::Dataset);
        self
    }
}
