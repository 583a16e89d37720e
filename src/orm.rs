//! Query side of a table over sqlx + SQLite.
//!
//! Usage:
//! let db = Db::connect("sqlite::memory:").await?;
//! db.execute("CREATE TABLE ...").await?;
//! let rows: Vec<User> = db.fetch_rows(&SelectQuery::new("users"), None).await?;
use crate::error::{Result, TableError};
use crate::pagination::PageWindow;
use crate::sort::SortDirection;
use log::{debug, info};
use serde::Serialize;
pub use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

/// An async database pool wrapper.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

/// A model a table can list.
///
/// Rows are decoded with `FromRow` and serialized to read cell values by database field.
pub trait Model: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Unpin {
    fn table_name() -> &'static str;
}

impl Db {
    /// Connect (or create) a SQLite database at the given URI
    pub async fn connect(uri: &str) -> Result<Self, sqlx::Error> {
        info!("Connecting to SQLite database at URI: {}", uri);
        let pool = SqlitePool::connect(uri).await?;
        info!("Connected to SQLite database: {}", uri);
        Ok(Db { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Db { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute an arbitrary SQL statement, e.g. DDL, INSERT, UPDATE.
    pub async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        debug!("Executing SQL: {}", sql);
        let result = self.pool.execute(sql).await;
        match &result {
            Ok(_) => debug!("SQL executed successfully"),
            Err(e) => log::error!("SQL execution failed: {}", e),
        }
        result.map(|_| ())
    }

    /// Fetch all rows and map to a type implementing `FromRow`.
    pub async fn fetch_all<T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
    ) -> Result<Vec<T>, sqlx::Error> {
        debug!("Fetching rows with SQL: {}", sql);
        let result = sqlx::query_as(sql).fetch_all(&self.pool).await;
        match &result {
            Ok(rows) => debug!("Fetched {} rows successfully", rows.len()),
            Err(e) => log::error!("Row fetch failed: {}", e),
        }
        result
    }

    /// Fetch the rows of `query`, restricted to `window` when given.
    pub async fn fetch_rows<M: Model>(
        &self,
        query: &SelectQuery,
        window: Option<PageWindow>,
    ) -> Result<Vec<M>> {
        let mut builder = query.build_select(window)?;
        debug!("Fetching table rows with SQL: {}", builder.sql());
        let result = builder.build_query_as::<M>().fetch_all(&self.pool).await;
        match &result {
            Ok(rows) => debug!("Fetched {} table rows", rows.len()),
            Err(e) => log::error!("Table row fetch failed: {}", e),
        }
        Ok(result?)
    }

    /// Number of rows `query` matches, ignoring order and pagination.
    pub async fn count(&self, query: &SelectQuery) -> Result<u64> {
        let mut builder = query.build_count()?;
        debug!("Counting table rows with SQL: {}", builder.sql());
        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }
}

/// A WHERE fragment with `?` placeholders and the values bound to them.
#[derive(Clone, Debug)]
struct Condition {
    sql: String,
    bindings: Vec<String>,
}

/// SELECT statement a table runs, shaped by the table's query callback, search and sort.
#[derive(Clone, Debug)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    joins: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Option<(String, SortDirection)>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        SelectQuery {
            table: table.into(),
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Replace the selected expressions. Without any, `<table>.*` is selected.
    pub fn select(&mut self, expression: impl Into<String>) -> &mut Self {
        self.columns = vec![expression.into()];
        self
    }

    pub fn add_select(&mut self, expression: impl Into<String>) -> &mut Self {
        self.columns.push(expression.into());
        self
    }

    /// `INNER JOIN <table> ON <left> <operator> <right>`
    pub fn join(&mut self, table: &str, left: &str, operator: &str, right: &str) -> &mut Self {
        self.joins
            .push(format!("INNER JOIN {} ON {} {} {}", table, left, operator, right));
        self
    }

    pub fn left_join(&mut self, table: &str, left: &str, operator: &str, right: &str) -> &mut Self {
        self.joins
            .push(format!("LEFT JOIN {} ON {} {} {}", table, left, operator, right));
        self
    }

    /// Raw condition without bound values.
    pub fn where_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.where_bind(sql, Vec::<String>::new())
    }

    /// Condition whose `?` placeholders are bound, in order, to `bindings`.
    ///
    /// Every `?` in `sql` is a placeholder; a literal question mark must be passed as a
    /// bound value. Building a query whose placeholder and binding counts differ fails
    /// with [`TableError::PlaceholderMismatch`].
    pub fn where_bind<I, S>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.push(Condition {
            sql: sql.into(),
            bindings: bindings.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Rows where any of `fields` contains `term`.
    pub fn where_any_like(&mut self, fields: &[&str], term: &str) -> &mut Self {
        if fields.is_empty() {
            return self;
        }
        let sql = fields
            .iter()
            .map(|field| format!("{} LIKE ?", field))
            .collect::<Vec<_>>()
            .join(" OR ");
        let pattern = format!("%{}%", term);
        self.where_bind(format!("({})", sql), vec![pattern; fields.len()])
    }

    pub fn order_by(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    fn check_placeholders(&self) -> Result<()> {
        for condition in &self.conditions {
            let placeholders = condition.sql.matches('?').count();
            if placeholders != condition.bindings.len() {
                return Err(TableError::PlaceholderMismatch {
                    sql: condition.sql.clone(),
                    placeholders,
                    bindings: condition.bindings.len(),
                });
            }
        }
        Ok(())
    }

    fn push_body(&self, builder: &mut QueryBuilder<'static, Sqlite>) -> Result<()> {
        self.check_placeholders()?;
        builder.push("SELECT ");
        if self.columns.is_empty() {
            builder.push(format!("{}.*", self.table));
        } else {
            builder.push(self.columns.join(", "));
        }
        builder.push(" FROM ");
        builder.push(self.table.as_str());
        for join in &self.joins {
            builder.push(" ");
            builder.push(join.as_str());
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            let mut bindings = condition.bindings.iter();
            for (j, part) in condition.sql.split('?').enumerate() {
                if j > 0 {
                    if let Some(value) = bindings.next() {
                        builder.push_bind(value.clone());
                    }
                }
                builder.push(part);
            }
        }
        Ok(())
    }

    /// SELECT with ORDER BY and, when given, LIMIT/OFFSET.
    pub fn build_select(&self, window: Option<PageWindow>) -> Result<QueryBuilder<'static, Sqlite>> {
        let mut builder = QueryBuilder::new("");
        self.push_body(&mut builder)?;
        if let Some((field, direction)) = &self.order_by {
            builder.push(format!(" ORDER BY {} {}", field, direction.as_sql()));
        }
        if let Some(window) = window {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX));
            builder.push(" OFFSET ");
            builder.push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
        }
        Ok(builder)
    }

    pub fn build_count(&self) -> Result<QueryBuilder<'static, Sqlite>> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM (");
        self.push_body(&mut builder)?;
        builder.push(") AS counted");
        Ok(builder)
    }

    /// SQL text of the paginated select, placeholders included.
    pub fn to_sql(&self, window: Option<PageWindow>) -> Result<String> {
        Ok(self.build_select(window)?.sql().to_string())
    }
}
