use thiserror::Error;

/// Errors raised while declaring, building or rendering a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(
        "the table is already sorted by default on the `{field}` column; only one column can be sorted by default"
    )]
    DefaultSortAlreadyDeclared { field: String },

    #[error(
        "a sortable column has no database field; declare sortable columns with `Table::column(\"field\")`"
    )]
    SortableColumnWithoutField,

    #[error(
        "a searchable column has no database field; declare searchable columns with `Table::column(\"field\")`"
    )]
    SearchableColumnWithoutField,

    #[error("no `index` route declared; sort and pagination links need one")]
    MissingIndexRoute,

    #[error("the table has not been configured yet; call `configure` before reading its rows")]
    NotConfigured,

    #[error("condition `{sql}` has {placeholders} `?` placeholders but {bindings} bound values")]
    PlaceholderMismatch {
        sql: String,
        placeholders: usize,
        bindings: usize,
    },

    #[error("template `{name}` not found")]
    TemplateNotFound { name: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not encode query string: {0}")]
    QueryString(#[from] serde_urlencoded::ser::Error),
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;
