//! Sortable, paginated HTML tables for Cobalto applications.
//!
//! ```rust,ignore
//! let mut table = Table::<User>::new()
//!     .routes(Routes::new().bind(RouteAction::Index, "/users"))
//!     .request(request);
//! table.column("name").title("Name").sortable().searchable();
//! table.column("email").sort_by_default(SortDirection::Desc)?;
//! table.result().title("Total").html(|rows| rows.len().to_string());
//! table.configure(&db).await?;
//! let html = table.html()?;
//! ```
pub mod column;
pub mod error;
pub mod orm;
pub mod pagination;
pub mod request;
pub mod result;
pub mod routes;
pub mod settings;
pub mod sort;
pub mod table;
pub mod template;
mod view;

pub use column::Column;
pub use error::{Result, TableError};
pub use orm::{Db, Model, SelectQuery};
pub use pagination::Paginator;
pub use request::TableRequest;
pub use result::{ResultRow, ResultScope, TableResult};
pub use routes::{RouteAction, Routes};
pub use settings::TableSettings;
pub use sort::SortDirection;
pub use table::Table;
