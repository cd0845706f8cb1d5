//! Warehouse query execution.
//!
//! Three layers:
//! - [`safety`] — the read-only gate every statement passes before leaving
//!   the process
//! - [`http`] — the JSON gateway client implementing `QueryService` and
//!   `CatalogService`
//! - [`executor`] — submit, poll to terminal state, fetch paginated results,
//!   with retries around each remote call

pub mod executor;
pub mod http;
pub mod safety;

pub use executor::QueryExecutor;
pub use http::{HttpCatalogService, HttpQueryService};
pub use safety::validate_read_only;
