//! Core data models for search parameters, raw results and output rows.

mod query;
mod record;
mod row;

pub use query::{FacetOptions, QuerySpec, QuerySpecBuilder, SortMode};
pub use record::{RawRecord, SearchPage};
pub use row::{ResultRow, ResultTable, COLUMNS};
