//! Frame conversion and canonical schema

pub mod frame;
pub mod schema;

pub use frame::{economic_to_frame, prices_to_frame, table_from_frame, FrameError};
pub use schema::{normalize_column_name, ColumnMap};
