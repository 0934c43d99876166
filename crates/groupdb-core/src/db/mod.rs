//! Execution-side runtime: rows, derived index metadata, schema snapshots,
//! index storage, and the cursor executor.

mod direction;

pub mod executor;
pub mod index;
pub mod row;
pub mod schema;
pub mod store;

pub use direction::Direction;
