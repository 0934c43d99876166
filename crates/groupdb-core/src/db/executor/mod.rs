//! Pull-based cursor executor: the cursor protocol, index scans, and
//! ordered index intersection.

mod context;
mod cursor;
mod intersect;
mod order;
mod scan;

pub use context::{CancellationToken, QueryContext, TransactionId};
pub use cursor::{Cursor, CursorBox, CursorState, RowsCursor, collect_rows};
pub use intersect::{
    IntersectOrdered, IntersectOrderedBuilder, IntersectOutput, JoinType, intersect_ordered,
};
pub use order::{KeyComparator, OrderingColumn, RowOrdering};
pub use scan::{IndexBound, IndexKeyRange, IndexScan, index_scan};
