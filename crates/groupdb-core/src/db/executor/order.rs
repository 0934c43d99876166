//! Module: executor::order
//! Responsibility: ordering descriptors and the row-prefix comparator.
//! Boundary: centralizes ASC/DESC and null handling for scans and merges.

use crate::{
    db::Direction,
    error::{ErrorOrigin, InternalError},
    value::{Value, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// OrderingColumn
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OrderingColumn {
    pub position: usize,
    pub direction: Direction,
}

///
/// RowOrdering
///
/// Sort order a cursor's output must satisfy: `(field position, direction)`
/// pairs, most significant first.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowOrdering {
    columns: Vec<OrderingColumn>,
}

impl RowOrdering {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Ordering over `positions`, all in `direction`.
    #[must_use]
    pub fn uniform(positions: impl IntoIterator<Item = usize>, direction: Direction) -> Self {
        Self {
            columns: positions
                .into_iter()
                .map(|position| OrderingColumn {
                    position,
                    direction,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn then(mut self, position: usize, direction: Direction) -> Self {
        self.columns.push(OrderingColumn {
            position,
            direction,
        });

        self
    }

    #[must_use]
    pub fn columns(&self) -> &[OrderingColumn] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn directions(&self) -> Vec<Direction> {
        self.columns.iter().map(|column| column.direction).collect()
    }

    /// Same positions with every direction flipped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|column| OrderingColumn {
                    position: column.position,
                    direction: column.direction.reverse(),
                })
                .collect(),
        }
    }
}

///
/// KeyComparator
///
/// Compares equal-length field runs of two rows, one direction per field.
/// Nulls order low before the direction is applied.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyComparator {
    directions: Vec<Direction>,
}

impl KeyComparator {
    #[must_use]
    pub const fn new(directions: Vec<Direction>) -> Self {
        Self { directions }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.directions.len()
    }

    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Compare `left[left_offset..]` with `right[right_offset..]` over the
    /// comparator width.
    pub fn compare(
        &self,
        left: &[Value],
        left_offset: usize,
        right: &[Value],
        right_offset: usize,
    ) -> Result<Ordering, InternalError> {
        for (i, direction) in self.directions.iter().enumerate() {
            let (Some(a), Some(b)) = (left.get(left_offset + i), right.get(right_offset + i))
            else {
                return Err(InternalError::executor_invariant(format!(
                    "executor invariant violated: comparison field {i} lies outside the row"
                )));
            };

            let ordering = strict_order_cmp(a, b).ok_or_else(|| {
                InternalError::incomparable(
                    ErrorOrigin::Executor,
                    format!("cannot compare {a:?} with {b:?}"),
                )
            })?;
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering.is_ne() {
                return Ok(ordering);
            }
        }

        Ok(Ordering::Equal)
    }

    // Return whether `current` moves backwards after `previous` on one side.
    pub(crate) fn violates_monotonicity(
        &self,
        previous: &[Value],
        current: &[Value],
        offset: usize,
    ) -> Result<bool, InternalError> {
        Ok(self.compare(previous, offset, current, offset)?.is_gt())
    }

    // Human-readable direction labels for invariant diagnostics.
    pub(crate) fn order_label(&self) -> String {
        self.directions
            .iter()
            .map(|direction| direction.label())
            .collect::<Vec<_>>()
            .join(",")
    }
}
