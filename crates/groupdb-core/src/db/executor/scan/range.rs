use crate::value::Value;

///
/// IndexBound
///
/// One end of a key range: values for a prefix of the index columns.
///

#[derive(Clone, Debug, PartialEq)]
pub struct IndexBound {
    values: Vec<Value>,
    inclusive: bool,
}

impl IndexBound {
    #[must_use]
    pub const fn inclusive(values: Vec<Value>) -> Self {
        Self {
            values,
            inclusive: true,
        }
    }

    #[must_use]
    pub const fn exclusive(values: Vec<Value>) -> Self {
        Self {
            values,
            inclusive: false,
        }
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub const fn is_inclusive(&self) -> bool {
        self.inclusive
    }
}

///
/// IndexKeyRange
///
/// Key range of an index scan. `low` and `high` are expressed in the
/// index's stored order: `low` is where a forward scan starts.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexKeyRange {
    low: Option<IndexBound>,
    high: Option<IndexBound>,
}

impl IndexKeyRange {
    /// Every entry of the index.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            low: None,
            high: None,
        }
    }

    #[must_use]
    pub const fn bounded(low: Option<IndexBound>, high: Option<IndexBound>) -> Self {
        Self { low, high }
    }

    /// Entries whose leading columns equal `values`.
    #[must_use]
    pub fn equal(values: Vec<Value>) -> Self {
        Self {
            low: Some(IndexBound::inclusive(values.clone())),
            high: Some(IndexBound::inclusive(values)),
        }
    }

    #[must_use]
    pub const fn low(&self) -> Option<&IndexBound> {
        self.low.as_ref()
    }

    #[must_use]
    pub const fn high(&self) -> Option<&IndexBound> {
        self.high.as_ref()
    }

    /// Longest bound prefix length.
    #[must_use]
    pub fn width(&self) -> usize {
        let len = |bound: Option<&IndexBound>| bound.map_or(0, |b| b.values.len());

        len(self.low()).max(len(self.high()))
    }

    /// Number of leading columns pinned to a single value by both bounds.
    #[must_use]
    pub fn equality_prefix_len(&self) -> usize {
        match (&self.low, &self.high) {
            (Some(low), Some(high)) if low.inclusive && high.inclusive => low
                .values
                .iter()
                .zip(&high.values)
                .take_while(|(a, b)| a == b)
                .count(),
            _ => 0,
        }
    }
}
