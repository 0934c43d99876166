use crate::{
    db::index::ordinal::OrdinalMap,
    model::index::{Index, IndexError, IndexName, source_position},
    value::{Value, canonical_cmp},
};
use std::{
    cmp::Ordering,
    fmt::{self, Display},
};

///
/// HKeySource
/// One step of hkey synthesis.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HKeySource {
    /// Start a new segment tagged with this table ordinal.
    Ordinal(u32),
    /// Append the value at this index-row position to the current segment.
    IndexRow(usize),
}

///
/// IndexToHKey
///
/// Recipe for rebuilding the leaf row's hkey from an index row alone:
/// one `Ordinal` per ancestor segment, each followed by the index-row
/// positions of that table's primary-key values.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexToHKey {
    index: IndexName,
    row_width: usize,
    sources: Vec<HKeySource>,
}

impl IndexToHKey {
    pub fn for_index(index: &Index, ordinals: &OrdinalMap) -> Result<Self, IndexError> {
        let mut sources = Vec::with_capacity(
            index.hkey_layout().segments().len() + index.hkey_layout().column_count(),
        );

        for segment in index.hkey_layout().segments() {
            let ordinal =
                ordinals
                    .ordinal(&segment.table)
                    .ok_or_else(|| IndexError::MissingOrdinal {
                        index: index.name().clone(),
                        table: segment.table.clone(),
                    })?;
            sources.push(HKeySource::Ordinal(ordinal));

            for column in &segment.columns {
                let position = source_position(index.branch(), index.all_columns(), column)
                    .ok_or_else(|| IndexError::HKeyColumnUnavailable {
                        index: index.name().clone(),
                        column: column.clone(),
                    })?;
                sources.push(HKeySource::IndexRow(position));
            }
        }

        Ok(Self {
            index: index.name().clone(),
            row_width: index.all_columns().len(),
            sources,
        })
    }

    #[must_use]
    pub fn sources(&self) -> &[HKeySource] {
        &self.sources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    #[must_use]
    pub fn is_ordinal(&self, step: usize) -> bool {
        matches!(self.sources.get(step), Some(HKeySource::Ordinal(_)))
    }

    /// Ordinal at `step`; `None` when that step reads the index row.
    #[must_use]
    pub fn ordinal(&self, step: usize) -> Option<u32> {
        match self.sources.get(step) {
            Some(HKeySource::Ordinal(ordinal)) => Some(*ordinal),
            _ => None,
        }
    }

    /// Index-row position at `step`; `None` when that step is an ordinal.
    #[must_use]
    pub fn index_row_position(&self, step: usize) -> Option<usize> {
        match self.sources.get(step) {
            Some(HKeySource::IndexRow(position)) => Some(*position),
            _ => None,
        }
    }

    /// Synthesize the hkey carried by a physical index row.
    pub fn hkey_for(&self, index_row: &[Value]) -> Result<HKey, IndexError> {
        if index_row.len() != self.row_width {
            return Err(IndexError::RowArity {
                index: self.index.clone(),
                expected: self.row_width,
                found: index_row.len(),
            });
        }

        let mut segments: Vec<HKeySegment> = Vec::new();
        for source in &self.sources {
            match *source {
                HKeySource::Ordinal(ordinal) => segments.push(HKeySegment {
                    ordinal,
                    values: Vec::new(),
                }),
                HKeySource::IndexRow(position) => {
                    // sources always open with an ordinal
                    if let (Some(segment), Some(value)) =
                        (segments.last_mut(), index_row.get(position))
                    {
                        segment.values.push(value.clone());
                    }
                }
            }
        }

        Ok(HKey { segments })
    }
}

///
/// HKey
///
/// Hierarchical key: the ordinal-tagged chain of ancestor primary keys.
/// Group rows sort in hkey order, so a parent's hkey is a prefix of each of
/// its children's.
///

#[derive(Clone, Debug, PartialEq)]
pub struct HKey {
    segments: Vec<HKeySegment>,
}

///
/// HKeySegment
///

#[derive(Clone, Debug, PartialEq)]
pub struct HKeySegment {
    pub ordinal: u32,
    pub values: Vec<Value>,
}

impl HKey {
    #[must_use]
    pub const fn new(segments: Vec<HKeySegment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[HKeySegment] {
        &self.segments
    }

    /// Whether `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.segments.len() < other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// Total hkey order: segment by segment, ordinal then values; a prefix
    /// sorts before its extensions.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        for (left, right) in self.segments.iter().zip(&other.segments) {
            let ordering = left.ordinal.cmp(&right.ordinal).then_with(|| {
                left.values
                    .iter()
                    .zip(&right.values)
                    .map(|(a, b)| canonical_cmp(a, b))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or_else(|| left.values.len().cmp(&right.values.len()))
            });
            if ordering.is_ne() {
                return ordering;
            }
        }

        self.segments.len().cmp(&other.segments.len())
    }
}

impl Display for HKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{{{}", segment.ordinal)?;
            for value in &segment.values {
                write!(f, ",{value}")?;
            }
            write!(f, "}}")?;
        }

        Ok(())
    }
}
