//! Index key-composition metadata.
//!
//! Maps between a physical index row, the leaf table row it covers, and the
//! hkey of that row. Associations depend on table ordinals, so they are
//! computed per ordinal-map generation and cached.

mod cache;
mod composition;
mod hkey;
mod ordinal;

#[cfg(test)]
mod tests;

use crate::model::index::{Index, IndexColumn, IndexError};

// re-exports
pub use cache::{CacheStats, FieldAssociationCache};
pub use composition::IndexRowComposition;
pub use hkey::{HKey, HKeySegment, HKeySource, IndexToHKey};
pub use ordinal::OrdinalMap;

///
/// FieldAssociations
///
/// Everything derived from one index under one ordinal-map generation.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldAssociations {
    generation: u64,
    all_columns: Vec<IndexColumn>,
    row_composition: IndexRowComposition,
    index_to_hkey: IndexToHKey,
}

impl FieldAssociations {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Key columns followed by the appended hkey columns.
    #[must_use]
    pub fn all_columns(&self) -> &[IndexColumn] {
        &self.all_columns
    }

    #[must_use]
    pub const fn row_composition(&self) -> &IndexRowComposition {
        &self.row_composition
    }

    #[must_use]
    pub const fn index_to_hkey(&self) -> &IndexToHKey {
        &self.index_to_hkey
    }
}

/// Derive the full column list, row composition, and hkey recipe of `index`
/// under `ordinals`. Deterministic: equal inputs yield equal associations.
pub fn compute_field_associations(
    index: &Index,
    ordinals: &OrdinalMap,
) -> Result<FieldAssociations, IndexError> {
    let index_to_hkey = IndexToHKey::for_index(index, ordinals)?;

    Ok(FieldAssociations {
        generation: ordinals.generation(),
        all_columns: index.all_columns().to_vec(),
        row_composition: IndexRowComposition::for_index(index),
        index_to_hkey,
    })
}
