
use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        column::{FieldKind, TableName},
        index::Index,
        table::Table,
    },
    value::Value,
};
use derive_more::Deref;
use std::{
    fmt::{self, Display},
    sync::Arc,
};

///
/// RowTypeSource
/// What a row type describes.
///

#[derive(Clone, Debug)]
pub enum RowTypeSource {
    Table(TableName),
    Index(Arc<Index>),
    Derived,
}

impl PartialEq for RowTypeSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Table(a), Self::Table(b)) => a == b,
            (Self::Index(a), Self::Index(b)) => Arc::ptr_eq(a, b) || a.name() == b.name(),
            (Self::Derived, Self::Derived) => true,
            _ => false,
        }
    }
}

///
/// RowType
///
/// Schema descriptor shared by every row a cursor produces. Immutable and
/// shared by reference for the lifetime of a compiled plan.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RowType {
    name: String,
    fields: Vec<FieldKind>,
    source: RowTypeSource,
}

impl RowType {
    /// Row type of a table's rows.
    #[must_use]
    pub fn for_table(table: &Table) -> Arc<Self> {
        Arc::new(Self {
            name: table.name().to_string(),
            fields: table.columns().iter().map(|column| column.kind).collect(),
            source: RowTypeSource::Table(table.name().clone()),
        })
    }

    /// Row type of an index's physical rows (all columns, hkey suffix included).
    #[must_use]
    pub fn for_index(index: &Arc<Index>) -> Arc<Self> {
        Arc::new(Self {
            name: index.name().to_string(),
            fields: index
                .all_columns()
                .iter()
                .map(|column| column.column.kind)
                .collect(),
            source: RowTypeSource::Index(Arc::clone(index)),
        })
    }

    /// Row type of a projection or other derived stream.
    #[must_use]
    pub fn derived(name: impl Into<String>, fields: Vec<FieldKind>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            fields,
            source: RowTypeSource::Derived,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, position: usize) -> Option<FieldKind> {
        self.fields.get(position).copied()
    }

    #[must_use]
    pub const fn source(&self) -> &RowTypeSource {
        &self.source
    }

    #[must_use]
    pub const fn index(&self) -> Option<&Arc<Index>> {
        match &self.source {
            RowTypeSource::Index(index) => Some(index),
            _ => None,
        }
    }
}

impl Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.fields.len())
    }
}

///
/// Row
///
/// Immutable typed tuple tagged with its row type. Cloning is cheap; the
/// values are shared.
///

#[derive(Clone, Debug, Deref)]
pub struct Row {
    row_type: Arc<RowType>,
    #[deref(forward)]
    values: Arc<[Value]>,
}

impl Row {
    /// Build a row, checking arity and per-field kinds against `row_type`.
    pub fn new(row_type: Arc<RowType>, values: Vec<Value>) -> Result<Self, InternalError> {
        if values.len() != row_type.field_count() {
            return Err(InternalError::new(
                ErrorClass::InvalidArgument,
                ErrorOrigin::Executor,
                format!(
                    "row of type {row_type} expects {} fields, got {}",
                    row_type.field_count(),
                    values.len()
                ),
            ));
        }

        for (position, (value, kind)) in values.iter().zip(row_type.fields()).enumerate() {
            if !value.fits(*kind) {
                return Err(InternalError::new(
                    ErrorClass::InvalidArgument,
                    ErrorOrigin::Executor,
                    format!("field {position} of {row_type} expects {kind}, got {value:?}"),
                ));
            }
        }

        Ok(Self {
            row_type,
            values: values.into(),
        })
    }

    // Wrap values already validated against `row_type` by their producer.
    pub(crate) const fn from_shared(row_type: Arc<RowType>, values: Arc<[Value]>) -> Self {
        Self { row_type, values }
    }

    #[must_use]
    pub const fn row_type(&self) -> &Arc<RowType> {
        &self.row_type
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    /// Whether this row is tagged with `row_type`.
    #[must_use]
    pub fn is_of_type(&self, row_type: &Arc<RowType>) -> bool {
        Arc::ptr_eq(&self.row_type, row_type) || *self.row_type == **row_type
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.is_of_type(&other.row_type) && self.values == other.values
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self
            .values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{}({values})", self.row_type.name)
    }
}
