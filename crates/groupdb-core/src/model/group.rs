use crate::model::{SchemaError, column::TableName, table::Table};
use std::sync::Arc;

///
/// Group
///
/// A table group: one root table plus every table reachable from it through
/// grouping joins. Rows of a group are physically interleaved in hkey order.
///

#[derive(Clone, Debug)]
pub struct Group {
    name: String,
    tables: Vec<Arc<Table>>,
}

impl Group {
    pub fn new(name: impl Into<String>, root: Arc<Table>) -> Result<Self, SchemaError> {
        if root.parent().is_some() {
            return Err(SchemaError::RootHasParent {
                table: root.name().clone(),
            });
        }

        Ok(Self {
            name: name.into(),
            tables: vec![root],
        })
    }

    /// Add a child table; its parent must already be part of this group.
    pub fn add_table(&mut self, table: Arc<Table>) -> Result<(), SchemaError> {
        if self.table(table.name()).is_some() {
            return Err(SchemaError::DuplicateTable {
                table: table.name().clone(),
            });
        }

        // A second root cannot join an existing group.
        let member = table.parent().and_then(|parent| {
            self.table(parent.name())
                .filter(|member| Arc::ptr_eq(*member, parent) || ***member == **parent)
        });
        if member.is_none() {
            return Err(SchemaError::OrphanTable {
                table: table.name().clone(),
            });
        }

        self.tables.push(table);

        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn root(&self) -> &Arc<Table> {
        &self.tables[0]
    }

    #[must_use]
    pub fn table(&self, name: &TableName) -> Option<&Arc<Table>> {
        self.tables.iter().find(|table| table.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &TableName) -> bool {
        self.table(name).is_some()
    }

    /// Tables in depth-first pre-order, siblings ordered by name.
    #[must_use]
    pub fn tables_depth_first(&self) -> Vec<&Arc<Table>> {
        let mut out = Vec::with_capacity(self.tables.len());
        self.visit(self.root(), &mut out);

        out
    }

    fn visit<'a>(&'a self, table: &'a Arc<Table>, out: &mut Vec<&'a Arc<Table>>) {
        out.push(table);

        let mut children: Vec<&Arc<Table>> = self
            .tables
            .iter()
            .filter(|child| child.parent().is_some_and(|p| p.name() == table.name()))
            .collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));

        for child in children {
            self.visit(child, out);
        }
    }
}
