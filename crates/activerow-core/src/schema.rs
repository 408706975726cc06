//! Runtime table schema.
//!
//! [`TableSchema`] is the schema registry the record aggregate consumes:
//! ordered column descriptors, relation descriptors, and the primary-key
//! lookup. It is built at runtime (tables whose shape is not known at compile
//! time) and shared read-only behind an `Arc` by every record of the table.

use crate::column::ColumnDescriptor;
use crate::error::{Error, Result};
use crate::relation::RelationDescriptor;

/// Ordered, read-only description of one table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    table_name: String,
    columns: Vec<ColumnDescriptor>,
    relations: Vec<RelationDescriptor>,
    primary_key: Option<String>,
}

impl TableSchema {
    /// Create an empty schema for the given table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            relations: Vec::new(),
            primary_key: None,
        }
    }

    /// Append a column descriptor. The first descriptor flagged as primary
    /// key becomes the table's primary key.
    #[must_use]
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        if column.primary_key && self.primary_key.is_none() {
            self.primary_key = Some(column.name.clone());
        }
        self.columns.push(column);
        self
    }

    /// Append a relation descriptor.
    #[must_use]
    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.push(relation);
        self
    }

    /// The table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All column descriptors in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// All relation descriptors in declaration order.
    #[must_use]
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// Look up a column, or `None`.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with `UnknownColumn`.
    pub fn column(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.find_column(name)
            .ok_or_else(|| Error::unknown_column(name))
    }

    /// Look up a relation, or `None`.
    #[must_use]
    pub fn find_relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Look up a relation, failing with `UnknownRelation`.
    pub fn relation(&self, name: &str) -> Result<&RelationDescriptor> {
        self.find_relation(name)
            .ok_or_else(|| Error::unknown_relation(name))
    }

    /// Primary-key column name, if the table declares one.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Columns that exist in storage (everything not computed).
    pub fn stored_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.computed)
    }

    /// Columns with no storage backing.
    pub fn computed_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.computed)
    }

    /// Relations whose foreign key is the given local column.
    pub fn relations_on<'a>(
        &'a self,
        local_key: &'a str,
    ) -> impl Iterator<Item = &'a RelationDescriptor> {
        self.relations.iter().filter(move |r| r.local_key == local_key)
    }
}
