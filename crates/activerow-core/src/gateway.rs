//! Storage collaborator interface.
//!
//! The record value engine performs no SQL generation or execution. Existence
//! checks, relation resolution, and persistence all go through this narrow
//! trait, implemented by the table/query layer above. Calls are blocking from
//! the engine's point of view; an async host wraps each call as a single
//! await point, and the record mutates its in-memory state only after a call
//! returns successfully.

use std::sync::Arc;

use crate::error::Result;
use crate::relation::RelationDescriptor;
use crate::row::Row;
use crate::schema::TableSchema;
use crate::value::Value;

/// Rows returned when resolving a relation, shaped by cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedRows {
    /// To-one resolution: at most one row.
    One(Option<Row>),
    /// To-many resolution: any number of rows.
    Many(Vec<Row>),
}

/// Narrow interface to the table/query collaborator.
///
/// The engine adds no retry or backoff; collaborator failures surface
/// unchanged as `Error::Gateway`.
pub trait TableGateway {
    /// Whether a row with the given primary-key value exists.
    fn exists(&mut self, primary_key: &Value) -> Result<bool>;

    /// Fetch a single row matching all conditions, restricted to `columns`
    /// (empty slice = all non-heavy columns).
    fn fetch_one(
        &mut self,
        conditions: &[(String, Value)],
        columns: &[String],
    ) -> Result<Option<Row>>;

    /// Schema of a table this gateway can resolve relations into. Needed to
    /// build related records during autoload.
    fn schema_of(&mut self, table: &str) -> Result<Arc<TableSchema>>;

    /// Resolve related rows for a relation, given the holder's local-key
    /// value.
    fn fetch_related(
        &mut self,
        relation: &RelationDescriptor,
        local_value: &Value,
        columns: &[String],
    ) -> Result<RelatedRows>;

    /// Persist the given columns of a row. For inserts, returns the new
    /// primary-key value when the storage layer generated one.
    fn persist(&mut self, row: Row, columns: &[String], insert: bool) -> Result<Option<Value>>;

    /// Delete the row with the given primary-key value.
    fn delete(&mut self, primary_key: &Value) -> Result<()>;
}
