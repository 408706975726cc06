//! ActiveRow: the runtime core of an Active-Record style ORM.
//!
//! Tracks, per database row, which columns have values and where each value
//! came from (storage or in-memory edits), coerces and validates values
//! against declared column types, and supports speculative, rollback-able
//! multi-column edits before anything is persisted.
//!
//! # Architecture
//!
//! - [`activerow_core`]: `Value`, column/relation/schema metadata, the
//!   [`TableGateway`] collaborator trait, and the error taxonomy.
//! - [`activerow_coerce`]: the pure coercion/validation engine:
//!   [`Coercer::normalize`], [`validate_type`], [`format_value`], and the
//!   swappable error-message resolver.
//! - [`activerow_record`]: [`Record`], the per-row aggregate with the
//!   begin/commit/rollback edit protocol, relation cache, projections, and
//!   snapshots.
//!
//! SQL generation and execution, pooling, and schema definition live above
//! this crate and talk to it through the narrow interfaces re-exported here.
//!
//! # Example
//!
//! ```
//! use activerow::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = Arc::new(
//!     TableSchema::new("heroes")
//!         .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
//!         .with_column(ColumnDescriptor::new("name", ColumnType::String).trim()),
//! );
//!
//! let mut row = Row::new();
//! row.set("id", Value::Int(1));
//! row.set("name", Value::Text("Deadpond".into()));
//! let mut hero = Record::from_storage_row(schema, row).unwrap();
//!
//! hero.begin().unwrap();
//! hero.update_value("name", Value::Text("Rusty-Man".into()), false).unwrap();
//! hero.rollback().unwrap();
//! assert_eq!(hero.get_value("name").unwrap(), Value::Text("Deadpond".into()));
//! ```

pub use activerow_coerce::{
    Coercer, DefaultMessages, MessageResolver, describe, format_value, validate_type,
};
pub use activerow_core::{
    AllowedValues, ColumnDescriptor, ColumnHooks, ColumnType, DefaultSource, Error, ErrorCode,
    FieldValidationError, IllegalState, RelatedRows, RelationDescriptor, RelationKind, Result,
    Row, TableGateway, TableSchema, ValidationError, Value,
};
pub use activerow_record::{
    ColumnSelect, Member, Pick, Projected, ProjectedRow, Projection, Record, Related,
    RelationCache, Snapshot, Transform, ValueContainer,
};

/// Convenient glob import for applications.
pub mod prelude {
    pub use crate::{
        Coercer, ColumnDescriptor, ColumnType, Error, ErrorCode, IllegalState, Pick, Projected,
        ProjectedRow, Projection, Record, Related, RelatedRows, RelationDescriptor, RelationKind,
        Result, Row, TableGateway, TableSchema, Value,
    };
}
