//! Core types and traits for ActiveRow.
//!
//! `activerow-core` is the **foundation layer** for the record value engine.
//! It defines the data model and the collaborator seams that all other crates
//! build on.
//!
//! # Role In The Architecture
//!
//! - **Data model**: [`Value`], [`ColumnType`], and [`Row`] represent the
//!   dynamic values flowing through coercion, containers, and the gateway.
//! - **Schema registry**: [`TableSchema`], [`ColumnDescriptor`], and
//!   [`RelationDescriptor`] are the read-only metadata the record aggregate
//!   consumes; definition of that metadata belongs to the layer above.
//! - **Contract layer**: [`TableGateway`] is the narrow blocking interface to
//!   the table/query collaborator (existence checks, relation resolution,
//!   persistence). The engine owns no SQL.
//! - **Error taxonomy**: [`Error`], [`ValidationError`], and [`IllegalState`]
//!   are shared across every crate.
//!
//! # Who Uses This Crate
//!
//! - `activerow-coerce` normalizes and validates `Value`s per `ColumnType`.
//! - `activerow-record` implements the record aggregate over these types.
//! - Storage layers implement `TableGateway` and exchange `Row`s.
//!
//! Most applications should use the `activerow` facade; reach for
//! `activerow-core` directly when implementing a storage gateway.

pub mod column;
pub mod error;
pub mod gateway;
pub mod relation;
pub mod row;
pub mod schema;
pub mod types;
pub mod value;

pub use column::{AllowedValues, ColumnDescriptor, ColumnHooks, DefaultSource};
pub use error::{
    Error, ErrorCode, FieldValidationError, IllegalState, Result, ValidationError,
};
pub use gateway::{RelatedRows, TableGateway};
pub use relation::{RelationDescriptor, RelationKind};
pub use row::Row;
pub use schema::TableSchema;
pub use types::ColumnType;
pub use value::Value;
