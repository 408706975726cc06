//! Record aggregate for ActiveRow.
//!
//! This crate is the stateful heart of the engine. It builds on
//! `activerow-core` types and the `activerow-coerce` engine to provide:
//!
//! - [`ValueContainer`]: one column's value, provenance, and extension
//!   payload; immutable-by-replacement so rollback is a container swap.
//! - [`Record`]: the per-row aggregate: sparse container map, the
//!   begin/commit/rollback edit-session state machine, provenance legality
//!   rules, the existence-check cache, and the `save`/`delete` persistence
//!   triggers layered over the [`TableGateway`](activerow_core::TableGateway)
//!   collaborator.
//! - [`RelationCache`] / [`Related`]: lazily-resolved related records with
//!   eviction on authoritative foreign-key change.
//! - [`Projection`] / [`ProjectedRow`]: nested, aliasable, filterable
//!   read-side views (the `toArray` equivalent).
//! - [`Snapshot`]: the serializable image of a record for caching.
//!
//! Records are single-threaded: no internal locking, no suspension points
//! except gateway calls. Callers serialize concurrent access per record.

pub mod container;
pub mod project;
pub mod record;
pub mod related;
pub mod snapshot;

pub use container::ValueContainer;
pub use project::{ColumnSelect, Pick, Projected, ProjectedRow, Projection, Transform};
pub use record::{Member, Record};
pub use related::{Related, RelationCache};
pub use snapshot::Snapshot;
