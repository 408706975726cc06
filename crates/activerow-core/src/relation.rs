//! Relation metadata.
//!
//! Relations are declared on the schema and consumed read-only by the record
//! aggregate: the relation cache keys attached records by relation name, and
//! the storage gateway receives the descriptor when resolving related rows.
//! Related records never hold a back-reference to their holder, so cyclic
//! schemas (Parent ↔ Children) cannot create reference cycles at runtime.

use serde::{Deserialize, Serialize};

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// To-one: a single related record.
    One,
    /// To-many: a collection of related records.
    Many,
}

impl RelationKind {
    /// Lowercase cardinality name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            RelationKind::One => "one",
            RelationKind::Many => "many",
        }
    }
}

/// Metadata about a relation from the holding table to a target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Relation name, unique within the schema.
    pub name: String,
    /// The related table's name.
    pub target_table: String,
    /// Cardinality.
    pub kind: RelationKind,
    /// Foreign-key column on the holding table. Overwriting this column with
    /// an authoritative value invalidates the cached relation.
    pub local_key: String,
    /// Matching column on the target table.
    pub remote_key: String,
    /// Whether the holding side owns the relation (cascade semantics).
    pub owning: bool,
}

impl RelationDescriptor {
    /// Create a relation descriptor.
    pub fn new(
        name: impl Into<String>,
        target_table: impl Into<String>,
        kind: RelationKind,
        local_key: impl Into<String>,
        remote_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_table: target_table.into(),
            kind,
            local_key: local_key.into(),
            remote_key: remote_key.into(),
            owning: false,
        }
    }

    /// Mark the holding side as the owning side.
    #[must_use]
    pub fn owning(mut self) -> Self {
        self.owning = true;
        self
    }
}
