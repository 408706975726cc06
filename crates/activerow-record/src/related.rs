//! Relation cache.
//!
//! Each record owns a one-directional map from relation name to the attached
//! related record (or collection). Related records never hold a back-reference
//! to their holder, so cyclic schemas cannot create reference cycles.
//!
//! The cache also remembers to-one resolutions that found nothing, so a
//! repeated autoload of a missing related row costs no second query. Eviction
//! (on authoritative foreign-key change) clears both forms.

use std::collections::{HashMap, HashSet};

use crate::record::Record;

/// An attached related record or collection, shaped by cardinality.
#[derive(Debug, Clone)]
pub enum Related {
    /// To-one relation: a single related record.
    One(Box<Record>),
    /// To-many relation: a collection of related records.
    Many(Vec<Record>),
}

impl Related {
    /// Cardinality name of the attached data.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Related::One(_) => "one",
            Related::Many(_) => "many",
        }
    }
}

/// Per-record map of resolved relations.
#[derive(Debug, Clone, Default)]
pub struct RelationCache {
    entries: HashMap<String, Related>,
    /// To-one relations that resolved to no row; served from cache as
    /// "not attached" without re-querying.
    misses: HashSet<String>,
}

impl RelationCache {
    /// Whether a relation has attached data.
    #[must_use]
    pub fn is_attached(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether a relation was resolved at all (including empty to-one).
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        self.entries.contains_key(name) || self.misses.contains(name)
    }

    /// Attached data for a relation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Related> {
        self.entries.get(name)
    }

    /// Mutable attached data for a relation.
    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Related> {
        self.entries.get_mut(name)
    }

    /// Attach resolved data, replacing any previous attachment.
    pub fn attach(&mut self, name: impl Into<String>, related: Related) {
        let name = name.into();
        self.misses.remove(&name);
        self.entries.insert(name, related);
    }

    /// Remember that a to-one resolution found nothing.
    pub fn mark_missing(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.entries.remove(&name);
        self.misses.insert(name);
    }

    /// Evict one relation, forcing re-resolution on next access.
    pub fn evict(&mut self, name: &str) -> bool {
        let had_entry = self.entries.remove(name).is_some();
        let had_miss = self.misses.remove(name);
        had_entry || had_miss
    }

    /// Drop every attachment and miss marker.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.misses.clear();
    }
}
