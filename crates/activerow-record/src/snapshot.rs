//! Record snapshots.
//!
//! A [`Snapshot`] is the serializable image of a record used for caching and
//! transport: the existence flag plus the ordered `(column, container)` list.
//! Restoring assigns containers directly, bypassing validation; the data is
//! trusted to have been valid when first serialized. Opaque outside this
//! engine; no wire format is promised.

use std::sync::Arc;

use activerow_core::{Result, TableSchema};
use serde::{Deserialize, Serialize};

use crate::container::ValueContainer;
use crate::record::Record;

/// Serializable image of one record's value state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the record held a primary-key value when captured.
    pub exists: bool,
    /// `(column, container)` pairs in descriptor order.
    pub values: Vec<(String, ValueContainer)>,
}

impl Record {
    /// Capture the record's value state. Relations, edit-session state, and
    /// the existence cache are deliberately not part of the image.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let values = self
            .schema()
            .columns()
            .iter()
            .filter_map(|descriptor| {
                self.container_map()
                    .get(&descriptor.name)
                    .map(|container| (descriptor.name.clone(), container.clone()))
            })
            .collect();
        Snapshot {
            exists: self.primary_key_value().is_some(),
            values,
        }
    }

    /// Rebuild a record from a snapshot by direct container assignment,
    /// bypassing validation. Unknown columns surface `UnknownColumn`; the
    /// snapshot must match the schema it was captured against.
    pub fn from_snapshot(schema: Arc<TableSchema>, snapshot: Snapshot) -> Result<Self> {
        let mut record = Record::new(schema);
        for (column, container) in snapshot.values {
            record.schema().column(&column)?;
            record.set_container(column, container);
        }
        Ok(record)
    }
}
