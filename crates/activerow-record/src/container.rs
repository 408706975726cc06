//! Per-column value containers.
//!
//! A [`ValueContainer`] holds one column's state: the normalized value, the
//! pre-normalization raw input (kept only when normalization was lossy), a
//! has-value flag, and the provenance flag distinguishing storage-sourced
//! values from in-memory edits. The `payload` map is an open extension slot
//! for column-specific side data (e.g. a pending file object).
//!
//! Containers are immutable-by-replacement: every mutation produces a new
//! container which the owning record swaps into its map. Rollback is
//! therefore a cheap container swap, never field-level undo. No container
//! references its owner; containers are freely relocatable.
//!
//! Invariant: `has_value == false` implies both `value` and `raw` are absent.

use std::collections::BTreeMap;

use activerow_coerce::{Coercer, validate_type};
use activerow_core::{ColumnDescriptor, Error, Result, ValidationError, Value};
use serde::{Deserialize, Serialize};

/// One column's value, provenance, and extension payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueContainer {
    raw: Option<Value>,
    value: Option<Value>,
    has_value: bool,
    from_db: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    payload: BTreeMap<String, Value>,
}

impl ValueContainer {
    /// The empty container: no value, no raw input, no provenance.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a container from untrusted input.
    ///
    /// Runs descriptor preprocessing (trim, lowercase, empty-string-to-null),
    /// then validates (type fitness, allowed-values membership, null
    /// legality) and normalizes. Returns `Error::Validation` carrying
    /// symbolic codes on failure.
    pub fn from_input(
        descriptor: &ColumnDescriptor,
        coercer: &Coercer,
        raw: &Value,
        from_db: bool,
    ) -> Result<Self> {
        let preprocessed = preprocess(descriptor, raw);

        if preprocessed.is_null() {
            if !descriptor.nullable {
                return Err(Error::Validation(ValidationError::single(
                    descriptor.name.clone(),
                    vec![activerow_core::ErrorCode::NullNotAllowed],
                )));
            }
            return Ok(Self::validated(Value::Null, None, from_db));
        }

        let mut codes = validate_type(&preprocessed, descriptor.column_type, false);
        let normalized = coercer.normalize(&preprocessed, descriptor.column_type);
        if let Some(allowed) = &descriptor.allowed {
            if !allowed.contains(&normalized) {
                codes.push(activerow_core::ErrorCode::NotInAllowedSet);
            }
        }
        if !codes.is_empty() {
            return Err(Error::Validation(ValidationError::single(
                descriptor.name.clone(),
                codes,
            )));
        }

        // Keep the raw input only when normalization changed it.
        let raw_kept = if normalized == preprocessed {
            None
        } else {
            Some(preprocessed)
        };
        Ok(Self {
            raw: raw_kept,
            value: Some(normalized),
            has_value: true,
            from_db,
            payload: BTreeMap::new(),
        })
    }

    /// Build a container from a known-valid value, bypassing validation
    /// (storage rows, snapshot restore).
    #[must_use]
    pub fn validated(value: Value, raw: Option<Value>, from_db: bool) -> Self {
        Self {
            raw,
            value: Some(value),
            has_value: true,
            from_db,
            payload: BTreeMap::new(),
        }
    }

    /// Replacement container with no value (the `clear` operation).
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::empty()
    }

    /// Whether the container holds a value.
    #[must_use]
    pub const fn has_value(&self) -> bool {
        self.has_value
    }

    /// Whether the held value is storage-sourced (authoritative).
    #[must_use]
    pub const fn is_from_db(&self) -> bool {
        self.from_db
    }

    /// The normalized value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The retained raw input, if normalization was lossy.
    #[must_use]
    pub const fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Replacement container with the provenance flag changed.
    #[must_use]
    pub fn with_from_db(&self, from_db: bool) -> Self {
        let mut next = self.clone();
        next.from_db = from_db;
        next
    }

    /// Replacement container with a payload entry added.
    #[must_use]
    pub fn with_payload(&self, key: impl Into<String>, value: Value) -> Self {
        let mut next = self.clone();
        next.payload.insert(key.into(), value);
        next
    }

    /// Read a payload entry.
    #[must_use]
    pub fn payload(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

fn preprocess(descriptor: &ColumnDescriptor, raw: &Value) -> Value {
    let Value::Text(text) = raw else {
        return raw.clone();
    };
    let mut text = text.clone();
    if descriptor.trim {
        text = text.trim().to_string();
    }
    if descriptor.lowercase {
        text = text.to_lowercase();
    }
    if descriptor.empty_to_null && text.is_empty() {
        return Value::Null;
    }
    Value::Text(text)
}
