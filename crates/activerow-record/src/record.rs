//! The record aggregate.
//!
//! A [`Record`] owns a sparse map of column name -> [`ValueContainer`], the
//! begin/commit/rollback edit-session state machine, the relation cache, and
//! the persistence trigger. It is the single mutation surface for one row's
//! in-memory state.
//!
//! # Design Philosophy
//!
//! - **Provenance first**: every value knows whether it came from storage
//!   (authoritative) or an in-memory edit (speculative); the legality rules
//!   of `update_value` are enforced identically on every call path.
//! - **Containers swap, never mutate**: an edit session backs up whole
//!   containers, so rollback is a map swap with no field-level undo.
//! - **No hidden I/O**: `commit` only closes the session; talking to storage
//!   happens solely in `save`, `delete`, `exists_in_db(force)`, and relation
//!   autoload, all through the [`TableGateway`] collaborator.
//!
//! # Example
//!
//! ```ignore
//! let mut hero = Record::from_storage_row(schema, row)?;
//! hero.begin()?;
//! hero.update_value("name", Value::from("Midnighter"), false)?;
//! hero.rollback()?;                  // name is back to the stored value
//! hero.update_value("name", Value::from("Apollo"), false)?;
//! hero.save(&mut gateway, &[])?;     // persists the dirty column
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use activerow_coerce::{Coercer, format_value, validate_type};
use activerow_core::{
    ColumnDescriptor, Error, FieldValidationError, IllegalState, RelatedRows, RelationKind,
    Result, Row, TableGateway, TableSchema, ValidationError, Value,
};

use crate::container::ValueContainer;
use crate::related::{Related, RelationCache};

/// What a name refers to on the record's accessor surface.
///
/// The surface is a closed enumeration built from the schema: column names,
/// relation names, and `{column}_{format}` aliases for types with named
/// formats. Unknown names are rejected instead of falling back to any kind
/// of reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// A schema column.
    Column(String),
    /// A schema relation.
    Relation(String),
    /// A derived read of a column in one of its named formats.
    FormatAlias {
        /// The underlying column.
        column: String,
        /// The format name.
        format: String,
    },
}

/// One row's tracked in-memory state.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<TableSchema>,
    coercer: Coercer,
    values: HashMap<String, ValueContainer>,
    /// Pre-edit containers, keyed by column; `None` records that the column
    /// had no container before the session touched it.
    backup: HashMap<String, Option<ValueContainer>>,
    collecting: bool,
    pub(crate) related: RelationCache,
    /// Size-1 cache for forced existence checks: (primary key, result).
    exists_cache: Option<(Value, bool)>,
    /// Values removed by `unset_value`, kept until the next write.
    old_values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record for a table.
    #[must_use]
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self::with_coercer(schema, Coercer::new())
    }

    /// Create an empty record with a pinned coercer (tests, replays).
    #[must_use]
    pub fn with_coercer(schema: Arc<TableSchema>, coercer: Coercer) -> Self {
        Self {
            schema,
            coercer,
            values: HashMap::new(),
            backup: HashMap::new(),
            collecting: false,
            related: RelationCache::default(),
            exists_cache: None,
            old_values: HashMap::new(),
        }
    }

    /// Build a record from a trusted storage row. Every supplied value is
    /// marked storage-sourced and bypasses validation.
    pub fn from_storage_row(schema: Arc<TableSchema>, row: Row) -> Result<Self> {
        let mut values = HashMap::new();
        for (name, value) in row {
            schema.column(&name)?;
            values.insert(name, ValueContainer::validated(value, None, true));
        }
        let mut record = Self::new(schema);
        record.values = values;
        Ok(record)
    }

    /// Build a record from untrusted in-memory data. Every value runs the
    /// full coercion/validation path; failures across all columns are
    /// aggregated into one `Error::Validation`.
    pub fn from_input_data(schema: Arc<TableSchema>, data: Row) -> Result<Self> {
        Self::from_input_with(schema, data, Coercer::new())
    }

    /// `from_input_data` with a pinned coercer.
    pub fn from_input_with(schema: Arc<TableSchema>, data: Row, coercer: Coercer) -> Result<Self> {
        let mut values = HashMap::new();
        let mut failures = ValidationError::new();
        for (name, raw) in data {
            let descriptor = schema.column(&name)?;
            match ValueContainer::from_input(descriptor, &coercer, &raw, false) {
                Ok(container) => {
                    values.insert(name, container);
                }
                Err(Error::Validation(v)) => failures.errors.extend(v.errors),
                Err(other) => return Err(other),
            }
        }
        if !failures.is_empty() {
            return Err(Error::Validation(failures));
        }
        let mut record = Self::with_coercer(schema, coercer);
        record.values = values;
        Ok(record)
    }

    /// The table schema this record is bound to.
    #[must_use]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current value of a column: the container's value, else the descriptor
    /// default (provider defaults re-resolved per call), else `Null`.
    pub fn get_value(&self, column: &str) -> Result<Value> {
        let descriptor = self.schema.column(column)?;
        Ok(self.resolve_value(descriptor))
    }

    /// Current value rendered in one of the column type's named formats.
    pub fn get_value_formatted(&self, column: &str, format: &str) -> Result<Value> {
        let descriptor = self.schema.column(column)?;
        let value = self.resolve_value(descriptor);
        format_value(&value, descriptor.column_type, format)
    }

    /// Whether a column holds a value; with `allow_default`, a configured
    /// default source also counts.
    pub fn has_value(&self, column: &str, allow_default: bool) -> Result<bool> {
        let descriptor = self.schema.column(column)?;
        if self
            .values
            .get(column)
            .is_some_and(ValueContainer::has_value)
        {
            return Ok(true);
        }
        Ok(allow_default && descriptor.default.is_some())
    }

    /// Whether a column's current value is storage-sourced.
    pub fn is_value_from_db(&self, column: &str) -> Result<bool> {
        self.schema.column(column)?;
        Ok(self
            .values
            .get(column)
            .is_some_and(|vc| vc.has_value() && vc.is_from_db()))
    }

    /// The primary-key value, when the record holds a non-null one.
    #[must_use]
    pub fn primary_key_value(&self) -> Option<Value> {
        let pk = self.schema.primary_key()?;
        let container = self.values.get(pk)?;
        match container.value() {
            Some(Value::Null) | None => None,
            Some(value) => Some(value.clone()),
        }
    }

    /// The value removed by the last `unset_value` of this column, until the
    /// column is written again.
    #[must_use]
    pub fn old_value(&self, column: &str) -> Option<&Value> {
        self.old_values.get(column)
    }

    /// The column's container, if the column has been touched.
    #[must_use]
    pub fn container(&self, column: &str) -> Option<&ValueContainer> {
        self.values.get(column)
    }

    /// Attach a payload entry to a column's container (the open extension
    /// slot, e.g. a pending file object).
    pub fn set_payload(&mut self, column: &str, key: &str, value: Value) -> Result<()> {
        self.schema.column(column)?;
        let container = self
            .values
            .get(column)
            .cloned()
            .unwrap_or_else(ValueContainer::empty);
        self.values
            .insert(column.to_string(), container.with_payload(key, value));
        Ok(())
    }

    /// Iterate `(column name, resolved value)` over stored columns in
    /// descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.schema
            .stored_columns()
            .map(|descriptor| (descriptor.name.as_str(), self.resolve_value(descriptor)))
    }

    /// Classify a name on the accessor surface.
    pub fn member(&self, name: &str) -> Result<Member> {
        if self.schema.find_column(name).is_some() {
            return Ok(Member::Column(name.to_string()));
        }
        if self.schema.find_relation(name).is_some() {
            return Ok(Member::Relation(name.to_string()));
        }
        for descriptor in self.schema.columns() {
            if let Some(rest) = name.strip_prefix(descriptor.name.as_str()) {
                if let Some(format) = rest.strip_prefix('_') {
                    if descriptor.column_type.supports_format(format) {
                        return Ok(Member::FormatAlias {
                            column: descriptor.name.clone(),
                            format: format.to_string(),
                        });
                    }
                }
            }
        }
        Err(Error::unknown_column(name))
    }

    /// Whether a name exists on the accessor surface.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.member(name).is_ok()
    }

    /// Value read through the accessor surface: a column's value or a format
    /// alias. Relation names are served by `related()`, not here.
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.member(name)? {
            Member::Column(column) => self.get_value(&column),
            Member::FormatAlias { column, format } => self.get_value_formatted(&column, &format),
            Member::Relation(relation) => Err(IllegalState::BadState(format!(
                "{relation} is a relation; read it through related()"
            ))
            .into()),
        }
    }

    /// Speculative write through the accessor surface (columns only).
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self.member(name)? {
            Member::Column(column) => self.update_value(&column, value, false),
            Member::Relation(relation) => Err(IllegalState::BadState(format!(
                "{relation} is a relation; attach it through attach_related()"
            ))
            .into()),
            Member::FormatAlias { column, format } => Err(IllegalState::BadState(format!(
                "{column}_{format} is a derived read; write the column instead"
            ))
            .into()),
        }
    }

    pub(crate) fn resolve_value(&self, descriptor: &ColumnDescriptor) -> Value {
        if let Some(container) = self.values.get(&descriptor.name) {
            if container.has_value() {
                return container.value().cloned().unwrap_or(Value::Null);
            }
        }
        descriptor.resolve_default().map_or(Value::Null, |raw| {
            self.coercer.normalize(&raw, descriptor.column_type)
        })
    }

    pub(crate) fn container_value(&self, column: &str) -> Option<&Value> {
        self.values.get(column).and_then(ValueContainer::value)
    }

    pub(crate) fn container_map(&self) -> &HashMap<String, ValueContainer> {
        &self.values
    }

    pub(crate) fn set_container(&mut self, column: String, container: ValueContainer) {
        self.values.insert(column, container);
    }

    fn has_stored_primary_key(&self) -> bool {
        self.schema.primary_key().is_some_and(|pk| {
            self.values.get(pk).is_some_and(|container| {
                container.is_from_db()
                    && matches!(container.value(), Some(value) if !value.is_null())
            })
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Write one column, enforcing the provenance legality rules:
    ///
    /// - storage-sourced writes are forbidden inside an edit session;
    /// - the primary key only ever accepts storage-sourced values;
    /// - storage-sourced non-key writes require a storage-sourced primary key.
    ///
    /// Inside an edit session the first write to a column backs up its
    /// pre-edit container. An authoritative overwrite of a foreign key with a
    /// different value evicts the relations keyed on it; speculative writes
    /// never evict.
    #[tracing::instrument(level = "debug", skip(self, value))]
    pub fn update_value(&mut self, column: &str, value: Value, from_db: bool) -> Result<()> {
        let descriptor = self.schema.column(column)?.clone();

        if self.collecting && from_db {
            return Err(IllegalState::ForbiddenDuringEdit.into());
        }
        if descriptor.primary_key && !from_db {
            return Err(IllegalState::PrimaryKeyRequiresStorage.into());
        }
        if !descriptor.primary_key && from_db && !self.has_stored_primary_key() {
            return Err(IllegalState::RecordMustExistFirst.into());
        }

        let container = if from_db {
            ValueContainer::validated(value, None, true)
        } else {
            ValueContainer::from_input(&descriptor, &self.coercer, &value, false)?
        };

        if from_db && self.container_value(column) != container.value() {
            let stale: Vec<String> = self
                .schema
                .relations_on(column)
                .map(|relation| relation.name.clone())
                .collect();
            for name in stale {
                if self.related.evict(&name) {
                    tracing::debug!(
                        relation = %name,
                        column,
                        "evicted cached relation after authoritative foreign key change"
                    );
                }
            }
        }

        if self.collecting && !self.backup.contains_key(column) {
            self.backup
                .insert(column.to_string(), self.values.get(column).cloned());
        }
        self.old_values.remove(column);
        self.values.insert(column.to_string(), container);
        Ok(())
    }

    /// Apply writes in entry order. The first failure aborts the call and
    /// surfaces; entries applied before it remain applied.
    pub fn update_values<I>(&mut self, entries: I, from_db: bool) -> Result<()>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (column, value) in entries {
            self.update_value(&column, value, from_db)?;
        }
        Ok(())
    }

    /// Remove a column's container. A previously-held value stays readable
    /// through `old_value` until the column is written again.
    pub fn unset_value(&mut self, column: &str) -> Result<()> {
        self.schema.column(column)?;
        if self.collecting && !self.backup.contains_key(column) {
            self.backup
                .insert(column.to_string(), self.values.get(column).cloned());
        }
        if let Some(container) = self.values.remove(column) {
            if let Some(value) = container.value() {
                self.old_values.insert(column.to_string(), value.clone());
            }
        }
        Ok(())
    }

    // ========================================================================
    // Edit protocol
    // ========================================================================

    /// Whether an edit session is open.
    #[must_use]
    pub const fn is_collecting_updates(&self) -> bool {
        self.collecting
    }

    /// Columns touched by the open edit session.
    pub fn edited_columns(&self) -> impl Iterator<Item = &str> {
        self.backup.keys().map(String::as_str)
    }

    /// Open an edit session. Only meaningful for a row that exists: fails
    /// `NotPersisted` without a storage-sourced primary key, and
    /// `AlreadyCollecting` when a session is open.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn begin(&mut self) -> Result<()> {
        if self.collecting {
            return Err(IllegalState::AlreadyCollecting.into());
        }
        if !self.has_stored_primary_key() {
            return Err(IllegalState::NotPersisted.into());
        }
        self.collecting = true;
        tracing::debug!(table = self.schema.table_name(), "opened edit session");
        Ok(())
    }

    /// Close the session keeping staged values as the new truth. Performs no
    /// I/O; persisting is `save`'s job.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn commit(&mut self) -> Result<()> {
        if !self.collecting {
            return Err(IllegalState::NotCollecting.into());
        }
        let staged = self.backup.len();
        self.backup.clear();
        self.collecting = false;
        tracing::debug!(
            table = self.schema.table_name(),
            columns = staged,
            "committed edit session"
        );
        Ok(())
    }

    /// Close the session restoring every touched column to its pre-edit
    /// container (or its pre-edit absence).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn rollback(&mut self) -> Result<()> {
        if !self.collecting {
            return Err(IllegalState::NotCollecting.into());
        }
        for (column, previous) in self.backup.drain() {
            match previous {
                Some(container) => {
                    self.values.insert(column, container);
                }
                None => {
                    self.values.remove(&column);
                }
            }
        }
        self.collecting = false;
        tracing::debug!(table = self.schema.table_name(), "rolled back edit session");
        Ok(())
    }

    /// Return the record to its newly-constructed shape. Fails while an edit
    /// session is open.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> Result<()> {
        if self.collecting {
            return Err(IllegalState::EditInProgress.into());
        }
        self.values.clear();
        self.backup.clear();
        self.related.clear();
        self.old_values.clear();
        self.exists_cache = None;
        Ok(())
    }

    // ========================================================================
    // Storage-facing operations
    // ========================================================================

    /// Whether the record exists in storage.
    ///
    /// Without `force` this is a pure check: true iff the primary key holds a
    /// value from any source. With `force`, one existence query per distinct
    /// primary-key value, memoized in a size-1 cache.
    pub fn exists_in_db(&mut self, gateway: &mut dyn TableGateway, force: bool) -> Result<bool> {
        let Some(primary_key) = self.primary_key_value() else {
            return Ok(false);
        };
        if !force {
            return Ok(true);
        }
        if let Some((cached, result)) = &self.exists_cache {
            if *cached == primary_key {
                return Ok(*result);
            }
        }
        let result = gateway.exists(&primary_key)?;
        self.exists_cache = Some((primary_key, result));
        Ok(result)
    }

    /// Persist the record: validate, run per-column save hooks, write the
    /// dirty columns (every held column on insert), adopt a generated primary
    /// key, mark saved columns authoritative, then cascade-save the named
    /// attached relations. Collaborator failures pass through unchanged.
    #[tracing::instrument(level = "debug", skip(self, gateway))]
    pub fn save(&mut self, gateway: &mut dyn TableGateway, cascade: &[&str]) -> Result<()> {
        if self.collecting {
            return Err(IllegalState::EditInProgress.into());
        }

        let insert = !self.has_stored_primary_key();
        let mut row = Row::new();
        let mut columns: Vec<String> = Vec::new();
        let mut failures = ValidationError::new();
        for descriptor in self.schema.stored_columns() {
            let Some(container) = self.values.get(&descriptor.name) else {
                continue;
            };
            if !container.has_value() {
                continue;
            }
            if !insert && container.is_from_db() {
                continue;
            }
            let value = container.value().cloned().unwrap_or(Value::Null);
            let codes = validate_type(&value, descriptor.column_type, false);
            if codes.is_empty() {
                row.set(descriptor.name.clone(), value);
                columns.push(descriptor.name.clone());
            } else {
                failures.push(FieldValidationError::new(descriptor.name.clone(), codes));
            }
        }
        if !failures.is_empty() {
            return Err(Error::Validation(failures));
        }

        // An update with nothing dirty skips the storage round-trip entirely;
        // cascades below still run.
        if insert || !columns.is_empty() {
            for descriptor in self.schema.stored_columns() {
                if let Some(hooks) = &descriptor.hooks {
                    if columns.contains(&descriptor.name) {
                        hooks
                            .before_save(&descriptor.name, self.container_value(&descriptor.name))?;
                    }
                }
            }

            let generated_key = gateway.persist(row, &columns, insert)?;

            if insert {
                if let (Some(pk), Some(value)) = (
                    self.schema.primary_key().map(str::to_string),
                    generated_key,
                ) {
                    self.values
                        .insert(pk, ValueContainer::validated(value, None, true));
                }
            }
            for column in &columns {
                if let Some(container) = self.values.get(column) {
                    let promoted = container.with_from_db(true);
                    self.values.insert(column.clone(), promoted);
                }
            }
            tracing::info!(
                table = self.schema.table_name(),
                insert,
                columns = columns.len(),
                "record persisted"
            );
        }

        for name in cascade {
            self.schema.relation(name)?;
            let Some(related) = self.related.get_mut(name) else {
                continue;
            };
            match related {
                Related::One(record) => record.save(gateway, &[])?,
                Related::Many(records) => {
                    for record in records {
                        record.save(gateway, &[])?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Delete the record's row: per-column delete hooks, gateway delete by
    /// primary key, then reset to the empty shape.
    #[tracing::instrument(level = "debug", skip(self, gateway))]
    pub fn delete(&mut self, gateway: &mut dyn TableGateway) -> Result<()> {
        if self.collecting {
            return Err(IllegalState::EditInProgress.into());
        }
        let Some(primary_key) = self.primary_key_value() else {
            return Err(
                IllegalState::BadState("record has no primary key value to delete".into()).into(),
            );
        };
        for descriptor in self.schema.stored_columns() {
            if let Some(hooks) = &descriptor.hooks {
                hooks.before_delete(&descriptor.name, self.container_value(&descriptor.name))?;
            }
        }
        gateway.delete(&primary_key)?;
        tracing::info!(table = self.schema.table_name(), "record deleted");
        self.reset()
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Whether a relation currently has attached data.
    #[must_use]
    pub fn is_related_attached(&self, name: &str) -> bool {
        self.related.is_attached(name)
    }

    /// The attached related record(s). Fails `RelatedNotAttached` when the
    /// relation has not been resolved or attached.
    pub fn related(&self, name: &str) -> Result<&Related> {
        self.schema.relation(name)?;
        self.related
            .get(name)
            .ok_or_else(|| Error::RelatedNotAttached(name.to_string()))
    }

    /// The attached related record(s), resolving through the gateway on first
    /// access. One query per distinct relation per record; repeated calls are
    /// served from cache, including remembered empty to-one resolutions.
    pub fn related_autoload(
        &mut self,
        name: &str,
        gateway: &mut dyn TableGateway,
    ) -> Result<&Related> {
        let relation = self.schema.relation(name)?.clone();
        if self.related.is_resolved(name) {
            return self
                .related
                .get(name)
                .ok_or_else(|| Error::RelatedNotAttached(name.to_string()));
        }

        let local = match self.container_value(&relation.local_key) {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                return Err(IllegalState::BadState(format!(
                    "column {} holds no value to resolve relation {name}",
                    relation.local_key
                ))
                .into());
            }
        };

        let rows = gateway.fetch_related(&relation, &local, &[])?;
        let target = gateway.schema_of(&relation.target_table)?;
        match (relation.kind, rows) {
            (RelationKind::One, RelatedRows::One(Some(row))) => {
                let record = Record::from_storage_row(target, row)?;
                self.related.attach(name, Related::One(Box::new(record)));
            }
            (RelationKind::One, RelatedRows::One(None)) => {
                self.related.mark_missing(name);
                return Err(Error::RelatedNotAttached(name.to_string()));
            }
            (RelationKind::Many, RelatedRows::Many(rows)) => {
                let mut records = Vec::with_capacity(rows.len());
                for row in rows {
                    records.push(Record::from_storage_row(Arc::clone(&target), row)?);
                }
                self.related.attach(name, Related::Many(records));
            }
            (kind, _) => {
                return Err(Error::RelationCardinality {
                    relation: name.to_string(),
                    expected: kind.name(),
                });
            }
        }
        tracing::debug!(relation = name, "resolved and attached related records");
        self.related
            .get(name)
            .ok_or_else(|| Error::RelatedNotAttached(name.to_string()))
    }

    /// Attach already-built related records, validating cardinality against
    /// the relation descriptor.
    pub fn attach_related(&mut self, name: &str, data: Related) -> Result<()> {
        let relation = self.schema.relation(name)?;
        let fits = matches!(
            (relation.kind, &data),
            (RelationKind::One, Related::One(_)) | (RelationKind::Many, Related::Many(_))
        );
        if !fits {
            return Err(Error::RelationCardinality {
                relation: name.to_string(),
                expected: relation.kind.name(),
            });
        }
        self.related.attach(name, data);
        Ok(())
    }

    /// Attach related data from raw rows, building records against the target
    /// schema. `from_db` decides whether the rows are trusted storage data or
    /// untrusted input to validate.
    pub fn attach_related_rows(
        &mut self,
        name: &str,
        rows: RelatedRows,
        target: Arc<TableSchema>,
        from_db: bool,
    ) -> Result<()> {
        let relation = self.schema.relation(name)?.clone();
        let build = |row: Row| -> Result<Record> {
            if from_db {
                Record::from_storage_row(Arc::clone(&target), row)
            } else {
                Record::from_input_data(Arc::clone(&target), row)
            }
        };
        match (relation.kind, rows) {
            (RelationKind::One, RelatedRows::One(Some(row))) => {
                let record = build(row)?;
                self.related.attach(name, Related::One(Box::new(record)));
            }
            (RelationKind::One, RelatedRows::One(None)) => {
                self.related.mark_missing(name);
            }
            (RelationKind::Many, RelatedRows::Many(rows)) => {
                let mut records = Vec::with_capacity(rows.len());
                for row in rows {
                    records.push(build(row)?);
                }
                self.related.attach(name, Related::Many(records));
            }
            (kind, _) => {
                return Err(Error::RelationCardinality {
                    relation: name.to_string(),
                    expected: kind.name(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activerow_core::{ColumnType, ErrorCode, RelationDescriptor};

    fn schema() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new("users")
                .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
                .with_column(ColumnDescriptor::new("login", ColumnType::String).trim().lowercase())
                .with_column(ColumnDescriptor::new("email", ColumnType::Email).nullable())
                .with_column(ColumnDescriptor::new("team_id", ColumnType::Integer).nullable())
                .with_column(
                    ColumnDescriptor::new("note", ColumnType::String).with_default("n/a"),
                )
                .with_relation(RelationDescriptor::new(
                    "team",
                    "teams",
                    RelationKind::One,
                    "team_id",
                    "id",
                )),
        )
    }

    fn stored_user() -> Record {
        let mut row = Row::new();
        row.set("id", Value::Int(1));
        row.set("login", Value::Text("admin".into()));
        row.set("team_id", Value::Int(1));
        Record::from_storage_row(schema(), row).expect("storage row loads")
    }

    fn team_record() -> Related {
        let team_schema = Arc::new(
            TableSchema::new("teams")
                .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key()),
        );
        let mut row = Row::new();
        row.set("id", Value::Int(1));
        Related::One(Box::new(
            Record::from_storage_row(team_schema, row).expect("team row loads"),
        ))
    }

    #[test]
    fn test_from_storage_row_marks_provenance() {
        let user = stored_user();
        assert!(user.is_value_from_db("login").unwrap());
        assert_eq!(user.get_value("login").unwrap(), Value::Text("admin".into()));
        assert_eq!(user.primary_key_value(), Some(Value::Int(1)));
    }

    #[test]
    fn test_from_storage_row_rejects_unknown_column() {
        let mut row = Row::new();
        row.set("ghost", Value::Int(1));
        let err = Record::from_storage_row(schema(), row).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(name) if name == "ghost"));
    }

    #[test]
    fn test_from_input_aggregates_validation_failures() {
        let mut data = Row::new();
        data.set("email", Value::Text("not-an-email".into()));
        data.set("team_id", Value::Text("1a".into()));
        let err = Record::from_input_data(schema(), data).unwrap_err();
        let Error::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert_eq!(v.codes_for("email"), vec![ErrorCode::NotEmail]);
        assert_eq!(v.codes_for("team_id"), vec![ErrorCode::NotInteger]);
    }

    #[test]
    fn test_default_fallback_resolves_per_read() {
        let user = Record::new(schema());
        assert_eq!(user.get_value("note").unwrap(), Value::Text("n/a".into()));
        assert!(!user.has_value("note", false).unwrap());
        assert!(user.has_value("note", true).unwrap());
    }

    #[test]
    fn test_begin_requires_stored_primary_key() {
        let mut fresh = Record::new(schema());
        assert!(matches!(
            fresh.begin().unwrap_err(),
            Error::IllegalState(IllegalState::NotPersisted)
        ));

        let mut user = stored_user();
        user.begin().unwrap();
        assert!(matches!(
            user.begin().unwrap_err(),
            Error::IllegalState(IllegalState::AlreadyCollecting)
        ));
    }

    #[test]
    fn test_storage_writes_forbidden_while_collecting() {
        let mut user = stored_user();
        user.begin().unwrap();
        assert!(matches!(
            user.update_value("login", Value::Text("x".into()), true)
                .unwrap_err(),
            Error::IllegalState(IllegalState::ForbiddenDuringEdit)
        ));
    }

    #[test]
    fn test_primary_key_requires_storage_provenance() {
        let mut user = stored_user();
        assert!(matches!(
            user.update_value("id", Value::Int(9), false).unwrap_err(),
            Error::IllegalState(IllegalState::PrimaryKeyRequiresStorage)
        ));
    }

    #[test]
    fn test_storage_write_requires_existing_record() {
        let mut fresh = Record::new(schema());
        assert!(matches!(
            fresh
                .update_value("login", Value::Text("x".into()), true)
                .unwrap_err(),
            Error::IllegalState(IllegalState::RecordMustExistFirst)
        ));
        // Speculative writes are fine on a fresh record.
        fresh
            .update_value("login", Value::Text("x".into()), false)
            .unwrap();
    }

    #[test]
    fn test_rollback_restores_pre_edit_containers_exactly() {
        let mut user = stored_user();
        user.update_value("email", Value::Text("a@b.cz".into()), false)
            .unwrap();
        user.begin().unwrap();
        user.update_value("login", Value::Text("Other".into()), false)
            .unwrap();
        user.update_value("email", Value::Text("c@d.cz".into()), false)
            .unwrap();
        user.rollback().unwrap();

        assert_eq!(user.get_value("login").unwrap(), Value::Text("admin".into()));
        assert_eq!(user.get_value("email").unwrap(), Value::Text("a@b.cz".into()));
        assert!(user.is_value_from_db("login").unwrap());
        assert!(!user.is_collecting_updates());
        assert_eq!(user.edited_columns().count(), 0);
    }

    #[test]
    fn test_rollback_restores_pre_edit_absence() {
        let mut user = stored_user();
        user.begin().unwrap();
        user.update_value("email", Value::Text("a@b.cz".into()), false)
            .unwrap();
        user.rollback().unwrap();
        assert!(!user.has_value("email", false).unwrap());
    }

    #[test]
    fn test_commit_keeps_staged_values() {
        let mut user = stored_user();
        user.begin().unwrap();
        user.update_value("login", Value::Text("Other".into()), false)
            .unwrap();
        user.commit().unwrap();
        assert_eq!(user.get_value("login").unwrap(), Value::Text("other".into()));
        assert!(!user.is_value_from_db("login").unwrap());
        assert!(matches!(
            user.commit().unwrap_err(),
            Error::IllegalState(IllegalState::NotCollecting)
        ));
        assert!(matches!(
            user.rollback().unwrap_err(),
            Error::IllegalState(IllegalState::NotCollecting)
        ));
    }

    #[test]
    fn test_reset_blocked_while_collecting() {
        let mut user = stored_user();
        user.begin().unwrap();
        assert!(matches!(
            user.reset().unwrap_err(),
            Error::IllegalState(IllegalState::EditInProgress)
        ));
        user.rollback().unwrap();
        user.reset().unwrap();
        assert!(user.primary_key_value().is_none());
        assert!(!user.has_value("login", false).unwrap());
    }

    #[test]
    fn test_unset_value_keeps_old_value_until_next_write() {
        let mut user = stored_user();
        user.unset_value("login").unwrap();
        assert!(!user.has_value("login", false).unwrap());
        assert_eq!(user.old_value("login"), Some(&Value::Text("admin".into())));

        user.update_value("login", Value::Text("next".into()), false)
            .unwrap();
        assert!(user.old_value("login").is_none());
    }

    #[test]
    fn test_speculative_write_preprocesses_and_validates() {
        let mut user = stored_user();
        user.update_value("login", Value::Text("  MiXeD ".into()), false)
            .unwrap();
        assert_eq!(user.get_value("login").unwrap(), Value::Text("mixed".into()));

        let err = user
            .update_value("email", Value::Text("broken@@x".into()), false)
            .unwrap_err();
        assert!(err.is_validation());
        // Failed write leaves the previous state untouched.
        assert!(!user.has_value("email", false).unwrap());
    }

    #[test]
    fn test_bulk_update_partial_failure_keeps_earlier_entries() {
        let mut user = stored_user();
        let entries = vec![
            ("login".to_string(), Value::Text("first".into())),
            ("email".to_string(), Value::Text("bad-email".into())),
            ("note".to_string(), Value::Text("never applied".into())),
        ];
        let err = user.update_values(entries, false).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(user.get_value("login").unwrap(), Value::Text("first".into()));
        assert!(!user.has_value("email", false).unwrap());
        // The entry after the failure never ran; the default shows through.
        assert_eq!(user.get_value("note").unwrap(), Value::Text("n/a".into()));
    }

    #[test]
    fn test_fk_invalidation_only_on_authoritative_change() {
        let mut user = stored_user();
        user.attach_related("team", team_record()).unwrap();
        assert!(user.is_related_attached("team"));

        // Speculative write: cache untouched.
        user.update_value("team_id", Value::Int(2), false).unwrap();
        assert!(user.is_related_attached("team"));

        // Authoritative write with the same value as current: still cached.
        user.update_value("team_id", Value::Int(2), true).unwrap();
        assert!(user.is_related_attached("team"));

        // Authoritative change: evicted.
        user.update_value("team_id", Value::Int(3), true).unwrap();
        assert!(!user.is_related_attached("team"));
    }

    #[test]
    fn test_attach_related_validates_cardinality() {
        let mut user = stored_user();
        let err = user
            .attach_related("team", Related::Many(Vec::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RelationCardinality { relation, expected }
                if relation == "team" && expected == "one"
        ));
        assert!(matches!(
            user.attach_related("ghost", team_record()).unwrap_err(),
            Error::UnknownRelation(_)
        ));
    }

    #[test]
    fn test_related_requires_attachment() {
        let user = stored_user();
        assert!(matches!(
            user.related("team").unwrap_err(),
            Error::RelatedNotAttached(_)
        ));
    }

    #[test]
    fn test_iteration_follows_descriptor_order() {
        let user = stored_user();
        let names: Vec<_> = user.iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["id", "login", "email", "team_id", "note"]);
    }

    #[test]
    fn test_accessor_surface_is_a_closed_enumeration() {
        let mut user = stored_user();
        assert!(user.has("login"));
        assert!(user.has("team"));
        assert!(!user.has("nonsense"));
        assert_eq!(user.get("login").unwrap(), Value::Text("admin".into()));
        assert!(matches!(
            user.get("nonsense").unwrap_err(),
            Error::UnknownColumn(_)
        ));
        user.set("login", Value::Text("via-set".into())).unwrap();
        assert_eq!(user.get_value("login").unwrap(), Value::Text("via-set".into()));
    }

    #[test]
    fn test_format_alias_member() {
        let schema = Arc::new(
            TableSchema::new("events")
                .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
                .with_column(ColumnDescriptor::new("created_at", ColumnType::Timestamp)),
        );
        let mut row = Row::new();
        row.set("id", Value::Int(1));
        row.set("created_at", Value::Text("2016-09-01 10:30:00".into()));
        let event = Record::from_storage_row(schema, row).unwrap();

        assert_eq!(
            event.member("created_at_unix_ts").unwrap(),
            Member::FormatAlias {
                column: "created_at".into(),
                format: "unix_ts".into()
            }
        );
        assert_eq!(
            event.get("created_at_date").unwrap(),
            Value::Text("2016-09-01".into())
        );
        assert!(!event.has("created_at_week"));
    }

    #[test]
    fn test_payload_slot_round_trip() {
        let mut user = stored_user();
        user.set_payload("login", "pending_file", Value::Text("upload-3".into()))
            .unwrap();
        assert_eq!(
            user.container("login").unwrap().payload("pending_file"),
            Some(&Value::Text("upload-3".into()))
        );
    }
}
