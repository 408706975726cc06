//! Shared fixtures for the integration suite: a users/teams schema pair and
//! an in-memory gateway that counts collaborator calls.

use std::collections::HashMap;
use std::sync::Arc;

use activerow::prelude::*;

pub fn users_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::new("users")
            .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
            .with_column(
                ColumnDescriptor::new("login", ColumnType::String)
                    .trim()
                    .lowercase(),
            )
            .with_column(ColumnDescriptor::new("email", ColumnType::Email).nullable())
            .with_column(ColumnDescriptor::new("team_id", ColumnType::Integer).nullable())
            .with_column(ColumnDescriptor::new("signed_up", ColumnType::Timestamp))
            .with_relation(
                RelationDescriptor::new("team", "teams", RelationKind::One, "team_id", "id")
                    .owning(),
            ),
    )
}

pub fn teams_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::new("teams")
            .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
            .with_column(ColumnDescriptor::new("name", ColumnType::String))
            .with_relation(RelationDescriptor::new(
                "members",
                "users",
                RelationKind::Many,
                "id",
                "team_id",
            )),
    )
}

pub fn stored_user(id: i64, team_id: Option<i64>) -> Record {
    let mut row = Row::new();
    row.set("id", Value::Int(id));
    row.set("login", Value::Text(format!("user{id}")));
    row.set("signed_up", Value::Text("2016-09-01 10:00:00".into()));
    if let Some(team) = team_id {
        row.set("team_id", Value::Int(team));
    }
    Record::from_storage_row(users_schema(), row).expect("fixture row loads")
}

/// In-memory table collaborator that records every call.
pub struct MockGateway {
    schemas: HashMap<String, Arc<TableSchema>>,
    /// Rows per table, used to answer `fetch_related`.
    pub rows: HashMap<String, Vec<Row>>,
    /// Primary keys `exists` answers true for.
    pub existing: Vec<Value>,
    pub exists_calls: usize,
    pub fetch_related_calls: usize,
    pub persisted: Vec<(Row, Vec<String>, bool)>,
    pub deleted: Vec<Value>,
    next_key: i64,
}

impl MockGateway {
    pub fn new() -> Self {
        let mut schemas = HashMap::new();
        schemas.insert("users".to_string(), users_schema());
        schemas.insert("teams".to_string(), teams_schema());
        Self {
            schemas,
            rows: HashMap::new(),
            existing: Vec::new(),
            exists_calls: 0,
            fetch_related_calls: 0,
            persisted: Vec::new(),
            deleted: Vec::new(),
            next_key: 100,
        }
    }

    pub fn with_table_rows(mut self, table: &str, rows: Vec<Row>) -> Self {
        self.rows.insert(table.to_string(), rows);
        self
    }
}

impl TableGateway for MockGateway {
    fn exists(&mut self, primary_key: &Value) -> activerow::Result<bool> {
        self.exists_calls += 1;
        Ok(self.existing.contains(primary_key))
    }

    fn fetch_one(
        &mut self,
        conditions: &[(String, Value)],
        _columns: &[String],
    ) -> activerow::Result<Option<Row>> {
        for rows in self.rows.values() {
            for row in rows {
                if conditions
                    .iter()
                    .all(|(column, value)| row.get(column) == Some(value))
                {
                    return Ok(Some(row.clone()));
                }
            }
        }
        Ok(None)
    }

    fn schema_of(&mut self, table: &str) -> activerow::Result<Arc<TableSchema>> {
        self.schemas
            .get(table)
            .cloned()
            .ok_or_else(|| Error::gateway(format!("unknown table {table}")))
    }

    fn fetch_related(
        &mut self,
        relation: &RelationDescriptor,
        local_value: &Value,
        _columns: &[String],
    ) -> activerow::Result<RelatedRows> {
        self.fetch_related_calls += 1;
        let matches: Vec<Row> = self
            .rows
            .get(&relation.target_table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.get(&relation.remote_key) == Some(local_value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(match relation.kind {
            RelationKind::One => RelatedRows::One(matches.into_iter().next()),
            RelationKind::Many => RelatedRows::Many(matches),
        })
    }

    fn persist(
        &mut self,
        row: Row,
        columns: &[String],
        insert: bool,
    ) -> activerow::Result<Option<Value>> {
        self.persisted.push((row, columns.to_vec(), insert));
        if insert {
            self.next_key += 1;
            Ok(Some(Value::Int(self.next_key)))
        } else {
            Ok(None)
        }
    }

    fn delete(&mut self, primary_key: &Value) -> activerow::Result<()> {
        self.deleted.push(primary_key.clone());
        Ok(())
    }
}
