//! Persistence triggers: existence caching, insert/update column sets,
//! provenance promotion after save, cascades, hooks, and delete.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use activerow::prelude::*;
use activerow::ColumnHooks;
use common::{MockGateway, stored_user, users_schema};

#[test]
fn forced_existence_check_is_cached_per_key() {
    let mut gateway = MockGateway::new();
    gateway.existing.push(Value::Int(1));
    let mut user = stored_user(1, None);

    assert!(user.exists_in_db(&mut gateway, true).unwrap());
    assert_eq!(gateway.exists_calls, 1);

    // Same key: zero additional queries.
    assert!(user.exists_in_db(&mut gateway, true).unwrap());
    assert_eq!(gateway.exists_calls, 1);

    // Key change: exactly one more query.
    user.update_value("id", Value::Int(2), true).unwrap();
    assert!(!user.exists_in_db(&mut gateway, true).unwrap());
    assert_eq!(gateway.exists_calls, 2);
}

#[test]
fn unforced_existence_check_never_queries() {
    let mut gateway = MockGateway::new();
    let mut user = stored_user(1, None);
    assert!(user.exists_in_db(&mut gateway, false).unwrap());

    let mut fresh = Record::new(users_schema());
    assert!(!fresh.exists_in_db(&mut gateway, false).unwrap());
    assert_eq!(gateway.exists_calls, 0);
}

#[test]
fn insert_persists_held_columns_and_adopts_generated_key() {
    let mut gateway = MockGateway::new();
    let mut data = Row::new();
    data.set("login", Value::Text("NewUser".into()));
    data.set("email", Value::Text("new@user.cz".into()));
    let mut user = Record::from_input_data(users_schema(), data).unwrap();

    user.save(&mut gateway, &[]).unwrap();

    let (row, columns, insert) = &gateway.persisted[0];
    assert!(insert);
    assert_eq!(columns.len(), 2);
    assert_eq!(row.get("login"), Some(&Value::Text("newuser".into())));

    // Generated key adopted as storage-sourced; saved columns promoted.
    assert_eq!(user.primary_key_value(), Some(Value::Int(101)));
    assert!(user.is_value_from_db("login").unwrap());
    assert!(user.is_value_from_db("email").unwrap());
}

#[test]
fn update_persists_only_dirty_columns() {
    let mut gateway = MockGateway::new();
    let mut user = stored_user(1, None);
    user.update_value("login", Value::Text("Renamed".into()), false)
        .unwrap();

    user.save(&mut gateway, &[]).unwrap();

    let (row, columns, insert) = &gateway.persisted[0];
    assert!(!insert);
    assert_eq!(columns, &vec!["login".to_string()]);
    assert_eq!(row.get("login"), Some(&Value::Text("renamed".into())));
    assert!(user.is_value_from_db("login").unwrap());

    // A second save has nothing dirty left and skips the round-trip.
    user.save(&mut gateway, &[]).unwrap();
    assert_eq!(gateway.persisted.len(), 1);
}

#[test]
fn save_is_blocked_while_collecting() {
    let mut gateway = MockGateway::new();
    let mut user = stored_user(1, None);
    user.begin().unwrap();
    assert!(matches!(
        user.save(&mut gateway, &[]).unwrap_err(),
        Error::IllegalState(IllegalState::EditInProgress)
    ));
    assert!(gateway.persisted.is_empty());
}

#[test]
fn cascade_saves_attached_relations_after_the_holder() {
    let mut gateway = MockGateway::new();
    let mut user = stored_user(1, Some(7));

    let mut team_row = Row::new();
    team_row.set("id", Value::Int(7));
    let mut team = Record::from_storage_row(common::teams_schema(), team_row).unwrap();
    team.update_value("name", Value::Text("Renamed Team".into()), false)
        .unwrap();
    user.attach_related("team", Related::One(Box::new(team)))
        .unwrap();

    user.update_value("login", Value::Text("x".into()), false)
        .unwrap();
    user.save(&mut gateway, &["team"]).unwrap();

    assert_eq!(gateway.persisted.len(), 2);
    let (holder_row, _, _) = &gateway.persisted[0];
    assert!(holder_row.contains("login"));
    let (team_row, _, _) = &gateway.persisted[1];
    assert_eq!(
        team_row.get("name"),
        Some(&Value::Text("Renamed Team".into()))
    );
}

#[test]
fn save_runs_before_save_hooks_for_saved_columns() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    struct Counter;
    impl ColumnHooks for Counter {
        fn before_save(&self, _column: &str, _value: Option<&Value>) -> Result<()> {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let schema = Arc::new(
        TableSchema::new("files")
            .with_column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key())
            .with_column(
                ColumnDescriptor::new("path", ColumnType::String).with_hooks(Arc::new(Counter)),
            ),
    );
    let mut gateway = MockGateway::new();

    let mut data = Row::new();
    data.set("path", Value::Text("/tmp/a".into()));
    let mut record = Record::from_input_data(schema, data).unwrap();
    record.save(&mut gateway, &[]).unwrap();
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn delete_runs_hooks_then_resets() {
    let mut gateway = MockGateway::new();
    let mut user = stored_user(3, None);
    user.delete(&mut gateway).unwrap();
    assert_eq!(gateway.deleted, vec![Value::Int(3)]);
    assert!(user.primary_key_value().is_none());

    let mut fresh = Record::new(users_schema());
    assert!(matches!(
        fresh.delete(&mut gateway).unwrap_err(),
        Error::IllegalState(IllegalState::BadState(_))
    ));
}

#[test]
fn gateway_failures_pass_through_unchanged() {
    struct FailingGateway;
    impl TableGateway for FailingGateway {
        fn exists(&mut self, _pk: &Value) -> Result<bool> {
            Err(Error::gateway("storage unavailable"))
        }
        fn fetch_one(
            &mut self,
            _conditions: &[(String, Value)],
            _columns: &[String],
        ) -> Result<Option<Row>> {
            Err(Error::gateway("storage unavailable"))
        }
        fn schema_of(&mut self, _table: &str) -> Result<Arc<TableSchema>> {
            Err(Error::gateway("storage unavailable"))
        }
        fn fetch_related(
            &mut self,
            _relation: &RelationDescriptor,
            _local: &Value,
            _columns: &[String],
        ) -> Result<RelatedRows> {
            Err(Error::gateway("storage unavailable"))
        }
        fn persist(
            &mut self,
            _row: Row,
            _columns: &[String],
            _insert: bool,
        ) -> Result<Option<Value>> {
            Err(Error::gateway("storage unavailable"))
        }
        fn delete(&mut self, _pk: &Value) -> Result<()> {
            Err(Error::gateway("storage unavailable"))
        }
    }

    let mut gateway = FailingGateway;
    let mut user = stored_user(1, Some(1));
    assert!(matches!(
        user.exists_in_db(&mut gateway, true).unwrap_err(),
        Error::Gateway(_)
    ));
    user.update_value("login", Value::Text("x".into()), false)
        .unwrap();
    assert!(matches!(
        user.save(&mut gateway, &[]).unwrap_err(),
        Error::Gateway(_)
    ));
    // The failed save promoted nothing.
    assert!(!user.is_value_from_db("login").unwrap());
}
