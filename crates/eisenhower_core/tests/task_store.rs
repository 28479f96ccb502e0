use chrono::NaiveDate;
use eisenhower_core::{
    Level, Recovery, SqliteTaskStore, StoreError, TagSet, Task, TaskRepository,
    TaskValidationError,
};
use rusqlite::{params_from_iter, Connection};
use tempfile::TempDir;

fn scratch_store() -> (TempDir, SqliteTaskStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteTaskStore::new(dir.path().join("tasks.sqlite3"));
    (dir, store)
}

fn sample_task(title: &str) -> Task {
    let mut task = Task::new(title);
    task.description = Some("details".to_string());
    task.importance = Level::High;
    task.urgency = Level::Low;
    task.due_date = NaiveDate::from_ymd_opt(2024, 1, 13);
    task.tags = ["Work", "q1"].into_iter().collect();
    task.touch();
    task
}

#[test]
fn ensure_initialized_creates_file_and_is_idempotent() {
    let (dir, store) = scratch_store();

    let first = store.ensure_initialized().unwrap();
    let second = store.ensure_initialized().unwrap();

    assert_eq!(first, dir.path().join("tasks.sqlite3"));
    assert_eq!(first, second);
    assert!(first.exists());
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn ensure_initialized_reports_unavailable_destination() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = SqliteTaskStore::new(blocker.join("tasks.sqlite3"));

    let err = store.ensure_initialized().unwrap_err();
    match err {
        StoreError::Unavailable { path, .. } => {
            assert_eq!(path, blocker.join("tasks.sqlite3"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn upsert_then_load_all_round_trips_every_field() {
    let (_dir, store) = scratch_store();
    let task = sample_task("Quarterly plan");

    store.upsert(&task).unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded, vec![task]);
}

#[test]
fn round_trip_keeps_absent_optionals_absent() {
    let (_dir, store) = scratch_store();
    let task = Task::new("Bare");

    store.upsert(&task).unwrap();

    let loaded = store.get(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);
    assert_eq!(loaded.updated_at, None);
    assert_eq!(loaded.due_date, None);
}

#[test]
fn upsert_is_a_full_replace() {
    let (_dir, store) = scratch_store();
    let mut task = sample_task("Replace me");
    task.tags = ["a", "b", "c"].into_iter().collect();
    store.upsert(&task).unwrap();

    task.title = "Replaced".to_string();
    task.description = None;
    task.due_date = None;
    task.tags = ["b"].into_iter().collect();
    store.upsert(&task).unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    let expected: TagSet = ["b"].into_iter().collect();
    assert_eq!(loaded[0].tags, expected);
    assert_eq!(loaded[0].title, "Replaced");
    assert_eq!(loaded[0].description, None);
    assert_eq!(loaded[0].due_date, None);
}

#[test]
fn upsert_rejects_invalid_task_before_writing() {
    let (_dir, store) = scratch_store();
    let task = Task::new("  ");

    let err = store.upsert(&task).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(TaskValidationError::EmptyTitle)
    ));
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn delete_is_idempotent() {
    let (_dir, store) = scratch_store();
    let keep = Task::new("keep");
    let drop_me = Task::new("drop");
    store.upsert(&keep).unwrap();
    store.upsert(&drop_me).unwrap();

    store.delete(drop_me.id).unwrap();
    let after_first = store.load_all().unwrap();
    store.delete(drop_me.id).unwrap();
    let after_second = store.load_all().unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second, vec![keep]);
}

#[test]
fn malformed_tags_load_as_empty_set() {
    let (_dir, store) = scratch_store();
    let task = sample_task("Broken tags");
    store.upsert(&task).unwrap();
    raw_execute(
        &store,
        "UPDATE tasks SET tags = ?1 WHERE id = ?2;",
        &["{not json", &task.id.to_string()],
    );

    let outcome = store.load_all_detailed().unwrap();
    assert_eq!(outcome.tasks.len(), 1);
    assert!(outcome.tasks[0].tags.is_empty());
    assert_eq!(outcome.malformed.len(), 1);
    assert_eq!(outcome.malformed[0].column, "tags");
    assert_eq!(outcome.malformed[0].recovery, Recovery::EmptyTags);
}

#[test]
fn one_bad_row_does_not_fail_the_whole_load() {
    let (_dir, store) = scratch_store();
    let good = Task::new("good");
    let bad = Task::new("bad");
    store.upsert(&good).unwrap();
    store.upsert(&bad).unwrap();
    raw_execute(
        &store,
        "UPDATE tasks SET importance = ?1 WHERE id = ?2;",
        &["critical", &bad.id.to_string()],
    );

    let outcome = store.load_all_detailed().unwrap();
    assert_eq!(outcome.tasks, vec![good]);
    assert_eq!(outcome.malformed.len(), 1);
    assert_eq!(outcome.malformed[0].row_id, bad.id.to_string());
    assert_eq!(outcome.malformed[0].column, "importance");
    assert_eq!(outcome.malformed[0].recovery, Recovery::Skipped);
}

#[test]
fn undecodable_tag_bytes_load_as_empty_set() {
    let (_dir, store) = scratch_store();
    let invalid_utf8 = sample_task("invalid utf-8 tags");
    let blob = sample_task("blob tags");
    store.upsert(&invalid_utf8).unwrap();
    store.upsert(&blob).unwrap();
    raw_execute(
        &store,
        "UPDATE tasks SET tags = CAST(X'5BFF5D' AS TEXT) WHERE id = ?1;",
        &[&invalid_utf8.id.to_string()],
    );
    raw_execute(
        &store,
        "UPDATE tasks SET tags = X'00' WHERE id = ?1;",
        &[&blob.id.to_string()],
    );

    let outcome = store.load_all_detailed().unwrap();
    assert_eq!(outcome.tasks.len(), 2);
    assert!(outcome.tasks.iter().all(|task| task.tags.is_empty()));
    assert_eq!(outcome.tasks[0].title, "invalid utf-8 tags");
    assert_eq!(outcome.malformed.len(), 2);
    assert!(outcome
        .malformed
        .iter()
        .all(|record| record.column == "tags" && record.recovery == Recovery::EmptyTags));
    assert_eq!(store.load_all().unwrap().len(), 2);
}

#[test]
fn undecodable_title_skips_only_that_row() {
    let (_dir, store) = scratch_store();
    let good = Task::new("good");
    let bad = Task::new("bad");
    store.upsert(&good).unwrap();
    store.upsert(&bad).unwrap();
    raw_execute(
        &store,
        "UPDATE tasks SET title = CAST(X'FF' AS TEXT), due_date = X'01' WHERE id = ?1;",
        &[&bad.id.to_string()],
    );

    let outcome = store.load_all_detailed().unwrap();
    assert_eq!(outcome.tasks, vec![good]);
    assert_eq!(outcome.malformed.len(), 1);
    assert_eq!(outcome.malformed[0].row_id, bad.id.to_string());
    assert_eq!(outcome.malformed[0].column, "title");
    assert_eq!(outcome.malformed[0].recovery, Recovery::Skipped);
    assert!(store.get(bad.id).unwrap().is_none());
}

#[test]
fn blank_status_is_stored_unchanged() {
    let (_dir, store) = scratch_store();
    let mut task = Task::new("no status yet");
    task.status = String::new();

    store.upsert(&task).unwrap();

    assert_eq!(store.load_all().unwrap(), vec![task]);
}

#[test]
fn legacy_capitalized_levels_are_read_canonically() {
    let (_dir, store) = scratch_store();
    let task = Task::new("legacy");
    store.upsert(&task).unwrap();
    raw_execute(
        &store,
        "UPDATE tasks SET importance = 'High', urgency = 'LOW', tags = '' WHERE id = ?1;",
        &[&task.id.to_string()],
    );

    let loaded = store.get(task.id).unwrap().unwrap();
    assert_eq!(loaded.importance, Level::High);
    assert_eq!(loaded.urgency, Level::Low);
    assert!(loaded.tags.is_empty());
}

#[test]
fn get_returns_none_for_unknown_id() {
    let (_dir, store) = scratch_store();
    assert!(store.get(uuid::Uuid::new_v4()).unwrap().is_none());
}

fn raw_execute(store: &SqliteTaskStore, sql: &str, args: &[&str]) {
    let conn = Connection::open(store.path()).unwrap();
    conn.execute(sql, params_from_iter(args)).unwrap();
}
