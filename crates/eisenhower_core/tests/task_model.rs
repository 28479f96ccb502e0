use chrono::NaiveDate;
use eisenhower_core::{Level, MatrixCell, TagSet, Task, TaskValidationError};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn task_new_sets_defaults() {
    let task = Task::new("Write report");

    assert!(!task.id.is_nil());
    assert_eq!(task.title, "Write report");
    assert_eq!(task.description, None);
    assert_eq!(task.importance, Level::Medium);
    assert_eq!(task.urgency, Level::Medium);
    assert_eq!(task.due_date, None);
    assert_eq!(task.updated_at, None);
    assert_eq!(task.status, "todo");
    assert!(task.tags.is_empty());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Task::with_id(Uuid::nil(), "invalid").unwrap_err();
    assert_eq!(err, TaskValidationError::NilId);
}

#[test]
fn validate_rejects_blank_title() {
    let task = Task::new("   ");
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::EmptyTitle);
}

#[test]
fn move_to_changes_cell_and_touches() {
    let mut task = Task::new("Call plumber");
    let target = MatrixCell::new(Level::High, Level::High);

    task.move_to(target);

    assert_eq!(task.cell(), target);
    assert!(task.updated_at.is_some());
}

#[test]
fn every_task_lands_in_one_of_nine_cells() {
    let cells: HashSet<_> = MatrixCell::all().into_iter().collect();
    assert_eq!(cells.len(), 9);

    for importance in Level::ALL {
        for urgency in Level::ALL {
            let mut task = Task::new("probe");
            task.importance = importance;
            task.urgency = urgency;
            assert!(cells.contains(&eisenhower_core::cell_of(&task)));
        }
    }
}

#[test]
fn level_parsing_is_case_insensitive_and_output_is_lowercase() {
    assert_eq!("High".parse::<Level>().unwrap(), Level::High);
    assert_eq!(" LOW ".parse::<Level>().unwrap(), Level::Low);
    assert!("urgent".parse::<Level>().is_err());
    assert_eq!(Level::Medium.to_string(), "medium");
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::with_id(id, "Ship release").unwrap();
    task.importance = Level::High;
    task.urgency = Level::Low;
    task.due_date = NaiveDate::from_ymd_opt(2024, 1, 13);
    task.tags = ["Release", "ops"].into_iter().collect();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["importance"], "high");
    assert_eq!(json["urgency"], "low");
    assert_eq!(json["due_date"], "2024-01-13");
    assert_eq!(json["status"], "todo");
    assert_eq!(json["tags"], serde_json::json!(["ops", "Release"]));

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn deserialize_rejects_blank_title() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "  ",
        "created_at": "2024-01-10T08:00:00Z"
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(
        err.to_string().contains("task title cannot be empty"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialized_tags_collapse_case_variants() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Tagged",
        "created_at": "2024-01-10T08:00:00Z",
        "tags": ["Work", " work", "Home"]
    });

    let task: Task = serde_json::from_value(value).unwrap();
    let expected: TagSet = ["Home", "Work"].into_iter().collect();
    assert_eq!(task.tags, expected);
    assert!(task.tags.contains("home"));
}
