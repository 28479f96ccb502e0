use chrono::NaiveDate;
use eisenhower_core::classify::{build_matrix_view, summarize, DueSummary};
use eisenhower_core::{
    due_status, matches, sort_key, sort_tasks, ClassifierConfig, DateRange, DueStatus, Level,
    MatrixCell, TagSet, Task, TaskClassifier, TaskFilter,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn due_on(title: &str, due: Option<NaiveDate>) -> Task {
    let mut task = Task::new(title);
    task.due_date = due;
    task
}

#[test]
fn due_status_boundaries_with_three_day_threshold() {
    let today = date(2024, 1, 10);

    let status = |due| due_status(&due_on("t", Some(due)), today, 3);
    assert_eq!(status(date(2024, 1, 13)), DueStatus::DueSoon);
    assert_eq!(status(date(2024, 1, 14)), DueStatus::Normal);
    assert_eq!(status(date(2024, 1, 9)), DueStatus::Overdue);
    assert_eq!(status(date(2024, 1, 10)), DueStatus::DueSoon);
    assert_eq!(due_status(&due_on("t", None), today, 3), DueStatus::None);
}

#[test]
fn threshold_comes_from_classifier_config() {
    let today = date(2024, 1, 10);
    let task = due_on("t", Some(date(2024, 1, 16)));

    let default = TaskClassifier::default();
    let weekly = TaskClassifier::new(ClassifierConfig { due_soon_days: 7 });
    let same_day = TaskClassifier::new(ClassifierConfig { due_soon_days: 0 });

    assert_eq!(default.due_status(&task, today), DueStatus::Normal);
    assert_eq!(weekly.due_status(&task, today), DueStatus::DueSoon);
    assert_eq!(
        same_day.due_status(&due_on("t", Some(today)), today),
        DueStatus::DueSoon
    );
}

#[test]
fn empty_filter_matches_every_task() {
    let filter = TaskFilter::default();
    assert!(filter.is_empty());

    let mut tagged = due_on("tagged", Some(date(2024, 3, 1)));
    tagged.tags = ["x"].into_iter().collect();
    for task in [due_on("plain", None), tagged] {
        assert!(matches(&task, &filter));
    }
}

#[test]
fn open_ended_date_range_excludes_tasks_without_due_date() {
    let filter = TaskFilter {
        date_range: Some(DateRange {
            from: Some(date(2024, 1, 1)),
            to: None,
        }),
        ..TaskFilter::default()
    };

    assert!(!matches(&due_on("undated", None), &filter));
    assert!(matches(&due_on("later", Some(date(2024, 1, 1))), &filter));
    assert!(!matches(&due_on("earlier", Some(date(2023, 12, 31))), &filter));
}

#[test]
fn date_range_bounds_are_inclusive() {
    let filter = TaskFilter {
        date_range: Some(DateRange {
            from: Some(date(2024, 1, 1)),
            to: Some(date(2024, 1, 31)),
        }),
        ..TaskFilter::default()
    };

    assert!(matches(&due_on("first", Some(date(2024, 1, 1))), &filter));
    assert!(matches(&due_on("last", Some(date(2024, 1, 31))), &filter));
    assert!(!matches(&due_on("after", Some(date(2024, 2, 1))), &filter));
}

#[test]
fn unbounded_date_range_places_no_constraint() {
    let filter = TaskFilter {
        date_range: Some(DateRange::default()),
        ..TaskFilter::default()
    };
    assert!(matches(&due_on("undated", None), &filter));
}

#[test]
fn filter_fields_combine_with_and() {
    let mut task = due_on("Prepare Budget review", Some(date(2024, 2, 1)));
    task.importance = Level::High;
    task.tags = ["Finance", "q1"].into_iter().collect();

    let mut filter = TaskFilter {
        search_text: Some("budget".to_string()),
        importance: Some(Level::High),
        tags: ["FINANCE", "unrelated"].into_iter().collect::<TagSet>(),
        date_range: Some(DateRange {
            from: None,
            to: Some(date(2024, 2, 1)),
        }),
    };
    assert!(matches(&task, &filter));

    filter.importance = Some(Level::Low);
    assert!(!matches(&task, &filter));

    filter.importance = None;
    filter.tags = ["home"].into_iter().collect();
    assert!(!matches(&task, &filter));

    filter.tags = TagSet::new();
    filter.search_text = Some("invoice".to_string());
    assert!(!matches(&task, &filter));

    filter.search_text = Some("   ".to_string());
    assert!(matches(&task, &filter));
}

#[test]
fn sort_puts_earliest_first_and_undated_last() {
    let mut tasks = vec![
        due_on("feb", Some(date(2024, 2, 1))),
        due_on("none", None),
        due_on("jan", Some(date(2024, 1, 1))),
    ];

    sort_tasks(&mut tasks);

    let titles: Vec<_> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["jan", "feb", "none"]);
}

#[test]
fn sort_breaks_ties_by_case_insensitive_title() {
    let due = Some(date(2024, 1, 5));
    let mut tasks = vec![due_on("beta", due), due_on("Alpha", due), due_on("alpha 2", None)];

    sort_tasks(&mut tasks);

    let titles: Vec<_> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "beta", "alpha 2"]);
    assert!(sort_key(&tasks[0]) < sort_key(&tasks[1]));
}

#[test]
fn matrix_view_buckets_filters_and_sorts() {
    let today = date(2024, 1, 10);
    let hot = MatrixCell::new(Level::High, Level::High);
    let work: TagSet = ["work"].into_iter().collect();

    let mut late = due_on("late", Some(date(2024, 1, 9)));
    late.move_to(hot);
    late.tags = work.clone();
    let mut soon = due_on("soon", Some(date(2024, 1, 11)));
    soon.move_to(hot);
    soon.tags = work.clone();
    let mut hidden = due_on("hidden", None);
    hidden.move_to(hot);
    let mut relaxed = due_on("relaxed", None);
    relaxed.tags = work.clone();

    let filter = TaskFilter {
        tags: work,
        ..TaskFilter::default()
    };
    let view = build_matrix_view(
        vec![soon, hidden, relaxed, late],
        &filter,
        today,
        &TaskClassifier::default(),
    );

    assert_eq!(view.cells.len(), 9);
    assert_eq!(view.total(), 3);

    let hot_cell = view.cell(hot);
    assert_eq!(hot_cell.cell, hot);
    let items: Vec<_> = hot_cell
        .items
        .iter()
        .map(|item| (item.task.title.as_str(), item.due_status))
        .collect();
    assert_eq!(
        items,
        vec![("late", DueStatus::Overdue), ("soon", DueStatus::DueSoon)]
    );

    let default_cell = view.cell(MatrixCell::new(Level::Medium, Level::Medium));
    assert_eq!(default_cell.items.len(), 1);
    assert_eq!(default_cell.items[0].due_status, DueStatus::None);
}

#[test]
fn summary_counts_each_status() {
    let today = date(2024, 1, 10);
    let tasks = vec![
        due_on("a", Some(date(2024, 1, 1))),
        due_on("b", Some(date(2024, 1, 12))),
        due_on("c", Some(date(2024, 3, 1))),
        due_on("d", None),
        due_on("e", None),
    ];

    let summary = summarize(&tasks, today, 3);
    assert_eq!(
        summary,
        DueSummary {
            overdue: 1,
            due_soon: 1,
            normal: 1,
            no_due_date: 2,
        }
    );
    assert_eq!(summary.attention(), 2);
}
