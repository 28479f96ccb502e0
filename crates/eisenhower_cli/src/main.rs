//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `eisenhower_core` linkage against the default task database.
//! - Print a per-cell overview without touching any task contents.

use eisenhower_core::{
    core_version, init_logging_from_config, AppConfig, MatrixCell, SqliteTaskStore, TaskRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = AppConfig::default();
    let store = SqliteTaskStore::new(config.db_path());
    println!("eisenhower_core version={}", core_version());
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let path = match store.ensure_initialized() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("storage unavailable: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("db_path={}", path.display());

    let tasks = match store.load_all() {
        Ok(tasks) => tasks,
        Err(err) => {
            eprintln!("load failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let today = chrono::Local::now().date_naive();
    let classifier = config.classifier();
    for cell in MatrixCell::all() {
        let count = tasks.iter().filter(|task| task.cell() == cell).count();
        println!(
            "importance={} urgency={} tasks={count}",
            cell.importance, cell.urgency
        );
    }
    let summary = classifier.summarize(&tasks, today);
    println!(
        "total={} overdue={} due_soon={} due_soon_days={}",
        tasks.len(),
        summary.overdue,
        summary.due_soon,
        classifier.config().due_soon_days
    );

    ExitCode::SUCCESS
}
