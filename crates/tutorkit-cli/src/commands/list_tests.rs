//! The `tutorkit list-tests` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub async fn execute(student: String, config: Option<PathBuf>) -> Result<()> {
    let engine = super::build_engine(config.as_deref()).await?;
    let tests = engine.list_tests(&student).await?;

    if tests.is_empty() {
        println!("No tests yet for student '{student}'.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Test ID", "Created", "Questions", "Completed", "Score"]);
    for test in &tests {
        table.add_row(vec![
            Cell::new(&test.test_id),
            Cell::new(test.created_at.format("%Y-%m-%d %H:%M UTC")),
            Cell::new(test.questions.len()),
            Cell::new(if test.completed { "yes" } else { "no" }),
            Cell::new(test.score.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");

    Ok(())
}
