//! The `tutorkit submit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use tutorkit_core::model::SubmittedAnswer;

pub async fn execute(
    student: String,
    test_id: String,
    answers_path: PathBuf,
    config: Option<PathBuf>,
) -> Result<()> {
    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers file: {}", answers_path.display()))?;
    let answers: Vec<SubmittedAnswer> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers file: {}", answers_path.display()))?;

    let engine = super::build_engine(config.as_deref()).await?;
    let outcome = engine.submit_test(&student, &test_id, answers).await?;

    match &outcome.score {
        Some(score) => println!("Score: {score}"),
        None => println!("Score: n/a (no multiple-choice answers submitted)"),
    }

    if !outcome.subject_scores.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Subject", "Correct", "Total"]);
        for (subject, tally) in &outcome.subject_scores {
            table.add_row(vec![
                Cell::new(subject),
                Cell::new(tally.correct),
                Cell::new(tally.total),
            ]);
        }
        println!("\n{table}");
    }

    Ok(())
}
