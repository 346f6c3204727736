//! The `tutorkit chat` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(student: String, message: String, config: Option<PathBuf>) -> Result<()> {
    let engine = super::build_engine(config.as_deref()).await?;
    let reply = engine.chat(&student, &message).await?;
    println!("{reply}");
    Ok(())
}
