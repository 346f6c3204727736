//! Subcommand implementations and shared wiring.

pub mod chat;
pub mod init;
pub mod list_tests;
pub mod submit;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use tutorkit_core::engine::{EngineConfig, TutorEngine};
use tutorkit_providers::create_provider;
use tutorkit_storage::{SqliteConversationLog, SqlitePoolManager, SqliteTestCatalog};

/// Load config and wire storage + provider into an engine.
pub(crate) async fn build_engine(config_path: Option<&Path>) -> Result<TutorEngine> {
    let config = tutorkit_providers::config::load_config_from(config_path)?;
    let provider_name = &config.default_provider;
    let provider_config = config.providers.get(provider_name).with_context(|| {
        format!(
            "provider '{provider_name}' is not configured. \
             Run `tutorkit init` and add an API key to tutorkit.toml"
        )
    })?;
    let generator = create_provider(provider_config)?;

    let pool = SqlitePoolManager::new(&config.database_url).await?;
    let conversations = Arc::new(SqliteConversationLog::new(pool.clone()).await?);
    let tests = Arc::new(SqliteTestCatalog::new(pool).await?);

    let engine_config = EngineConfig {
        model: config.default_model.clone(),
        ..EngineConfig::default()
    };

    Ok(TutorEngine::new(conversations, tests, generator, engine_config))
}
