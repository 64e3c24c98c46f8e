//! Application state wiring all services together.
//!
//! The dispatch engine is generic over its ports; AppState pins it to the
//! concrete infra implementations and adds what the HTTP layer needs for
//! the LINE webhook.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;
use tokio_util::task::TaskTracker;

use chatrelay_core::chat::dispatch::DispatchEngine;
use chatrelay_core::chat::session::SessionStore;
use chatrelay_core::llm::client::InferenceClient;
use chatrelay_infra::config::{Credentials, ResolvedPaths, load_app_config, load_prompt_catalog};
use chatrelay_infra::filesystem::media::LocalMediaStore;
use chatrelay_infra::line::LineClient;
use chatrelay_infra::llm::create_backend;
use chatrelay_infra::llm::openai_compat::OpenAiCompatBackend;
use chatrelay_infra::sqlite::audit::SqliteAuditLog;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_types::config::AppConfig;

/// Concrete dispatch engine pinned to infra implementations.
pub type ConcreteDispatchEngine =
    DispatchEngine<OpenAiCompatBackend, SqliteAuditLog, LineClient, LocalMediaStore>;

/// Shared state for the webhook server.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteDispatchEngine>,
    pub line: LineClient,
    pub channel_secret: Arc<SecretString>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    /// Background event tasks; drained on shutdown.
    pub tasks: TaskTracker,
}

impl AppState {
    /// Load config, prompts and credentials, open the database, wire the engine.
    ///
    /// Any configuration problem is fatal here, before the listener binds.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        let config = load_app_config(&data_dir).await?;
        let paths = ResolvedPaths::new(&data_dir, &config);
        let catalog = load_prompt_catalog(&paths.prompts).await?;

        let credentials = Credentials::from_env().into_server()?;
        let line = LineClient::new(credentials.access_token)?;

        if let Some(parent) = paths.database.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let db_pool = DatabasePool::open(&paths.database)
            .await
            .with_context(|| format!("opening {}", paths.database.display()))?;

        let backend = create_backend(&config.backend, credentials.backend_api_key)?;
        let client = InferenceClient::new(
            backend,
            config.backend.model.clone(),
            Duration::from_secs(config.backend.timeout_secs),
        );

        let engine = DispatchEngine::new(
            client,
            SessionStore::new(config.session.max_history),
            catalog,
            SqliteAuditLog::new(db_pool),
            line.clone(),
            LocalMediaStore::new(paths.upload_dir),
            config.backend.image_temperature,
        );

        Ok(Self {
            engine: Arc::new(engine),
            line,
            channel_secret: Arc::new(credentials.channel_secret),
            config: Arc::new(config),
            data_dir,
            tasks: TaskTracker::new(),
        })
    }
}
