//! Application state wiring the collaborators together.
//!
//! `AppState` pins the generic chat controller to the concrete infra
//! implementations: SQLite history, HTTP recommendations, and the
//! file-backed session store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bookchat_core::chat::{ChatController, ControllerConfig};
use bookchat_infra::config::{apply_endpoint_override, load_config};
use bookchat_infra::http::recommend::HttpRecommendationClient;
use bookchat_infra::paths::resolve_data_dir;
use bookchat_infra::session::file_store::FileSessionStore;
use bookchat_infra::sqlite::history::SqliteHistoryRepository;
use bookchat_infra::sqlite::pool::{DatabasePool, database_url};
use bookchat_types::config::AppConfig;

/// Chat controller pinned to the production collaborators.
pub type ConcreteChatController = ChatController<SqliteHistoryRepository, HttpRecommendationClient>;

/// Shared application state.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub session: Arc<FileSessionStore>,
    pub history: Arc<SqliteHistoryRepository>,
    pub recommender: Arc<HttpRecommendationClient>,
}

impl AppState {
    /// Resolve the data directory, load config, open the database.
    ///
    /// `endpoint_override` (from `--endpoint`) wins over both the config file
    /// and `BOOKCHAT_ENDPOINT`.
    pub async fn init(endpoint_override: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await?;
        let config = apply_endpoint_override(config, endpoint_override);

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let history = Arc::new(SqliteHistoryRepository::new(db_pool));

        let recommender = Arc::new(HttpRecommendationClient::new(
            config.recommendation.endpoint.clone(),
            Duration::from_secs(config.recommendation.timeout_secs),
        )?);

        let session = Arc::new(FileSessionStore::open(&data_dir).await);

        tracing::debug!(
            data_dir = %data_dir.display(),
            endpoint = %config.recommendation.endpoint,
            "Application state ready"
        );

        Ok(Self {
            data_dir,
            config,
            session,
            history,
            recommender,
        })
    }

    /// A fresh, signed-out chat controller sharing this state's collaborators.
    pub fn controller(&self) -> ConcreteChatController {
        ChatController::new(
            Arc::clone(&self.history),
            Arc::clone(&self.recommender),
            ControllerConfig::from(&self.config.history),
        )
    }
}
