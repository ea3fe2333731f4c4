pub mod access;
pub mod advisor;
pub mod commands;
pub mod config;
pub mod db;
pub mod gamification;
pub mod insights;
pub mod journal;
pub mod models;
pub mod plan;
pub mod record_store;
pub mod router;
pub mod session;
pub mod strategy;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use advisor::{Advisor, ClaudeAdvisor};
use commands::AppContext;
use config::{AppConfig, ConfigError};
use journal::JournalError;
use record_store::{HttpRecordStore, StoreError};
use session::{SessionController, SessionSettings};

const DEFAULT_LOG_FILTER: &str = "fit_coach_lib=info";

#[derive(Debug, Error)]
pub enum BootstrapError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Failed to open journal: {0}")]
  Journal(#[from] JournalError),

  #[error("Failed to create record store client: {0}")]
  Store(#[from] StoreError),
}

/// Install the global fmt subscriber, honouring `RUST_LOG`. Safe to call twice.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Wire everything from the environment and restore any persisted session
pub async fn bootstrap() -> Result<AppContext, BootstrapError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  let config = AppConfig::from_env()?;

  let pool = db::initialize_db(&config.db_path).await?;
  let store = HttpRecordStore::new(
    &config.store_url,
    &config.store_anon_key,
    pool.clone(),
    config.request_timeout,
  )?;

  let advisor: Option<Arc<dyn Advisor>> = match &config.advisor_api_key {
    Some(key) => Some(Arc::new(ClaudeAdvisor::new(key.clone()))),
    None => {
      warn!("ANTHROPIC_API_KEY not set, plans will use fallback content");
      None
    }
  };

  let controller = SessionController::new(Arc::new(store), advisor, pool, SessionSettings::from(&config));
  let ctx = AppContext::new(controller, config);
  ctx.controller.watch_auth_events();

  let state = ctx.controller.restore().await;
  info!(state = state.name(), "Coach ready");
  Ok(ctx)
}
