//! Presentation-facing facade
//!
//! Thin async wrappers over the session controller for a client shell.
//! Errors are flattened to display strings.

pub mod coaching;
pub mod navigation;
pub mod session;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::session::{AppState, SessionController};

/// Shared handle passed to every command
pub struct AppContext {
  pub controller: Arc<SessionController>,
  pub config: AppConfig,
}

impl AppContext {
  pub fn new(controller: SessionController, config: AppConfig) -> Self {
    Self {
      controller: Arc::new(controller),
      config,
    }
  }
}

pub async fn get_app_state(ctx: &AppContext) -> Result<AppState, String> {
  Ok(ctx.controller.state().await)
}

/// Drain non-blocking warnings (failed background saves) for display
pub async fn take_warnings(ctx: &AppContext) -> Result<Vec<String>, String> {
  Ok(ctx.controller.take_warnings().await)
}

#[cfg(test)]
pub(crate) mod fixtures {
  use std::path::PathBuf;
  use std::sync::Arc;
  use std::time::Duration;

  use super::AppContext;
  use crate::config::AppConfig;
  use crate::session::{SessionController, SessionSettings};
  use crate::test_utils::FakeRecordStore;

  pub fn test_config() -> AppConfig {
    AppConfig {
      store_url: "http://localhost".to_string(),
      store_anon_key: "anon".to_string(),
      advisor_api_key: None,
      db_path: PathBuf::from(":memory:"),
      request_timeout: Duration::from_secs(1),
      advisor_timeout: Duration::from_secs(1),
      trial_days: 7,
    }
  }

  pub async fn context(store: Arc<FakeRecordStore>) -> AppContext {
    let config = test_config();
    let pool = crate::test_utils::setup_test_db().await;
    let controller = SessionController::new(store, None, pool, SessionSettings::from(&config));
    AppContext::new(controller, config)
  }
}
