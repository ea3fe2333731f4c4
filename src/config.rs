use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DB_PATH: &str = "fit-ai.db";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ADVISOR_TIMEOUT_SECS: u64 = 20;
const DEFAULT_TRIAL_DAYS: i64 = 7;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  Missing(String),

  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

/// Runtime configuration, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub store_url: String,
  pub store_anon_key: String,
  /// None disables the advisory service; plans use fallback content
  pub advisor_api_key: Option<String>,
  pub db_path: PathBuf,
  pub request_timeout: Duration,
  pub advisor_timeout: Duration,
  pub trial_days: i64,
}

impl AppConfig {
  /// Callers load `.env` first (see `crate::bootstrap`)
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      store_url: required("FITAI_STORE_URL")?,
      store_anon_key: required("FITAI_STORE_ANON_KEY")?,
      advisor_api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.trim().is_empty()),
      db_path: env::var("FITAI_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),
      request_timeout: Duration::from_secs(parsed("FITAI_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?),
      advisor_timeout: Duration::from_secs(parsed("FITAI_ADVISOR_TIMEOUT_SECS", DEFAULT_ADVISOR_TIMEOUT_SECS)?),
      trial_days: parsed("FITAI_TRIAL_DAYS", DEFAULT_TRIAL_DAYS)?,
    })
  }
}

fn required(key: &str) -> Result<String, ConfigError> {
  env::var(key)
    .ok()
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
      key: key.to_string(),
      value,
    }),
    Err(_) => Ok(default),
  }
}
