use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::journal::JournalError;

pub type DbPool = SqlitePool;

/// Open (creating if needed) the local journal database and run migrations
pub async fn initialize_db(db_path: &Path) -> Result<DbPool, JournalError> {
  if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  info!(path = %db_path.display(), "Initializing journal database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Journal database ready");

  Ok(pool)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_initialize_creates_file_and_tables() {
    let dir = std::env::temp_dir().join(format!("fit-coach-db-{}", std::process::id()));
    let path = dir.join("nested").join("journal.db");

    let pool = initialize_db(&path).await.unwrap();
    assert!(path.exists());

    let tables: Vec<String> =
      sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .fetch_all(&pool)
        .await
        .unwrap();
    for table in ["activity_history", "auth_session", "bmi_history", "daily_logs", "strategy_cache"] {
      assert!(tables.iter().any(|t| t == table), "missing table {}", table);
    }

    pool.close().await;
    let _ = fs::remove_dir_all(dir);
  }
}
