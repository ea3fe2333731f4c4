//! Local journal: append-only daily check-ins, BMI and activity history,
//! and the derived-strategy cache.
//!
//! Logs are never updated in place. A second check-in for the same
//! (user, date) is rejected with `JournalError::DuplicateLog`.

use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::models::{ActivityHistoryEntry, BmiHistoryEntry, DailyLog, DailyStrategy};
use crate::strategy::StrategyInput;

/// Check-ins read when deriving a strategy
pub const STRATEGY_LOG_WINDOW: i64 = 14;
/// BMI entries read when deriving a strategy
pub const STRATEGY_BMI_WINDOW: i64 = 10;
/// Days of activity read when deriving a strategy
pub const STRATEGY_ACTIVITY_DAYS: i64 = 14;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum JournalError {
  #[error("A check-in for {0} already exists")]
  DuplicateLog(NaiveDate),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Corrupt row: {0}")]
  Corrupt(String),
}

impl From<serde_json::Error> for JournalError {
  fn from(e: serde_json::Error) -> Self {
    JournalError::Corrupt(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Daily Logs
/// ---------------------------------------------------------------------------

pub async fn append_log(pool: &SqlitePool, user_id: &str, log: &DailyLog) -> Result<(), JournalError> {
  let result = sqlx::query(
    r#"
    INSERT INTO daily_logs (
      user_id, date, sleep_hours, sleep_quality, mood, energy_level,
      menstrual_day, did_workout_yesterday, diet_compliance_yesterday
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
  )
  .bind(user_id)
  .bind(log.date.format(DATE_FORMAT).to_string())
  .bind(log.sleep_hours)
  .bind(log.sleep_quality.as_str())
  .bind(log.mood.as_str())
  .bind(log.energy_level.as_str())
  .bind(log.menstrual_day.map(i64::from))
  .bind(log.did_workout_yesterday)
  .bind(log.diet_compliance_yesterday.as_str())
  .execute(pool)
  .await;

  match result {
    Ok(_) => {
      debug!(user_id, date = %log.date, "Appended daily log");
      Ok(())
    }
    Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(JournalError::DuplicateLog(log.date)),
    Err(e) => Err(e.into()),
  }
}

/// Most recent logs first
pub async fn recent_logs(pool: &SqlitePool, user_id: &str, limit: i64) -> Result<Vec<DailyLog>, JournalError> {
  query_logs(pool, user_id, None, limit).await
}

/// Most recent logs dated on or before `as_of`, newest first
pub async fn logs_through(
  pool: &SqlitePool,
  user_id: &str,
  as_of: NaiveDate,
  limit: i64,
) -> Result<Vec<DailyLog>, JournalError> {
  query_logs(pool, user_id, Some(as_of), limit).await
}

async fn query_logs(
  pool: &SqlitePool,
  user_id: &str,
  as_of: Option<NaiveDate>,
  limit: i64,
) -> Result<Vec<DailyLog>, JournalError> {
  let rows = sqlx::query(
    r#"
    SELECT date, sleep_hours, sleep_quality, mood, energy_level,
           menstrual_day, did_workout_yesterday, diet_compliance_yesterday
    FROM daily_logs
    WHERE user_id = ?1 AND (?2 IS NULL OR date <= ?2)
    ORDER BY date DESC
    LIMIT ?3
    "#,
  )
  .bind(user_id)
  .bind(as_of.map(|d| d.format(DATE_FORMAT).to_string()))
  .bind(limit)
  .fetch_all(pool)
  .await?;

  rows.iter().map(log_from_row).collect()
}

pub async fn log_for_date(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
) -> Result<Option<DailyLog>, JournalError> {
  let row = sqlx::query(
    r#"
    SELECT date, sleep_hours, sleep_quality, mood, energy_level,
           menstrual_day, did_workout_yesterday, diet_compliance_yesterday
    FROM daily_logs
    WHERE user_id = ?1 AND date = ?2
    "#,
  )
  .bind(user_id)
  .bind(date.format(DATE_FORMAT).to_string())
  .fetch_optional(pool)
  .await?;

  row.as_ref().map(log_from_row).transpose()
}

/// Date of the newest log strictly before `date`
pub async fn previous_log_date(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
) -> Result<Option<NaiveDate>, JournalError> {
  let value: Option<String> = sqlx::query_scalar(
    "SELECT MAX(date) FROM daily_logs WHERE user_id = ?1 AND date < ?2",
  )
  .bind(user_id)
  .bind(date.format(DATE_FORMAT).to_string())
  .fetch_one(pool)
  .await?;

  value.as_deref().map(parse_date).transpose()
}

fn log_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DailyLog, JournalError> {
  let date: String = row.get("date");
  let sleep_quality: String = row.get("sleep_quality");
  let mood: String = row.get("mood");
  let energy_level: String = row.get("energy_level");
  let menstrual_day: Option<i64> = row.get("menstrual_day");
  let compliance: String = row.get("diet_compliance_yesterday");

  Ok(DailyLog {
    date: parse_date(&date)?,
    sleep_hours: row.get("sleep_hours"),
    sleep_quality: sleep_quality.parse().map_err(JournalError::Corrupt)?,
    mood: mood.parse().map_err(JournalError::Corrupt)?,
    energy_level: energy_level.parse().map_err(JournalError::Corrupt)?,
    menstrual_day: menstrual_day.and_then(|d| u8::try_from(d).ok()),
    did_workout_yesterday: row.get("did_workout_yesterday"),
    diet_compliance_yesterday: compliance.parse().map_err(JournalError::Corrupt)?,
  })
}

/// ---------------------------------------------------------------------------
/// BMI & Activity History
/// ---------------------------------------------------------------------------

pub async fn record_bmi(pool: &SqlitePool, user_id: &str, entry: &BmiHistoryEntry) -> Result<(), JournalError> {
  sqlx::query(
    r#"
    INSERT INTO bmi_history (user_id, bmi, interpretation, weight, height, recorded_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(user_id)
  .bind(entry.bmi)
  .bind(&entry.interpretation)
  .bind(entry.weight)
  .bind(entry.height)
  .bind(entry.date.to_rfc3339())
  .execute(pool)
  .await?;

  Ok(())
}

/// Most recent entries first
pub async fn recent_bmi(
  pool: &SqlitePool,
  user_id: &str,
  limit: i64,
) -> Result<Vec<BmiHistoryEntry>, JournalError> {
  query_bmi(pool, user_id, None, limit).await
}

/// Most recent entries recorded strictly before `until`, newest first
pub async fn bmi_before(
  pool: &SqlitePool,
  user_id: &str,
  until: DateTime<Utc>,
  limit: i64,
) -> Result<Vec<BmiHistoryEntry>, JournalError> {
  query_bmi(pool, user_id, Some(until), limit).await
}

async fn query_bmi(
  pool: &SqlitePool,
  user_id: &str,
  until: Option<DateTime<Utc>>,
  limit: i64,
) -> Result<Vec<BmiHistoryEntry>, JournalError> {
  let rows = sqlx::query(
    r#"
    SELECT bmi, interpretation, weight, height, recorded_at
    FROM bmi_history
    WHERE user_id = ?1 AND (?2 IS NULL OR recorded_at < ?2)
    ORDER BY recorded_at DESC, id DESC
    LIMIT ?3
    "#,
  )
  .bind(user_id)
  .bind(until.map(|t| t.to_rfc3339()))
  .bind(limit)
  .fetch_all(pool)
  .await?;

  rows
    .iter()
    .map(|row| -> Result<BmiHistoryEntry, JournalError> {
      let recorded_at: String = row.get("recorded_at");
      Ok(BmiHistoryEntry {
        bmi: row.get("bmi"),
        interpretation: row.get("interpretation"),
        weight: row.get("weight"),
        height: row.get("height"),
        date: parse_timestamp(&recorded_at)?,
      })
    })
    .collect()
}

pub async fn record_activity(
  pool: &SqlitePool,
  user_id: &str,
  entry: &ActivityHistoryEntry,
) -> Result<(), JournalError> {
  sqlx::query(
    r#"
    INSERT INTO activity_history (
      user_id, distance_km, duration_seconds, recorded_at, path_json,
      calories, avg_pace, activity_type
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
  )
  .bind(user_id)
  .bind(entry.distance)
  .bind(entry.duration)
  .bind(entry.date.to_rfc3339())
  .bind(serde_json::to_string(&entry.path)?)
  .bind(entry.calories)
  .bind(entry.avg_pace.as_deref())
  .bind(entry.kind.as_deref())
  .execute(pool)
  .await?;

  Ok(())
}

/// Activities recorded at or after `since`, most recent first
pub async fn activity_since(
  pool: &SqlitePool,
  user_id: &str,
  since: DateTime<Utc>,
) -> Result<Vec<ActivityHistoryEntry>, JournalError> {
  query_activity(pool, user_id, since, None).await
}

/// Activities in `[since, until)`, most recent first
pub async fn activity_between(
  pool: &SqlitePool,
  user_id: &str,
  since: DateTime<Utc>,
  until: DateTime<Utc>,
) -> Result<Vec<ActivityHistoryEntry>, JournalError> {
  query_activity(pool, user_id, since, Some(until)).await
}

async fn query_activity(
  pool: &SqlitePool,
  user_id: &str,
  since: DateTime<Utc>,
  until: Option<DateTime<Utc>>,
) -> Result<Vec<ActivityHistoryEntry>, JournalError> {
  let rows = sqlx::query(
    r#"
    SELECT distance_km, duration_seconds, recorded_at, path_json,
           calories, avg_pace, activity_type
    FROM activity_history
    WHERE user_id = ?1 AND recorded_at >= ?2 AND (?3 IS NULL OR recorded_at < ?3)
    ORDER BY recorded_at DESC
    "#,
  )
  .bind(user_id)
  .bind(since.to_rfc3339())
  .bind(until.map(|t| t.to_rfc3339()))
  .fetch_all(pool)
  .await?;

  rows
    .iter()
    .map(|row| -> Result<ActivityHistoryEntry, JournalError> {
      let recorded_at: String = row.get("recorded_at");
      let path_json: String = row.get("path_json");
      Ok(ActivityHistoryEntry {
        distance: row.get("distance_km"),
        duration: row.get("duration_seconds"),
        date: parse_timestamp(&recorded_at)?,
        path: serde_json::from_str(&path_json)?,
        calories: row.get("calories"),
        avg_pace: row.get("avg_pace"),
        kind: row.get("activity_type"),
      })
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Strategy Context & Cache
/// ---------------------------------------------------------------------------

/// History the strategy engine reads for one day
#[derive(Debug, Clone, Default)]
pub struct StrategyContext {
  pub recent_logs: Vec<DailyLog>,
  pub recent_bmi: Vec<BmiHistoryEntry>,
  pub recent_activity: Vec<ActivityHistoryEntry>,
}

/// Only history up to the end of `as_of` is read, so a past day derives the same way later
pub async fn load_strategy_context(
  pool: &SqlitePool,
  user_id: &str,
  as_of: NaiveDate,
) -> Result<StrategyContext, JournalError> {
  let end_of_day = as_of
    .succ_opt()
    .and_then(|next| next.and_hms_opt(0, 0, 0))
    .map(|t| t.and_utc())
    .unwrap_or(DateTime::<Utc>::MAX_UTC);
  let since = end_of_day - chrono::Duration::days(STRATEGY_ACTIVITY_DAYS + 1);

  Ok(StrategyContext {
    recent_logs: logs_through(pool, user_id, as_of, STRATEGY_LOG_WINDOW).await?,
    recent_bmi: bmi_before(pool, user_id, end_of_day, STRATEGY_BMI_WINDOW).await?,
    recent_activity: activity_between(pool, user_id, since, end_of_day).await?,
  })
}

/// SHA-256 of every input the engine reads; a cached strategy is valid only for the same fingerprint
pub fn fingerprint(input: &StrategyInput) -> Result<String, JournalError> {
  let serialized = serde_json::to_string(&(
    input.profile,
    input.plan,
    input.latest_log,
    input.recent_logs,
    input.recent_bmi,
    input.recent_activity,
  ))?;
  let mut hasher = Sha256::new();
  hasher.update(serialized.as_bytes());
  Ok(hex::encode(hasher.finalize()))
}

pub async fn cached_strategy(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  fingerprint: &str,
) -> Result<Option<DailyStrategy>, JournalError> {
  let row = sqlx::query(
    "SELECT fingerprint, strategy_json FROM strategy_cache WHERE user_id = ?1 AND date = ?2",
  )
  .bind(user_id)
  .bind(date.format(DATE_FORMAT).to_string())
  .fetch_optional(pool)
  .await?;

  let Some(row) = row else {
    return Ok(None);
  };
  let stored: String = row.get("fingerprint");
  if stored != fingerprint {
    debug!(user_id, %date, "Cached strategy is stale");
    return Ok(None);
  }
  let json: String = row.get("strategy_json");
  Ok(Some(serde_json::from_str(&json)?))
}

pub async fn cache_strategy(
  pool: &SqlitePool,
  user_id: &str,
  strategy: &DailyStrategy,
  fingerprint: &str,
) -> Result<(), JournalError> {
  sqlx::query(
    r#"
    INSERT INTO strategy_cache (user_id, date, fingerprint, strategy_json)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(user_id, date) DO UPDATE SET
      fingerprint = excluded.fingerprint,
      strategy_json = excluded.strategy_json,
      created_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(user_id)
  .bind(strategy.date.format(DATE_FORMAT).to_string())
  .bind(fingerprint)
  .bind(serde_json::to_string(strategy)?)
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn invalidate_strategies(pool: &SqlitePool, user_id: &str) -> Result<u64, JournalError> {
  let result = sqlx::query("DELETE FROM strategy_cache WHERE user_id = ?1")
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(result.rows_affected())
}

/// ---------------------------------------------------------------------------
/// Helpers
/// ---------------------------------------------------------------------------

fn parse_date(value: &str) -> Result<NaiveDate, JournalError> {
  NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| JournalError::Corrupt(format!("{}: {}", value, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, JournalError> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| JournalError::Corrupt(format!("{}: {}", value, e)))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
