//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - In-memory record store and scripted advisors
//! - Helper assertions

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::advisor::{Advisor, AdvisorError, MealText, PlanContent, PlanContentRequest};
use crate::models::{
  ActivityHistoryEntry, ActivityLevel, BmiHistoryEntry, CookingHabit, DailyLog, DietCompliance, DietQuality,
  Goal, MealPrepPreference, Mood, PersonalizedPlan, PlanRecord, ProfileRecord, Rating, Sex, SleepQuality,
  UserProfile,
};
use crate::record_store::{AuthEvent, RecordStore, Session, StoreError};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Midnight UTC on the given day
pub fn datetime(y: i32, m: u32, d: u32) -> DateTime<Utc> {
  date(y, m, d).and_hms_opt(0, 0, 0).expect("valid time").and_utc()
}

/// Just-registered account: no answers yet, trial running
pub fn mock_new_account() -> UserProfile {
  UserProfile::new_account("Ana", "ana@example.com", Utc::now() + Duration::days(7))
}

/// Fully onboarded 30-year-old on a weight-loss goal, trial running
pub fn mock_onboarded_profile() -> UserProfile {
  UserProfile {
    goal: Some(Goal::Emagrecer),
    age: Some(30),
    sex: Some(Sex::Female),
    height: Some(168.0),
    weight: Some(80.0),
    goal_weight: Some(70.0),
    diet_quality: Some(DietQuality::Media),
    dietary_restrictions: None,
    emotional_eating: Some(false),
    currently_training: Some(true),
    training_days: Some(3),
    activity_level: Some(ActivityLevel::Light),
    sleep_quality: Some(SleepQuality::Medio),
    stress_level: Some(Rating::Medio),
    meal_prep_preference: Some(MealPrepPreference::Rapidas),
    cooking_habit: Some(CookingHabit::Cozinho),
    motivation_level: Some(Rating::Alto),
    willing_to_track: Some(true),
    ..mock_new_account()
  }
}

/// Calm, well-slept, on-plan check-in
pub fn mock_daily_log(date: NaiveDate) -> DailyLog {
  DailyLog {
    date,
    sleep_hours: 7.5,
    sleep_quality: SleepQuality::Bom,
    mood: Mood::Feliz,
    energy_level: Rating::Medio,
    menstrual_day: None,
    did_workout_yesterday: true,
    diet_compliance_yesterday: DietCompliance::FullyOnPlan,
  }
}

/// BMI entry with the given value at noon UTC
pub fn mock_bmi(bmi: f64, y: i32, m: u32, d: u32) -> BmiHistoryEntry {
  let height = 168.0;
  let metres = height / 100.0;
  BmiHistoryEntry {
    bmi,
    interpretation: crate::models::history::interpret_bmi(bmi).to_string(),
    weight: ((bmi * metres * metres) * 10.0).round() / 10.0,
    height,
    date: datetime(y, m, d) + Duration::hours(12),
  }
}

/// Run of `duration` seconds at 7:00 UTC
pub fn mock_activity(y: i32, m: u32, d: u32, duration: i64) -> ActivityHistoryEntry {
  ActivityHistoryEntry {
    distance: duration as f64 / 360.0,
    duration,
    date: datetime(y, m, d) + Duration::hours(7),
    path: Vec::new(),
    calories: None,
    avg_pace: None,
    kind: Some("Corrida".to_string()),
  }
}

/// ---------------------------------------------------------------------------
/// Fake Record Store
/// ---------------------------------------------------------------------------

const FAKE_SIGN_UP_ID: &str = "fake-user";

#[derive(Default)]
struct FakeState {
  session: Option<Session>,
  /// User id returned by `sign_in`
  account: Option<String>,
  profiles: HashMap<String, ProfileRecord>,
  plans: Vec<PlanRecord>,
  fail_reads: bool,
  fail_writes: bool,
  delay: Option<StdDuration>,
}

/// In-memory `RecordStore` with switchable failures and latency
pub struct FakeRecordStore {
  state: Mutex<FakeState>,
  events: broadcast::Sender<AuthEvent>,
}

impl Default for FakeRecordStore {
  fn default() -> Self {
    let (events, _) = broadcast::channel(16);
    Self {
      state: Mutex::new(FakeState::default()),
      events,
    }
  }
}

fn fake_session(user_id: &str) -> Session {
  Session {
    user_id: user_id.to_string(),
    access_token: format!("access-{}", user_id),
    refresh_token: format!("refresh-{}", user_id),
    expires_at: Utc::now() + Duration::hours(1),
  }
}

impl FakeRecordStore {
  /// Existing account, not signed in
  pub fn with_account(user_id: &str, profile: UserProfile) -> Self {
    let store = Self::default();
    {
      let mut state = store.lock();
      state.account = Some(user_id.to_string());
      state.profiles.insert(user_id.to_string(), ProfileRecord::from(&profile));
    }
    store
  }

  /// Existing account with a live session
  pub fn signed_in(user_id: &str, profile: UserProfile) -> Self {
    let store = Self::with_account(user_id, profile);
    store.lock().session = Some(fake_session(user_id));
    store
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
    self.state.lock().expect("fake store lock")
  }

  pub fn fail_reads(&self, fail: bool) {
    self.lock().fail_reads = fail;
  }

  pub fn fail_writes(&self, fail: bool) {
    self.lock().fail_writes = fail;
  }

  /// Delay applied before every call
  pub fn set_delay(&self, delay: StdDuration) {
    self.lock().delay = Some(delay);
  }

  pub fn push_plan(&self, user_id: &str, plan: PersonalizedPlan) {
    self.lock().plans.push(PlanRecord {
      user_id: user_id.to_string(),
      plan_data: plan,
      created_at: Some(Utc::now()),
    });
  }

  pub fn emit(&self, event: AuthEvent) {
    let _ = self.events.send(event);
  }

  pub fn session(&self) -> Option<Session> {
    self.lock().session.clone()
  }

  pub fn profile(&self, user_id: &str) -> Option<ProfileRecord> {
    self.lock().profiles.get(user_id).cloned()
  }

  pub fn plans(&self, user_id: &str) -> Vec<PersonalizedPlan> {
    self
      .lock()
      .plans
      .iter()
      .filter(|p| p.user_id == user_id)
      .map(|p| p.plan_data.clone())
      .collect()
  }

  async fn pause(&self) {
    let delay = self.lock().delay;
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
  }

  fn check_read(&self) -> Result<(), StoreError> {
    if self.lock().fail_reads {
      return Err(StoreError::Request("connection refused".to_string()));
    }
    Ok(())
  }

  fn check_write(&self) -> Result<(), StoreError> {
    if self.lock().fail_writes {
      return Err(StoreError::Api {
        status: 503,
        message: "unavailable".to_string(),
      });
    }
    Ok(())
  }
}

/// Overlay the present fields of `patch` onto `base`
fn merge_patch(base: &ProfileRecord, patch: &ProfileRecord) -> Result<ProfileRecord, StoreError> {
  let to_value = |r: &ProfileRecord| serde_json::to_value(r).map_err(|e| StoreError::Parse(e.to_string()));
  let mut merged = to_value(base)?;
  if let (Some(target), serde_json::Value::Object(fields)) = (merged.as_object_mut(), to_value(patch)?) {
    target.extend(fields);
  }
  serde_json::from_value(merged).map_err(|e| StoreError::Parse(e.to_string()))
}

#[async_trait]
impl RecordStore for FakeRecordStore {
  async fn get_session(&self) -> Result<Option<Session>, StoreError> {
    self.pause().await;
    self.check_read()?;
    Ok(self.session())
  }

  async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, StoreError> {
    self.pause().await;
    let mut state = self.lock();
    let Some(user_id) = state.account.clone() else {
      return Err(StoreError::Auth("Invalid login credentials".to_string()));
    };
    let session = fake_session(&user_id);
    state.session = Some(session.clone());
    Ok(session)
  }

  async fn sign_up(&self, _email: &str, _password: &str) -> Result<Session, StoreError> {
    self.pause().await;
    let mut state = self.lock();
    let session = fake_session(FAKE_SIGN_UP_ID);
    state.account = Some(FAKE_SIGN_UP_ID.to_string());
    state.session = Some(session.clone());
    Ok(session)
  }

  async fn sign_out(&self) -> Result<(), StoreError> {
    self.pause().await;
    self.lock().session = None;
    self.emit(AuthEvent::SignedOut);
    Ok(())
  }

  async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, StoreError> {
    self.pause().await;
    self.check_read()?;
    Ok(self.profile(user_id))
  }

  async fn create_profile(&self, user_id: &str, record: &ProfileRecord) -> Result<(), StoreError> {
    self.pause().await;
    self.check_write()?;
    let row = ProfileRecord {
      id: Some(user_id.to_string()),
      ..record.clone()
    };
    self.lock().profiles.insert(user_id.to_string(), row);
    Ok(())
  }

  async fn update_profile(&self, user_id: &str, patch: &ProfileRecord) -> Result<(), StoreError> {
    self.pause().await;
    self.check_write()?;
    let mut state = self.lock();
    let base = state.profiles.get(user_id).cloned().unwrap_or_default();
    let merged = merge_patch(&base, patch)?;
    state.profiles.insert(user_id.to_string(), merged);
    Ok(())
  }

  async fn get_latest_plan(&self, user_id: &str) -> Result<Option<PlanRecord>, StoreError> {
    self.pause().await;
    self.check_read()?;
    Ok(self.lock().plans.iter().rev().find(|p| p.user_id == user_id).cloned())
  }

  async fn insert_plan(&self, user_id: &str, plan: &PersonalizedPlan) -> Result<(), StoreError> {
    self.pause().await;
    self.check_write()?;
    self.push_plan(user_id, plan.clone());
    Ok(())
  }

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
    self.events.subscribe()
  }
}

/// ---------------------------------------------------------------------------
/// Advisors
/// ---------------------------------------------------------------------------

/// Returns the same content for every request
pub struct ScriptedAdvisor {
  content: PlanContent,
}

impl ScriptedAdvisor {
  pub fn new(content: PlanContent) -> Self {
    Self { content }
  }

  /// Content matching the four meal slots of a generated plan
  pub fn four_meals() -> Self {
    Self::new(PlanContent {
      meals: (1..=4)
        .map(|i| MealText {
          title: format!("Refeição {}", i),
          description: "Sugestão do advisor".to_string(),
          substitutions: None,
        })
        .collect(),
      tips: vec!["Beba água ao acordar".to_string()],
    })
  }
}

#[async_trait]
impl Advisor for ScriptedAdvisor {
  async fn plan_content(&self, _request: &PlanContentRequest) -> Result<PlanContent, AdvisorError> {
    Ok(self.content.clone())
  }
}

pub struct FailingAdvisor;

#[async_trait]
impl Advisor for FailingAdvisor {
  async fn plan_content(&self, _request: &PlanContentRequest) -> Result<PlanContent, AdvisorError> {
    Err(AdvisorError::Api("service unavailable".to_string()))
  }
}

/// Answers only after `delay`
pub struct SlowAdvisor {
  pub delay: StdDuration,
}

#[async_trait]
impl Advisor for SlowAdvisor {
  async fn plan_content(&self, _request: &PlanContentRequest) -> Result<PlanContent, AdvisorError> {
    tokio::time::sleep(self.delay).await;
    Ok(PlanContent {
      meals: Vec::new(),
      tips: Vec::new(),
    })
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::access::needs_onboarding;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('daily_logs', 'bmi_history', 'activity_history')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 3);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    assert!(needs_onboarding(&mock_new_account()));
    assert!(!needs_onboarding(&mock_onboarded_profile()));

    let bmi = mock_bmi(27.0, 2026, 10, 1);
    assert_approx_eq!(BmiHistoryEntry::observe(bmi.weight, bmi.height, bmi.date).unwrap().bmi, 27.0, 0.11);
  }

  #[tokio::test]
  async fn test_fake_store_merges_patches() {
    let store = FakeRecordStore::with_account("user-1", mock_onboarded_profile());
    let patch = ProfileRecord {
      weight: Some(72.0),
      ..Default::default()
    };

    store.update_profile("user-1", &patch).await.unwrap();

    let stored = store.profile("user-1").unwrap();
    assert_eq!(stored.weight, Some(72.0));
    assert_eq!(stored.goal, Some(Goal::Emagrecer));
  }
}
