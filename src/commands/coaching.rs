//! Daily check-in, strategy, insights and plan commands

use chrono::NaiveDate;

use crate::commands::AppContext;
use crate::models::{ActivityHistoryEntry, DailyLog, DailyStrategy, Insight};
use crate::plan::GeneratedPlan;
use crate::session::CheckInOutcome;

pub async fn record_check_in(ctx: &AppContext, log: DailyLog) -> Result<CheckInOutcome, String> {
  if !(0.0..=24.0).contains(&log.sleep_hours) {
    return Err(format!("Invalid sleep hours: {}", log.sleep_hours));
  }
  ctx
    .controller
    .record_check_in(log)
    .await
    .map_err(|e| format!("Failed to record check-in: {}", e))
}

/// Strategy for a day that already has a check-in
pub async fn get_daily_strategy(ctx: &AppContext, date: NaiveDate) -> Result<Option<DailyStrategy>, String> {
  ctx
    .controller
    .daily_strategy(date)
    .await
    .map_err(|e| format!("Failed to load strategy: {}", e))
}

pub async fn get_insights(ctx: &AppContext) -> Result<Vec<Insight>, String> {
  ctx
    .controller
    .insights()
    .await
    .map_err(|e| format!("Failed to load insights: {}", e))
}

pub async fn record_activity(ctx: &AppContext, entry: ActivityHistoryEntry) -> Result<(), String> {
  if entry.duration <= 0 {
    return Err("Activity duration must be positive".to_string());
  }
  ctx
    .controller
    .record_activity(entry)
    .await
    .map_err(|e| format!("Failed to record activity: {}", e))
}

pub async fn regenerate_plan(ctx: &AppContext) -> Result<GeneratedPlan, String> {
  ctx
    .controller
    .regenerate_plan()
    .await
    .map_err(|e| format!("Failed to regenerate plan: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::fixtures::context;
  use crate::commands::session::restore_session;
  use crate::plan::PlanSource;
  use crate::test_utils::{date, mock_activity, mock_daily_log, mock_onboarded_profile, FakeRecordStore};
  use std::sync::Arc;

  async fn active_context() -> (Arc<FakeRecordStore>, AppContext) {
    let store = Arc::new(FakeRecordStore::signed_in("user-1", mock_onboarded_profile()));
    let ctx = context(store.clone()).await;
    restore_session(&ctx).await.unwrap();
    (store, ctx)
  }

  #[tokio::test]
  async fn test_check_in_then_strategy_lookup() {
    let (_store, ctx) = active_context().await;
    let day = date(2026, 10, 10);

    assert_eq!(get_daily_strategy(&ctx, day).await.unwrap(), None);
    let outcome = record_check_in(&ctx, mock_daily_log(day)).await.unwrap();
    assert_eq!(get_daily_strategy(&ctx, day).await.unwrap(), Some(outcome.strategy));

    let err = record_check_in(&ctx, mock_daily_log(day)).await.unwrap_err();
    assert!(err.contains("already"), "{}", err);
  }

  #[tokio::test]
  async fn test_input_validation() {
    let (_store, ctx) = active_context().await;
    let log = DailyLog {
      sleep_hours: 30.0,
      ..mock_daily_log(date(2026, 10, 10))
    };
    assert!(record_check_in(&ctx, log).await.is_err());
    assert!(record_activity(&ctx, mock_activity(2026, 10, 10, 0)).await.is_err());
    record_activity(&ctx, mock_activity(2026, 10, 10, 600)).await.unwrap();
  }

  #[tokio::test]
  async fn test_regenerate_plan_persists_latest() {
    let (store, ctx) = active_context().await;

    let generated = regenerate_plan(&ctx).await.unwrap();
    assert_eq!(generated.source, PlanSource::Fallback);
    assert_eq!(store.plans("user-1"), vec![generated.plan]);
    assert!(get_insights(&ctx).await.unwrap().is_empty());
  }
}
