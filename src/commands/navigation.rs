//! View navigation and subscription status

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::access::is_subscription_active;
use crate::commands::AppContext;
use crate::models::SubscriptionStatus;
use crate::router::{Screen, View};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatus {
  pub premium_unlocked: bool,
  pub status: SubscriptionStatus,
  pub trial_end_date: Option<DateTime<Utc>>,
  pub subscription_end_date: Option<DateTime<Utc>>,
}

/// Navigate by view name ("dashboard", "calorie", ...)
pub async fn navigate(ctx: &AppContext, view: String) -> Result<Screen, String> {
  let view: View = view.parse()?;
  ctx
    .controller
    .navigate(view)
    .await
    .map_err(|e| e.to_string())
}

/// Paywall call to action
pub async fn open_upgrade(ctx: &AppContext) -> Result<Screen, String> {
  ctx.controller.open_upgrade().await.map_err(|e| e.to_string())
}

/// Enter the view the paywall blocked, once the subscription allows it
pub async fn resume_pending(ctx: &AppContext) -> Result<Option<Screen>, String> {
  ctx.controller.resume_pending().await.map_err(|e| e.to_string())
}

pub async fn get_access_status(ctx: &AppContext) -> Result<AccessStatus, String> {
  let state = ctx.controller.state().await;
  let profile = state.profile().ok_or_else(|| "Not signed in".to_string())?;
  Ok(AccessStatus {
    premium_unlocked: is_subscription_active(profile, Utc::now()),
    status: profile.subscription_status,
    trial_end_date: profile.trial_end_date,
    subscription_end_date: profile.subscription_end_date,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::fixtures::context;
  use crate::commands::session::restore_session;
  use crate::test_utils::{mock_onboarded_profile, FakeRecordStore};
  use std::sync::Arc;

  #[tokio::test]
  async fn test_navigate_by_name() {
    let store = Arc::new(FakeRecordStore::signed_in("user-1", mock_onboarded_profile()));
    let ctx = context(store).await;
    restore_session(&ctx).await.unwrap();

    // Trial is running, so premium views open
    assert_eq!(
      navigate(&ctx, "meal".to_string()).await.unwrap(),
      Screen::View { view: View::Meal }
    );
    assert!(navigate(&ctx, "settings".to_string()).await.is_err());

    let status = get_access_status(&ctx).await.unwrap();
    assert!(status.premium_unlocked);
    assert_eq!(status.status, SubscriptionStatus::FreeTrial);
  }

  #[tokio::test]
  async fn test_access_status_requires_session() {
    let ctx = context(Arc::new(FakeRecordStore::default())).await;
    restore_session(&ctx).await.unwrap();

    assert_eq!(get_access_status(&ctx).await.unwrap_err(), "Not signed in");
    assert!(open_upgrade(&ctx).await.is_err());
  }
}
