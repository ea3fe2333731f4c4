//! Authentication, onboarding and profile commands

use crate::commands::AppContext;
use crate::models::UserProfile;
use crate::plan::GeneratedPlan;
use crate::session::{AppState, AuthView};

/// Restore a persisted session on launch
pub async fn restore_session(ctx: &AppContext) -> Result<AppState, String> {
  Ok(ctx.controller.restore().await)
}

pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<AppState, String> {
  ctx
    .controller
    .login(email.trim(), &password)
    .await
    .map_err(|e| e.to_string())
}

pub async fn register(
  ctx: &AppContext,
  name: String,
  email: String,
  password: String,
) -> Result<AppState, String> {
  if name.trim().is_empty() {
    return Err("Name is required".to_string());
  }
  ctx
    .controller
    .register(name.trim(), email.trim(), &password)
    .await
    .map_err(|e| e.to_string())
}

pub async fn logout(ctx: &AppContext) -> Result<AppState, String> {
  Ok(ctx.controller.logout().await)
}

pub async fn switch_auth_view(ctx: &AppContext, view: AuthView) -> Result<AppState, String> {
  ctx
    .controller
    .switch_auth_view(view)
    .await
    .map_err(|e| e.to_string())
}

/// Submit questionnaire answers and build the first plan
pub async fn complete_onboarding(ctx: &AppContext, answers: UserProfile) -> Result<GeneratedPlan, String> {
  ctx
    .controller
    .complete_onboarding(answers)
    .await
    .map_err(|e| format!("Failed to complete onboarding: {}", e))
}

pub async fn update_profile(ctx: &AppContext, profile: UserProfile) -> Result<AppState, String> {
  ctx
    .controller
    .update_profile(profile)
    .await
    .map_err(|e| format!("Failed to update profile: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::fixtures::context;
  use crate::test_utils::{mock_new_account, mock_onboarded_profile, FakeRecordStore};
  use std::sync::Arc;

  #[tokio::test]
  async fn test_register_then_onboard() {
    let ctx = context(Arc::new(FakeRecordStore::default())).await;
    restore_session(&ctx).await.unwrap();

    let state = register(&ctx, " Ana ".to_string(), "ana@example.com".to_string(), "pw".to_string())
      .await
      .unwrap();
    assert_eq!(state.profile().unwrap().name, "Ana");

    complete_onboarding(&ctx, mock_onboarded_profile()).await.unwrap();
    assert_eq!(ctx.controller.state().await.name(), "active");
  }

  #[tokio::test]
  async fn test_errors_are_flattened_to_strings() {
    let ctx = context(Arc::new(FakeRecordStore::default())).await;
    restore_session(&ctx).await.unwrap();

    let err = login(&ctx, "ana@example.com".to_string(), "wrong".to_string())
      .await
      .unwrap_err();
    assert!(err.contains("Invalid login credentials"), "{}", err);

    let err = register(&ctx, "  ".to_string(), "a@b.c".to_string(), "pw".to_string())
      .await
      .unwrap_err();
    assert_eq!(err, "Name is required");
  }

  #[tokio::test]
  async fn test_onboarding_outside_onboarding_state() {
    let store = Arc::new(FakeRecordStore::signed_in("user-1", mock_onboarded_profile()));
    let ctx = context(store).await;
    restore_session(&ctx).await.unwrap();

    let err = complete_onboarding(&ctx, mock_new_account()).await.unwrap_err();
    assert!(err.starts_with("Failed to complete onboarding"));
  }
}
