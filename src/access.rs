//! Access gates: subscription tier and mandatory onboarding
//!
//! Both are pure functions of their inputs. Callers re-evaluate them on every
//! gated access since the subscription boundary is a moving timestamp.

use chrono::{DateTime, Utc};

use crate::models::{SubscriptionStatus, UserProfile};

/// ---------------------------------------------------------------------------
/// Subscription Policy
/// ---------------------------------------------------------------------------

/// Premium features are unlocked while the date backing the current status is strictly in the future.
/// A missing date fails closed; the boundary instant itself is already inactive.
pub fn is_subscription_active(profile: &UserProfile, now: DateTime<Utc>) -> bool {
  is_active(
    profile.subscription_status,
    profile.trial_end_date,
    profile.subscription_end_date,
    now,
  )
}

pub fn is_active(
  status: SubscriptionStatus,
  trial_end_date: Option<DateTime<Utc>>,
  subscription_end_date: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> bool {
  let boundary = match status {
    SubscriptionStatus::FreeTrial => trial_end_date,
    SubscriptionStatus::Active => subscription_end_date,
    SubscriptionStatus::Expired => None,
  };
  boundary.map_or(false, |end| end > now)
}

/// ---------------------------------------------------------------------------
/// Onboarding Gate
/// ---------------------------------------------------------------------------

/// True when either mandatory onboarding answer (goal, weight) is missing
pub fn needs_onboarding(profile: &UserProfile) -> bool {
  profile.goal.is_none() || profile.known_weight().is_none()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Goal;
  use crate::test_utils::{mock_new_account, mock_onboarded_profile};
  use chrono::Duration;

  #[test]
  fn test_trial_active_until_end_date() {
    let t = Utc::now();
    let mut profile = mock_new_account();
    profile.subscription_status = SubscriptionStatus::FreeTrial;
    profile.trial_end_date = Some(t + Duration::days(5));

    assert!(is_subscription_active(&profile, t + Duration::days(1)));
    assert!(!is_subscription_active(&profile, t + Duration::days(6)));
  }

  #[test]
  fn test_boundary_instant_is_inactive() {
    let end = Utc::now();
    assert!(!is_active(SubscriptionStatus::FreeTrial, Some(end), None, end));
    assert!(!is_active(SubscriptionStatus::Active, None, Some(end), end));
    assert!(is_active(
      SubscriptionStatus::Active,
      None,
      Some(end),
      end - Duration::milliseconds(1)
    ));
  }

  #[test]
  fn test_status_uses_only_its_own_date() {
    let now = Utc::now();
    let future = Some(now + Duration::days(30));

    // Trial status ignores the paid end date and vice versa
    assert!(!is_active(SubscriptionStatus::FreeTrial, None, future, now));
    assert!(!is_active(SubscriptionStatus::Active, future, None, now));
    assert!(is_active(SubscriptionStatus::Active, None, future, now));
  }

  #[test]
  fn test_expired_is_never_active() {
    let now = Utc::now();
    let future = Some(now + Duration::days(30));
    assert!(!is_active(SubscriptionStatus::Expired, future, future, now));
  }

  #[test]
  fn test_needs_onboarding_matrix() {
    let base = mock_onboarded_profile();
    assert!(!needs_onboarding(&base));

    for (goal, weight) in [
      (None, None),
      (Some(Goal::Definir), None),
      (None, Some(70.0)),
    ] {
      let mut p = base.clone();
      p.goal = goal;
      p.weight = weight;
      assert!(needs_onboarding(&p), "goal={:?} weight={:?}", goal, weight);
    }
  }

  #[test]
  fn test_zero_weight_counts_as_missing() {
    let mut profile = mock_onboarded_profile();
    profile.weight = Some(0.0);
    assert!(needs_onboarding(&profile));
  }
}
