//! Check-in rewards: points, streak and level

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::UserProfile;

pub const POINTS_PER_CHECK_IN: u32 = 10;
pub const POINTS_PER_LEVEL: u32 = 100;

/// Result of crediting one check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInReward {
  pub points: u32,
  pub streak_days: u32,
  pub level: u32,
  pub leveled_up: bool,
}

pub fn level_for(points: u32) -> u32 {
  points / POINTS_PER_LEVEL + 1
}

/// Credit a check-in for `date`. `previous_log_date` is the newest log before it.
pub fn reward_check_in(
  profile: &UserProfile,
  date: NaiveDate,
  previous_log_date: Option<NaiveDate>,
) -> CheckInReward {
  let points = profile.points.saturating_add(POINTS_PER_CHECK_IN);
  let continues = previous_log_date.is_some_and(|prev| date.pred_opt() == Some(prev));
  let streak_days = if continues {
    profile.streak_days.saturating_add(1).max(2)
  } else {
    1
  };
  let level = level_for(points);

  CheckInReward {
    points,
    streak_days,
    level,
    leveled_up: level > profile.level,
  }
}

pub fn apply_reward(profile: &mut UserProfile, reward: CheckInReward) {
  profile.points = reward.points;
  profile.streak_days = reward.streak_days;
  profile.level = reward.level;
}
