//! Wire codec between the record store's snake_case profile rows and `UserProfile`
//!
//! This is the only place field names are translated. Unknown or malformed
//! values decode as absent instead of failing the whole row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::profile::{
  ActivityLevel, CookingHabit, DietQuality, Goal, MealPrepPreference, Rating, Sex, SleepQuality,
  SubscriptionStatus, UserProfile,
};

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Profile row as exchanged with the record store. Also used as a partial
/// patch: `None` fields are left out of the JSON body entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub goal: Option<Goal>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub age: Option<u32>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub height: Option<f64>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub weight: Option<f64>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub goal_weight: Option<f64>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub sex: Option<Sex>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub activity_level: Option<ActivityLevel>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub diet_quality: Option<DietQuality>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dietary_restrictions: Option<String>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub emotional_eating: Option<bool>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub currently_training: Option<bool>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub training_days: Option<u8>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub sleep_quality: Option<SleepQuality>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub stress_level: Option<Rating>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub meal_prep_preference: Option<MealPrepPreference>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub cooking_habit: Option<CookingHabit>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub motivation_level: Option<Rating>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub willing_to_track: Option<bool>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub tracks_period: Option<bool>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub last_period_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub cycle_length: Option<u32>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub points: Option<u32>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub level: Option<u32>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub streak_days: Option<u32>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub subscription_status: Option<SubscriptionStatus>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub trial_end_date: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub subscription_end_date: Option<DateTime<Utc>>,
}

impl From<ProfileRecord> for UserProfile {
  fn from(r: ProfileRecord) -> Self {
    Self {
      name: r.name.unwrap_or_default(),
      email: r.email.unwrap_or_default(),
      goal: r.goal,
      age: r.age,
      sex: r.sex,
      height: r.height,
      weight: r.weight,
      goal_weight: r.goal_weight,
      diet_quality: r.diet_quality,
      dietary_restrictions: r.dietary_restrictions,
      emotional_eating: r.emotional_eating,
      currently_training: r.currently_training,
      training_days: r.training_days,
      activity_level: r.activity_level,
      sleep_quality: r.sleep_quality,
      stress_level: r.stress_level,
      meal_prep_preference: r.meal_prep_preference,
      cooking_habit: r.cooking_habit,
      motivation_level: r.motivation_level,
      willing_to_track: r.willing_to_track,
      tracks_period: r.tracks_period,
      last_period_date: r.last_period_date,
      cycle_length: r.cycle_length,
      points: r.points.unwrap_or(0),
      level: r.level.unwrap_or(1),
      streak_days: r.streak_days.unwrap_or(0),
      // Unknown status fails closed
      subscription_status: r.subscription_status.unwrap_or(SubscriptionStatus::Expired),
      trial_end_date: r.trial_end_date,
      subscription_end_date: r.subscription_end_date,
    }
  }
}

impl From<&UserProfile> for ProfileRecord {
  fn from(p: &UserProfile) -> Self {
    Self {
      id: None,
      name: Some(p.name.clone()),
      email: Some(p.email.clone()),
      goal: p.goal,
      age: p.age,
      height: p.height,
      weight: p.weight,
      goal_weight: p.goal_weight,
      sex: p.sex,
      activity_level: p.activity_level,
      diet_quality: p.diet_quality,
      dietary_restrictions: p.dietary_restrictions.clone(),
      emotional_eating: p.emotional_eating,
      currently_training: p.currently_training,
      training_days: p.training_days,
      sleep_quality: p.sleep_quality,
      stress_level: p.stress_level,
      meal_prep_preference: p.meal_prep_preference,
      cooking_habit: p.cooking_habit,
      motivation_level: p.motivation_level,
      willing_to_track: p.willing_to_track,
      tracks_period: p.tracks_period,
      last_period_date: p.last_period_date,
      cycle_length: p.cycle_length,
      points: Some(p.points),
      level: Some(p.level),
      streak_days: Some(p.streak_days),
      subscription_status: Some(p.subscription_status),
      trial_end_date: p.trial_end_date,
      subscription_end_date: p.subscription_end_date,
    }
  }
}

impl ProfileRecord {
  /// Patch for body measurements edited from the profile screen
  pub fn body_patch(p: &UserProfile) -> Self {
    Self {
      weight: p.weight,
      goal_weight: p.goal_weight,
      height: p.height,
      age: p.age,
      activity_level: p.activity_level,
      sex: p.sex,
      ..Default::default()
    }
  }

  /// Patch with every onboarding answer
  pub fn onboarding_patch(p: &UserProfile) -> Self {
    let full = Self::from(p);
    Self {
      id: None,
      name: None,
      email: None,
      points: None,
      level: None,
      streak_days: None,
      subscription_status: None,
      trial_end_date: None,
      subscription_end_date: None,
      ..full
    }
  }

  /// Patch for points, level and streak
  pub fn gamification_patch(p: &UserProfile) -> Self {
    Self {
      points: Some(p.points),
      level: Some(p.level),
      streak_days: Some(p.streak_days),
      ..Default::default()
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::mock_onboarded_profile;

  #[test]
  fn test_profile_round_trip_through_wire() {
    let mut profile = mock_onboarded_profile();
    profile.last_period_date = NaiveDate::from_ymd_opt(2026, 10, 1);
    profile.subscription_end_date = Some(Utc::now());

    let wire = serde_json::to_string(&ProfileRecord::from(&profile)).unwrap();
    let record: ProfileRecord = serde_json::from_str(&wire).unwrap();
    let decoded = UserProfile::from(record);

    assert_eq!(decoded, profile);
  }

  #[test]
  fn test_wire_uses_snake_case_names() {
    let profile = mock_onboarded_profile();
    let json = serde_json::to_value(ProfileRecord::from(&profile)).unwrap();

    assert!(json.get("goal_weight").is_some());
    assert!(json.get("activity_level").is_some());
    assert_eq!(json["subscription_status"], "free_trial");
    assert_eq!(json["goal"], "Emagrecer");
    assert!(json.get("goalWeight").is_none());
  }

  #[test]
  fn test_malformed_values_decode_as_absent() {
    let json = r#"{
      "name": "Ana",
      "email": "ana@example.com",
      "goal": "Ficar Forte",
      "weight": "setenta",
      "subscription_status": "lifetime",
      "trial_end_date": "not a date"
    }"#;
    let record: ProfileRecord = serde_json::from_str(json).unwrap();
    let profile = UserProfile::from(record);

    assert_eq!(profile.goal, None);
    assert_eq!(profile.weight, None);
    assert_eq!(profile.trial_end_date, None);
    assert_eq!(profile.subscription_status, SubscriptionStatus::Expired);
    assert_eq!(profile.level, 1);
  }

  #[test]
  fn test_body_patch_omits_untouched_fields() {
    let mut profile = mock_onboarded_profile();
    profile.goal_weight = None;

    let json = serde_json::to_value(ProfileRecord::body_patch(&profile)).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();

    assert!(keys.iter().any(|k| *k == "weight"));
    assert!(!keys.iter().any(|k| *k == "goal_weight"));
    assert!(!keys.iter().any(|k| *k == "goal"));
    assert!(!keys.iter().any(|k| *k == "name"));
  }

  #[test]
  fn test_onboarding_patch_leaves_subscription_alone() {
    let profile = mock_onboarded_profile();
    let patch = ProfileRecord::onboarding_patch(&profile);

    assert_eq!(patch.goal, profile.goal);
    assert_eq!(patch.training_days, profile.training_days);
    assert!(patch.subscription_status.is_none());
    assert!(patch.trial_end_date.is_none());
    assert!(patch.points.is_none());
  }
}
