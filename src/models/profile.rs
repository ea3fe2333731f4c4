use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Onboarding Answers
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
  Emagrecer,
  Definir,
  #[serde(rename = "Saúde")]
  Saude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
  Male,
  Female,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
  Sedentary,
  Light,
  Moderate,
  Active,
  VeryActive,
}

impl ActivityLevel {
  /// Infer a level from weekly training days when none was answered
  pub fn from_training_days(days: u8) -> Self {
    match days {
      0 => ActivityLevel::Sedentary,
      1..=2 => ActivityLevel::Light,
      3..=4 => ActivityLevel::Moderate,
      5..=6 => ActivityLevel::Active,
      _ => ActivityLevel::VeryActive,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietQuality {
  Boa,
  #[serde(rename = "Média")]
  Media,
  Ruim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepQuality {
  Bom,
  #[serde(rename = "Médio")]
  Medio,
  Ruim,
}

impl SleepQuality {
  pub fn as_str(&self) -> &'static str {
    match self {
      SleepQuality::Bom => "Bom",
      SleepQuality::Medio => "Médio",
      SleepQuality::Ruim => "Ruim",
    }
  }
}

impl std::str::FromStr for SleepQuality {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Bom" => Ok(Self::Bom),
      "Médio" => Ok(Self::Medio),
      "Ruim" => Ok(Self::Ruim),
      _ => Err(format!("Unknown sleep quality: {}", s)),
    }
  }
}

/// Three-step rating used for stress, motivation and daily energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
  Baixo,
  #[serde(rename = "Médio")]
  Medio,
  Alto,
}

impl Rating {
  pub fn as_str(&self) -> &'static str {
    match self {
      Rating::Baixo => "Baixo",
      Rating::Medio => "Médio",
      Rating::Alto => "Alto",
    }
  }
}

impl std::str::FromStr for Rating {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Baixo" => Ok(Self::Baixo),
      "Médio" => Ok(Self::Medio),
      "Alto" => Ok(Self::Alto),
      _ => Err(format!("Unknown rating: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealPrepPreference {
  #[serde(rename = "Rápidas")]
  Rapidas,
  Elaboradas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookingHabit {
  Cozinho,
  #[serde(rename = "Como fora")]
  ComoFora,
}

/// ---------------------------------------------------------------------------
/// Subscription
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
  FreeTrial,
  Active,
  Expired,
}

impl std::fmt::Display for SubscriptionStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::FreeTrial => write!(f, "free_trial"),
      Self::Active => write!(f, "active"),
      Self::Expired => write!(f, "expired"),
    }
  }
}

impl std::str::FromStr for SubscriptionStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "free_trial" => Ok(Self::FreeTrial),
      "active" => Ok(Self::Active),
      "expired" => Ok(Self::Expired),
      _ => Err(format!("Unknown subscription status: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// User Profile
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub name: String,
  pub email: String,

  // About you
  pub goal: Option<Goal>,
  pub age: Option<u32>,
  pub sex: Option<Sex>,
  /// Centimetres
  pub height: Option<f64>,
  /// Kilograms
  pub weight: Option<f64>,
  pub goal_weight: Option<f64>,

  // Eating
  pub diet_quality: Option<DietQuality>,
  pub dietary_restrictions: Option<String>,
  pub emotional_eating: Option<bool>,

  // Training
  pub currently_training: Option<bool>,
  /// 1-7
  pub training_days: Option<u8>,
  pub activity_level: Option<ActivityLevel>,

  // Routine
  pub sleep_quality: Option<SleepQuality>,
  pub stress_level: Option<Rating>,

  // Preferences
  pub meal_prep_preference: Option<MealPrepPreference>,
  pub cooking_habit: Option<CookingHabit>,

  // Commitment
  pub motivation_level: Option<Rating>,
  pub willing_to_track: Option<bool>,

  // Cycle tracking
  pub tracks_period: Option<bool>,
  pub last_period_date: Option<NaiveDate>,
  pub cycle_length: Option<u32>,

  // Gamification
  pub points: u32,
  pub level: u32,
  pub streak_days: u32,

  pub subscription_status: SubscriptionStatus,
  pub trial_end_date: Option<DateTime<Utc>>,
  pub subscription_end_date: Option<DateTime<Utc>>,
}

impl UserProfile {
  /// Fresh profile for a just-registered account, on a free trial ending at `trial_end`
  pub fn new_account(name: &str, email: &str, trial_end: DateTime<Utc>) -> Self {
    Self {
      name: name.to_string(),
      email: email.to_string(),
      goal: None,
      age: None,
      sex: None,
      height: None,
      weight: None,
      goal_weight: None,
      diet_quality: None,
      dietary_restrictions: None,
      emotional_eating: None,
      currently_training: None,
      training_days: None,
      activity_level: None,
      sleep_quality: None,
      stress_level: None,
      meal_prep_preference: None,
      cooking_habit: None,
      motivation_level: None,
      willing_to_track: None,
      tracks_period: None,
      last_period_date: None,
      cycle_length: None,
      points: 0,
      level: 1,
      streak_days: 0,
      subscription_status: SubscriptionStatus::FreeTrial,
      trial_end_date: Some(trial_end),
      subscription_end_date: None,
    }
  }

  /// Weight counts as answered only when it is a positive number
  pub fn known_weight(&self) -> Option<f64> {
    self.weight.filter(|w| w.is_finite() && *w > 0.0)
  }

  /// Activity level as answered, else inferred from training days
  pub fn effective_activity_level(&self) -> ActivityLevel {
    self
      .activity_level
      .or_else(|| self.training_days.map(ActivityLevel::from_training_days))
      .unwrap_or(ActivityLevel::Sedentary)
  }

  pub fn tracks_cycle(&self) -> bool {
    self.tracks_period.unwrap_or(false)
  }
}
