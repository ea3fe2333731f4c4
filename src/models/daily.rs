use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::profile::{Rating, SleepQuality};

/// ---------------------------------------------------------------------------
/// Daily Check-in
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
  Feliz,
  Ansioso,
  Estressado,
  Desanimado,
  Neutro,
}

impl Mood {
  pub fn as_str(&self) -> &'static str {
    match self {
      Mood::Feliz => "Feliz",
      Mood::Ansioso => "Ansioso",
      Mood::Estressado => "Estressado",
      Mood::Desanimado => "Desanimado",
      Mood::Neutro => "Neutro",
    }
  }

  pub fn is_negative(&self) -> bool {
    matches!(self, Mood::Estressado | Mood::Desanimado)
  }
}

impl std::str::FromStr for Mood {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Feliz" => Ok(Self::Feliz),
      "Ansioso" => Ok(Self::Ansioso),
      "Estressado" => Ok(Self::Estressado),
      "Desanimado" => Ok(Self::Desanimado),
      "Neutro" => Ok(Self::Neutro),
      _ => Err(format!("Unknown mood: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietCompliance {
  #[serde(rename = "Segui 100%")]
  FullyOnPlan,
  #[serde(rename = "Deslize leve")]
  MinorSlip,
  #[serde(rename = "Chutei o balde")]
  OffPlan,
}

impl DietCompliance {
  pub fn as_str(&self) -> &'static str {
    match self {
      DietCompliance::FullyOnPlan => "Segui 100%",
      DietCompliance::MinorSlip => "Deslize leve",
      DietCompliance::OffPlan => "Chutei o balde",
    }
  }
}

impl std::str::FromStr for DietCompliance {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Segui 100%" => Ok(Self::FullyOnPlan),
      "Deslize leve" => Ok(Self::MinorSlip),
      "Chutei o balde" => Ok(Self::OffPlan),
      _ => Err(format!("Unknown diet compliance: {}", s)),
    }
  }
}

/// One self-reported check-in per user per calendar date. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
  pub date: NaiveDate,
  pub sleep_hours: f64,
  pub sleep_quality: SleepQuality,
  pub mood: Mood,
  pub energy_level: Rating,
  /// 1-28
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub menstrual_day: Option<u8>,
  pub did_workout_yesterday: bool,
  pub diet_compliance_yesterday: DietCompliance,
}

/// ---------------------------------------------------------------------------
/// Daily Strategy
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutritionAction {
  Manter,
  #[serde(rename = "Reduzir Calorias")]
  ReduzirCalorias,
  #[serde(rename = "Aumentar Carboidratos")]
  AumentarCarboidratos,
  #[serde(rename = "Aumentar Proteína")]
  AumentarProteina,
  #[serde(rename = "Hidratação Forçada")]
  HidratacaoForcada,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutType {
  #[serde(rename = "Treino Original")]
  TreinoOriginal,
  #[serde(rename = "HIIT Rápido")]
  HiitRapido,
  #[serde(rename = "Yoga/Alongamento")]
  YogaAlongamento,
  #[serde(rename = "Caminhada Leve")]
  CaminhadaLeve,
  #[serde(rename = "Descanso Total")]
  DescansoTotal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionAdjustment {
  pub action: NutritionAction,
  pub reason: String,
  pub calories_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSuggestion {
  #[serde(rename = "type")]
  pub kind: WorkoutType,
  pub duration: String,
  pub reason: String,
}

/// Rule tier that produced a strategy, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTier {
  Safety,
  Cycle,
  Compliance,
  Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
  Menstrual,
  Follicular,
  Ovulatory,
  EarlyLuteal,
  LateLuteal,
}

impl CyclePhase {
  /// Phase for a day on the 28-day scale; None outside 1-28
  pub fn from_day(day: u8) -> Option<Self> {
    match day {
      1..=5 => Some(CyclePhase::Menstrual),
      6..=13 => Some(CyclePhase::Follicular),
      14..=16 => Some(CyclePhase::Ovulatory),
      17..=21 => Some(CyclePhase::EarlyLuteal),
      22..=28 => Some(CyclePhase::LateLuteal),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiTrend {
  Rising,
  Stable,
  Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTrend {
  Increasing,
  Steady,
  Decreasing,
}

/// Context signals the engine read, echoed back so a strategy explains itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySignals {
  pub cycle_phase: Option<CyclePhase>,
  pub bmi_trend: Option<BmiTrend>,
  pub activity_trend: Option<ActivityTrend>,
}

/// Derived recommendation for one day. Pure function of its inputs; any stored copy is a cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStrategy {
  pub date: NaiveDate,
  pub focus_of_the_day: String,
  pub nutrition_adjustment: NutritionAdjustment,
  pub workout_suggestion: WorkoutSuggestion,
  pub smart_tip: String,
  pub mood_hack: String,
  pub tier: RuleTier,
  pub signals: StrategySignals,
}
