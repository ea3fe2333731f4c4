use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiHistoryEntry {
  pub bmi: f64,
  pub interpretation: String,
  /// Kilograms
  pub weight: f64,
  /// Centimetres
  pub height: f64,
  pub date: DateTime<Utc>,
}

impl BmiHistoryEntry {
  /// Build an entry from a weight/height observation. None when height is not positive.
  pub fn observe(weight: f64, height: f64, date: DateTime<Utc>) -> Option<Self> {
    if height <= 0.0 || weight <= 0.0 {
      return None;
    }
    let metres = height / 100.0;
    let bmi = ((weight / (metres * metres)) * 10.0).round() / 10.0;
    Some(Self {
      bmi,
      interpretation: interpret_bmi(bmi).to_string(),
      weight,
      height,
      date,
    })
  }
}

/// WHO adult BMI bands
pub fn interpret_bmi(bmi: f64) -> &'static str {
  match bmi {
    b if b < 18.5 => "Abaixo do peso",
    b if b < 25.0 => "Peso normal",
    b if b < 30.0 => "Sobrepeso",
    _ => "Obesidade",
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityHistoryEntry {
  /// Kilometres
  pub distance: f64,
  /// Seconds
  pub duration: i64,
  pub date: DateTime<Utc>,
  /// (lat, lng) samples
  #[serde(default)]
  pub path: Vec<(f64, f64)>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub calories: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avg_pace: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Insights
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
  Pattern,
  Warning,
  Achievement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
  Sleep,
  Diet,
  Stress,
  Activity,
}

/// Read-only derived alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: InsightType,
  pub category: InsightCategory,
  pub title: String,
  pub description: String,
  pub recommendation: String,
}
