use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
  pub calories: f64,
  pub protein: f64,
  pub carbohydrates: f64,
  pub fats: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
  pub title: String,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub substitutions: Option<Vec<String>>,
  pub nutrition: NutritionInfo,
}

/// Daily macro targets in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macros {
  pub protein: f64,
  pub carbs: f64,
  pub fats: f64,
}

/// Onboarding-time baseline. Replaced wholesale on regeneration, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedPlan {
  pub daily_calories: f64,
  pub macros: Macros,
  pub meal_plan: Vec<Meal>,
  pub exercise_routine: Vec<String>,
  #[serde(default)]
  pub ai_tips: Vec<String>,
}

impl PersonalizedPlan {
  /// Summed nutrition across the meal plan
  pub fn meal_totals(&self) -> NutritionInfo {
    self.meal_plan.iter().fold(
      NutritionInfo {
        calories: 0.0,
        protein: 0.0,
        carbohydrates: 0.0,
        fats: 0.0,
      },
      |acc, meal| NutritionInfo {
        calories: acc.calories + meal.nutrition.calories,
        protein: acc.protein + meal.nutrition.protein,
        carbohydrates: acc.carbohydrates + meal.nutrition.carbohydrates,
        fats: acc.fats + meal.nutrition.fats,
      },
    )
  }
}

/// Plan as stored in the record store: latest `created_at` per user is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
  pub user_id: String,
  pub plan_data: PersonalizedPlan,
  pub created_at: Option<DateTime<Utc>>,
}
