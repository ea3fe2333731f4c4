pub mod daily;
pub mod history;
pub mod plan;
pub mod profile;
pub mod record;

pub use daily::{
  ActivityTrend, BmiTrend, CyclePhase, DailyLog, DailyStrategy, DietCompliance, Mood,
  NutritionAction, NutritionAdjustment, RuleTier, StrategySignals, WorkoutSuggestion, WorkoutType,
};
pub use history::{
  ActivityHistoryEntry, BmiHistoryEntry, Insight, InsightCategory, InsightType,
};
pub use plan::{Macros, Meal, NutritionInfo, PersonalizedPlan, PlanRecord};
pub use profile::{
  ActivityLevel, CookingHabit, DietQuality, Goal, MealPrepPreference, Rating, Sex, SleepQuality,
  SubscriptionStatus, UserProfile,
};
pub use record::ProfileRecord;
