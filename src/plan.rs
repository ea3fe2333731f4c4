//! Plan generator: onboarding-time calorie, macro, meal and exercise targets
//!
//! Numbers are deterministic for a given profile:
//! - Energy: Mifflin-St Jeor BMR x activity factor, adjusted by goal
//! - Macros: fixed percentage split per goal
//! - Meals: fixed calorie shares; the last meal absorbs rounding
//!
//! The advisor may reword meals and tips but never changes a number. When it
//! is missing, slow, or returns something unusable the fallback text is kept.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::access::needs_onboarding;
use crate::advisor::{Advisor, MealSlot, PlanContent, PlanContentRequest};
use crate::models::{
  ActivityLevel, Goal, Macros, Meal, MealPrepPreference, NutritionInfo, PersonalizedPlan, Rating,
  Sex, SleepQuality, UserProfile,
};

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

pub const CALORIE_FLOOR: f64 = 1200.0;

/// Max relative gap between summed meal macros and the daily targets
pub const MEAL_TOLERANCE: f64 = 0.05;

const DEFAULT_AGE: u32 = 30;
const DEFAULT_HEIGHT_CM: f64 = 170.0;

/// (slot name, share of daily calories)
const MEAL_SLOTS: [(&str, f64); 4] = [
  ("Café da manhã", 0.25),
  ("Almoço", 0.35),
  ("Lanche", 0.15),
  ("Jantar", 0.25),
];

/// ---------------------------------------------------------------------------
/// Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
  /// Generating a plan before onboarding finished is a caller bug, not a runtime condition
  #[error("Invalid profile: {0}")]
  InvalidProfile(String),
}

/// ---------------------------------------------------------------------------
/// Energy and Macros
/// ---------------------------------------------------------------------------

impl ActivityLevel {
  pub fn factor(&self) -> f64 {
    match self {
      ActivityLevel::Sedentary => 1.2,
      ActivityLevel::Light => 1.375,
      ActivityLevel::Moderate => 1.55,
      ActivityLevel::Active => 1.725,
      ActivityLevel::VeryActive => 1.9,
    }
  }

  /// Default weekly sessions when training days were not answered
  pub fn default_training_days(&self) -> u8 {
    match self {
      ActivityLevel::Sedentary => 2,
      ActivityLevel::Light => 3,
      ActivityLevel::Moderate => 4,
      ActivityLevel::Active => 5,
      ActivityLevel::VeryActive => 6,
    }
  }

  pub fn session_minutes(&self) -> u32 {
    match self {
      ActivityLevel::Sedentary => 30,
      ActivityLevel::Light => 35,
      ActivityLevel::Moderate => 45,
      ActivityLevel::Active => 50,
      ActivityLevel::VeryActive => 60,
    }
  }
}

impl Goal {
  /// Multiplier applied to maintenance calories
  pub fn calorie_adjustment(&self) -> f64 {
    match self {
      Goal::Emagrecer => 0.80,
      Goal::Definir => 1.05,
      Goal::Saude => 1.0,
    }
  }

  /// (protein, carbs, fats) share of calories
  pub fn macro_ratios(&self) -> (f64, f64, f64) {
    match self {
      Goal::Emagrecer => (0.30, 0.40, 0.30),
      Goal::Definir => (0.35, 0.40, 0.25),
      Goal::Saude => (0.25, 0.50, 0.25),
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Goal::Emagrecer => "Emagrecer",
      Goal::Definir => "Definir",
      Goal::Saude => "Saúde",
    }
  }
}

/// Basal metabolic rate (Mifflin-St Jeor). None without a known weight.
pub fn basal_metabolic_rate(profile: &UserProfile) -> Option<f64> {
  let weight = profile.known_weight()?;
  let height = profile.height.filter(|h| *h > 0.0).unwrap_or(DEFAULT_HEIGHT_CM);
  let age = profile.age.unwrap_or(DEFAULT_AGE) as f64;
  let sex_offset = match profile.sex {
    Some(Sex::Male) => 5.0,
    Some(Sex::Female) => -161.0,
    Some(Sex::Other) | None => -78.0,
  };
  Some(10.0 * weight + 6.25 * height - 5.0 * age + sex_offset)
}

/// Daily calorie target, rounded to 10 kcal and never below the floor
pub fn calorie_target(profile: &UserProfile) -> Option<f64> {
  let bmr = basal_metabolic_rate(profile)?;
  let maintenance = bmr * profile.effective_activity_level().factor();
  let adjusted = maintenance * profile.goal.map_or(1.0, |g| g.calorie_adjustment());
  Some(((adjusted / 10.0).round() * 10.0).max(CALORIE_FLOOR))
}

pub fn macro_split(goal: Goal, calories: f64) -> Macros {
  let (protein, carbs, fats) = goal.macro_ratios();
  Macros {
    protein: (calories * protein / 4.0).round(),
    carbs: (calories * carbs / 4.0).round(),
    fats: (calories * fats / 9.0).round(),
  }
}

/// ---------------------------------------------------------------------------
/// Meals
/// ---------------------------------------------------------------------------

/// Split daily targets across meal slots; summed values equal the targets exactly
fn split_meals(calories: f64, macros: &Macros) -> Vec<NutritionInfo> {
  let mut remaining = NutritionInfo {
    calories,
    protein: macros.protein,
    carbohydrates: macros.carbs,
    fats: macros.fats,
  };
  let mut meals = Vec::with_capacity(MEAL_SLOTS.len());

  for (idx, (_, share)) in MEAL_SLOTS.iter().enumerate() {
    if idx == MEAL_SLOTS.len() - 1 {
      meals.push(remaining.clone());
      break;
    }
    let portion = NutritionInfo {
      calories: (calories * share).round(),
      protein: (macros.protein * share).round(),
      carbohydrates: (macros.carbs * share).round(),
      fats: (macros.fats * share).round(),
    };
    remaining.calories -= portion.calories;
    remaining.protein -= portion.protein;
    remaining.carbohydrates -= portion.carbohydrates;
    remaining.fats -= portion.fats;
    meals.push(portion);
  }

  meals
}

fn meal_templates(goal: Goal, prep: MealPrepPreference) -> [(&'static str, &'static str); 4] {
  match (goal, prep) {
    (Goal::Emagrecer, MealPrepPreference::Rapidas) => [
      ("Omelete de claras com espinafre", "2 ovos e 2 claras mexidos com espinafre e 1 fatia de pão integral."),
      ("Frango grelhado com salada", "Peito de frango grelhado, arroz integral, feijão e salada verde à vontade."),
      ("Iogurte com frutas vermelhas", "Iogurte natural desnatado com morangos e 1 colher de chia."),
      ("Peixe com legumes no vapor", "Tilápia grelhada com abobrinha, cenoura e brócolis no vapor."),
    ],
    (Goal::Emagrecer, MealPrepPreference::Elaboradas) => [
      ("Panqueca de aveia com banana", "Panqueca de aveia, ovo e banana com canela e pasta de amendoim."),
      ("Escondidinho de frango com abóbora", "Frango desfiado coberto com purê de abóbora cabotiá e salada de folhas."),
      ("Smoothie verde", "Couve, abacaxi, gengibre e iogurte natural batidos com gelo."),
      ("Salmão ao forno com ervas", "Salmão assado com ervas finas, quinoa e aspargos grelhados."),
    ],
    (Goal::Definir, MealPrepPreference::Rapidas) => [
      ("Ovos mexidos com tapioca", "3 ovos mexidos, tapioca pequena e 1 fruta."),
      ("Carne magra com arroz e feijão", "Patinho grelhado, arroz, feijão e legumes refogados."),
      ("Shake de proteína com aveia", "Whey ou iogurte proteico batido com aveia e banana."),
      ("Frango com batata-doce", "Peito de frango grelhado, batata-doce assada e salada."),
    ],
    (Goal::Definir, MealPrepPreference::Elaboradas) => [
      ("Crepioca recheada", "Crepioca de ovo com frango desfiado, queijo branco e tomate."),
      ("Strogonoff fit de carne", "Strogonoff de patinho com iogurte, arroz integral e brócolis."),
      ("Overnight oats proteico", "Aveia deixada de molho com leite, whey e frutas vermelhas."),
      ("Tilápia em crosta de castanhas", "Tilápia assada em crosta de castanhas com purê de mandioquinha."),
    ],
    (Goal::Saude, MealPrepPreference::Rapidas) => [
      ("Pão integral com queijo branco", "Pão integral, queijo branco, mamão e café sem açúcar."),
      ("Prato colorido", "Arroz, feijão, uma proteína grelhada e metade do prato com vegetais."),
      ("Fruta com castanhas", "1 fruta da estação e um punhado de castanhas."),
      ("Sopa de legumes com frango", "Sopa de legumes variados com frango desfiado."),
    ],
    (Goal::Saude, MealPrepPreference::Elaboradas) => [
      ("Cuscuz nordestino com ovo", "Cuscuz de milho com ovo, tomate e coentro."),
      ("Moqueca de peixe leve", "Moqueca de peixe com pouco azeite de dendê, arroz e pirão."),
      ("Bolo de banana com aveia", "Fatia de bolo caseiro de banana e aveia sem açúcar refinado."),
      ("Risoto de cogumelos", "Risoto de arroz integral com cogumelos e salada de rúcula."),
    ],
  }
}

/// Substitutions suggested by free-text dietary restrictions
fn substitutions_for(restrictions: Option<&str>) -> Option<Vec<String>> {
  let text = restrictions?.to_lowercase();
  let mut subs = Vec::new();
  if text.contains("lactose") || text.contains("leite") {
    subs.push("Troque laticínios por versões sem lactose ou bebida vegetal".to_string());
  }
  if text.contains("gluten") || text.contains("glúten") || text.contains("celíac") {
    subs.push("Substitua pães e massas por tapioca, arroz ou batata-doce".to_string());
  }
  if text.contains("vegetarian") || text.contains("vegan") {
    subs.push("Troque carnes e peixes por tofu, grão-de-bico ou lentilha".to_string());
  }
  if subs.is_empty() {
    None
  } else {
    Some(subs)
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Routine and Tips
/// ---------------------------------------------------------------------------

fn session_rotation(goal: Goal) -> [&'static str; 3] {
  match goal {
    Goal::Emagrecer => ["Cardio moderado", "Força corpo inteiro", "HIIT"],
    Goal::Definir => ["Força membros superiores", "Força membros inferiores", "Cardio leve + core"],
    Goal::Saude => ["Caminhada", "Mobilidade e alongamento", "Força funcional"],
  }
}

fn exercise_routine(profile: &UserProfile, goal: Goal) -> Vec<String> {
  let level = profile.effective_activity_level();
  let days = profile
    .training_days
    .unwrap_or_else(|| level.default_training_days())
    .clamp(1, 7);
  let minutes = level.session_minutes();
  let rotation = session_rotation(goal);

  (0..days as usize)
    .map(|i| format!("Dia {}: {} - {} min", i + 1, rotation[i % rotation.len()], minutes))
    .collect()
}

fn plan_tips(profile: &UserProfile, goal: Goal) -> Vec<String> {
  let mut tips = vec![match goal {
    Goal::Emagrecer => "Monte o prato começando pelos vegetais: volume com poucas calorias ajuda na saciedade.",
    Goal::Definir => "Distribua a proteína ao longo do dia, em todas as refeições.",
    Goal::Saude => "Varie as cores do prato durante a semana para cobrir mais nutrientes.",
  }
  .to_string()];

  if profile.sleep_quality == Some(SleepQuality::Ruim) {
    tips.push("Crie um ritual de sono: telas desligadas 1 hora antes de deitar.".to_string());
  }
  if profile.stress_level == Some(Rating::Alto) {
    tips.push("Reserve 5 minutos por dia para respiração lenta; estresse alto aumenta a fome.".to_string());
  }
  if profile.emotional_eating == Some(true) {
    tips.push("Antes de beliscar, pergunte-se: é fome física ou emocional? Espere 10 minutos.".to_string());
  }
  if profile.motivation_level == Some(Rating::Baixo) {
    tips.push("Comece pequeno: uma meta por semana é melhor do que dez abandonadas.".to_string());
  }
  if let (Some(weight), Some(target)) = (profile.known_weight(), profile.goal_weight) {
    let delta = target - weight;
    if delta.abs() >= 0.5 {
      let verb = if delta < 0.0 { "perder" } else { "ganhar" };
      tips.push(format!(
        "Sua meta é {} {:.1} kg; um ritmo saudável é de 0,5 a 1 kg por semana.",
        verb,
        delta.abs()
      ));
    }
  }

  tips
}

/// ---------------------------------------------------------------------------
/// Generation
/// ---------------------------------------------------------------------------

/// Deterministic plan for an onboarded profile
pub fn generate(profile: &UserProfile) -> Result<PersonalizedPlan, PlanError> {
  if needs_onboarding(profile) {
    return Err(PlanError::InvalidProfile(
      "goal and weight are required before generating a plan".to_string(),
    ));
  }
  let goal = profile
    .goal
    .ok_or_else(|| PlanError::InvalidProfile("goal is missing".to_string()))?;
  let daily_calories = calorie_target(profile)
    .ok_or_else(|| PlanError::InvalidProfile("weight is missing".to_string()))?;

  let macros = macro_split(goal, daily_calories);
  let prep = profile.meal_prep_preference.unwrap_or(MealPrepPreference::Rapidas);
  let substitutions = substitutions_for(profile.dietary_restrictions.as_deref());

  let meal_plan = split_meals(daily_calories, &macros)
    .into_iter()
    .zip(meal_templates(goal, prep))
    .map(|(nutrition, (title, description))| Meal {
      title: title.to_string(),
      description: description.to_string(),
      substitutions: substitutions.clone(),
      nutrition,
    })
    .collect();

  Ok(PersonalizedPlan {
    daily_calories,
    macros,
    meal_plan,
    exercise_routine: exercise_routine(profile, goal),
    ai_tips: plan_tips(profile, goal),
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
  Advisor,
  Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPlan {
  pub plan: PersonalizedPlan,
  pub source: PlanSource,
}

/// Serialized label of a unit enum ("Rápidas", "Como fora", ...)
fn wire_label<T: Serialize>(value: T) -> Option<String> {
  serde_json::to_value(value).ok()?.as_str().map(String::from)
}

fn content_request(profile: &UserProfile, plan: &PersonalizedPlan, goal: Goal) -> PlanContentRequest {
  PlanContentRequest {
    goal: goal.label().to_string(),
    daily_calories: plan.daily_calories,
    meals: plan
      .meal_plan
      .iter()
      .zip(MEAL_SLOTS.iter())
      .map(|(meal, (slot, _))| MealSlot {
        slot: slot.to_string(),
        calories: meal.nutrition.calories,
        protein: meal.nutrition.protein,
        carbohydrates: meal.nutrition.carbohydrates,
        fats: meal.nutrition.fats,
      })
      .collect(),
    dietary_restrictions: profile.dietary_restrictions.clone(),
    meal_prep_preference: profile.meal_prep_preference.and_then(wire_label),
    cooking_habit: profile.cooking_habit.and_then(wire_label),
  }
}

/// Overlay advisor text onto the deterministic plan. None if the content does not fit.
fn apply_content(plan: &PersonalizedPlan, content: PlanContent) -> Option<PersonalizedPlan> {
  if content.meals.len() != plan.meal_plan.len()
    || content.meals.iter().any(|m| m.title.trim().is_empty())
  {
    return None;
  }

  let mut out = plan.clone();
  for (meal, text) in out.meal_plan.iter_mut().zip(content.meals) {
    meal.title = text.title;
    meal.description = text.description;
    if text.substitutions.as_ref().map_or(false, |s| !s.is_empty()) {
      meal.substitutions = text.substitutions;
    }
  }
  if !content.tips.is_empty() {
    out.ai_tips = content.tips;
  }
  Some(out)
}

/// Generate a plan, asking the advisor for wording. Never fails for advisor reasons.
pub async fn generate_with_advisor(
  profile: &UserProfile,
  advisor: Option<&dyn Advisor>,
  timeout: Duration,
) -> Result<GeneratedPlan, PlanError> {
  let plan = generate(profile)?;
  let fallback = |plan: PersonalizedPlan| GeneratedPlan {
    plan,
    source: PlanSource::Fallback,
  };

  let Some(advisor) = advisor else {
    info!("No advisor configured, using fallback plan content");
    return Ok(fallback(plan));
  };
  let goal = profile
    .goal
    .ok_or_else(|| PlanError::InvalidProfile("goal is missing".to_string()))?;

  let request = content_request(profile, &plan, goal);
  match tokio::time::timeout(timeout, advisor.plan_content(&request)).await {
    Ok(Ok(content)) => match apply_content(&plan, content) {
      Some(enriched) => Ok(GeneratedPlan {
        plan: enriched,
        source: PlanSource::Advisor,
      }),
      None => {
        warn!("Advisor content did not match the meal slots, using fallback");
        Ok(fallback(plan))
      }
    },
    Ok(Err(e)) => {
      warn!(error = %e, "Advisor unavailable, using fallback plan content");
      Ok(fallback(plan))
    }
    Err(_) => {
      warn!(timeout_secs = timeout.as_secs(), "Advisor timed out, using fallback plan content");
      Ok(fallback(plan))
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::advisor::MealText;
  use crate::assert_approx_eq;
  use crate::test_utils::{mock_new_account, mock_onboarded_profile, FailingAdvisor, ScriptedAdvisor, SlowAdvisor};

  #[test]
  fn test_bmr_mifflin_st_jeor() {
    let mut profile = mock_onboarded_profile();
    profile.weight = Some(80.0);
    profile.height = Some(180.0);
    profile.age = Some(30);
    profile.sex = Some(Sex::Male);

    // 800 + 1125 - 150 + 5
    assert_approx_eq!(basal_metabolic_rate(&profile).unwrap(), 1780.0, 0.001);

    profile.sex = Some(Sex::Female);
    assert_approx_eq!(basal_metabolic_rate(&profile).unwrap(), 1614.0, 0.001);
  }

  #[test]
  fn test_calorie_target_by_goal() {
    let mut profile = mock_onboarded_profile();
    profile.weight = Some(80.0);
    profile.height = Some(180.0);
    profile.age = Some(30);
    profile.sex = Some(Sex::Male);
    profile.activity_level = Some(ActivityLevel::Moderate);

    // Maintenance: 1780 * 1.55 = 2759
    profile.goal = Some(Goal::Saude);
    assert_eq!(calorie_target(&profile), Some(2760.0));

    profile.goal = Some(Goal::Emagrecer);
    assert_eq!(calorie_target(&profile), Some(2210.0));

    profile.goal = Some(Goal::Definir);
    assert_eq!(calorie_target(&profile), Some(2900.0));
  }

  #[test]
  fn test_calorie_floor() {
    let mut profile = mock_onboarded_profile();
    profile.weight = Some(40.0);
    profile.height = Some(150.0);
    profile.age = Some(70);
    profile.sex = Some(Sex::Female);
    profile.activity_level = Some(ActivityLevel::Sedentary);
    profile.goal = Some(Goal::Emagrecer);

    assert_eq!(calorie_target(&profile), Some(CALORIE_FLOOR));
  }

  #[test]
  fn test_definir_has_highest_protein_ratio() {
    let definir = macro_split(Goal::Definir, 2000.0);
    let saude = macro_split(Goal::Saude, 2000.0);
    let emagrecer = macro_split(Goal::Emagrecer, 2000.0);

    assert!(definir.protein > emagrecer.protein);
    assert!(definir.protein > saude.protein);
    assert_eq!(definir.protein, 175.0);
  }

  #[test]
  fn test_meal_totals_match_targets() {
    for goal in [Goal::Emagrecer, Goal::Definir, Goal::Saude] {
      let mut profile = mock_onboarded_profile();
      profile.goal = Some(goal);
      let plan = generate(&profile).unwrap();
      let totals = plan.meal_totals();

      assert_eq!(totals.calories, plan.daily_calories);
      assert!((totals.protein - plan.macros.protein).abs() <= plan.macros.protein * MEAL_TOLERANCE);
      assert!((totals.carbohydrates - plan.macros.carbs).abs() <= plan.macros.carbs * MEAL_TOLERANCE);
      assert!((totals.fats - plan.macros.fats).abs() <= plan.macros.fats * MEAL_TOLERANCE);

      // Macro energy lines up with the calorie target
      let macro_kcal = plan.macros.protein * 4.0 + plan.macros.carbs * 4.0 + plan.macros.fats * 9.0;
      assert!((macro_kcal - plan.daily_calories).abs() <= plan.daily_calories * MEAL_TOLERANCE);
    }
  }

  #[test]
  fn test_generate_is_repeatable() {
    let profile = mock_onboarded_profile();
    assert_eq!(generate(&profile).unwrap(), generate(&profile).unwrap());
  }

  #[test]
  fn test_generate_rejects_profile_needing_onboarding() {
    let profile = mock_new_account();
    assert!(matches!(generate(&profile), Err(PlanError::InvalidProfile(_))));
  }

  #[test]
  fn test_exercise_routine_sized_by_training_days() {
    let mut profile = mock_onboarded_profile();
    profile.training_days = Some(5);
    profile.activity_level = Some(ActivityLevel::Active);
    let plan = generate(&profile).unwrap();

    assert_eq!(plan.exercise_routine.len(), 5);
    assert!(plan.exercise_routine[0].starts_with("Dia 1:"));
    assert!(plan.exercise_routine[0].ends_with("50 min"));

    profile.training_days = None;
    profile.activity_level = Some(ActivityLevel::Sedentary);
    assert_eq!(generate(&profile).unwrap().exercise_routine.len(), 2);
  }

  #[test]
  fn test_restrictions_add_substitutions() {
    let mut profile = mock_onboarded_profile();
    profile.dietary_restrictions = Some("Intolerância à lactose".to_string());
    let plan = generate(&profile).unwrap();

    let subs = plan.meal_plan[0].substitutions.as_ref().unwrap();
    assert_eq!(subs.len(), 1);
    assert!(subs[0].contains("sem lactose"));
  }

  #[test]
  fn test_tips_reflect_profile() {
    let mut profile = mock_onboarded_profile();
    profile.sleep_quality = Some(SleepQuality::Ruim);
    profile.emotional_eating = Some(true);
    profile.weight = Some(80.0);
    profile.goal_weight = Some(72.0);
    let plan = generate(&profile).unwrap();

    assert!(plan.ai_tips.iter().any(|t| t.contains("ritual de sono")));
    assert!(plan.ai_tips.iter().any(|t| t.contains("fome física ou emocional")));
    assert!(plan.ai_tips.iter().any(|t| t.contains("perder 8.0 kg")));
  }

  #[tokio::test]
  async fn test_advisor_text_overlays_fixed_numbers() {
    let profile = mock_onboarded_profile();
    let baseline = generate(&profile).unwrap();
    let advisor = ScriptedAdvisor::new(PlanContent {
      meals: (0..4)
        .map(|i| MealText {
          title: format!("Refeição {}", i + 1),
          description: "Texto do advisor".to_string(),
          substitutions: None,
        })
        .collect(),
      tips: vec!["Dica do advisor".to_string()],
    });

    let out = generate_with_advisor(&profile, Some(&advisor), Duration::from_secs(1))
      .await
      .unwrap();

    assert_eq!(out.source, PlanSource::Advisor);
    assert_eq!(out.plan.meal_plan[2].title, "Refeição 3");
    assert_eq!(out.plan.ai_tips, vec!["Dica do advisor".to_string()]);
    assert_eq!(out.plan.daily_calories, baseline.daily_calories);
    assert_eq!(out.plan.meal_totals(), baseline.meal_totals());
  }

  #[tokio::test]
  async fn test_advisor_failure_degrades_to_fallback() {
    let profile = mock_onboarded_profile();
    let out = generate_with_advisor(&profile, Some(&FailingAdvisor), Duration::from_secs(1))
      .await
      .unwrap();

    assert_eq!(out.source, PlanSource::Fallback);
    assert_eq!(out.plan, generate(&profile).unwrap());
  }

  #[tokio::test]
  async fn test_advisor_timeout_degrades_to_fallback() {
    let profile = mock_onboarded_profile();
    let advisor = SlowAdvisor {
      delay: Duration::from_millis(200),
    };
    let out = generate_with_advisor(&profile, Some(&advisor), Duration::from_millis(20))
      .await
      .unwrap();

    assert_eq!(out.source, PlanSource::Fallback);
  }

  #[tokio::test]
  async fn test_wrong_meal_count_is_rejected() {
    let profile = mock_onboarded_profile();
    let advisor = ScriptedAdvisor::new(PlanContent {
      meals: vec![MealText {
        title: "Só uma".to_string(),
        description: "Incompleto".to_string(),
        substitutions: None,
      }],
      tips: vec![],
    });

    let out = generate_with_advisor(&profile, Some(&advisor), Duration::from_secs(1))
      .await
      .unwrap();
    assert_eq!(out.source, PlanSource::Fallback);
  }

  #[tokio::test]
  async fn test_no_advisor_uses_fallback() {
    let profile = mock_onboarded_profile();
    let out = generate_with_advisor(&profile, None, Duration::from_secs(1)).await.unwrap();
    assert_eq!(out.source, PlanSource::Fallback);
  }
}
