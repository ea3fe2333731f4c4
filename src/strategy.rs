//! Adaptive daily strategy
//!
//! Rules are evaluated as ordered tiers. The first tier that matches fully
//! decides the nutrition adjustment and the workout suggestion:
//!
//! 1. Safety: severe negative signals force rest and hydration
//! 2. Cycle: menstrual / late luteal window biases toward low intensity and carbs
//! 3. Compliance: yesterday off-plan or two skipped workouts soften the day
//! 4. Default: keep the plan
//!
//! `smart_tip` follows the mood and `mood_hack` follows the energy level,
//! independently of the tier. Everything here is pure: identical inputs give
//! identical output.

use chrono::NaiveDate;

use crate::models::{
  ActivityHistoryEntry, ActivityTrend, BmiHistoryEntry, BmiTrend, CyclePhase, DailyLog,
  DailyStrategy, DietCompliance, Mood, NutritionAction, NutritionAdjustment, PersonalizedPlan,
  Rating, RuleTier, SleepQuality, StrategySignals, UserProfile, WorkoutSuggestion, WorkoutType,
};
use crate::plan::{calorie_target, CALORIE_FLOOR};

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

/// Used when there is neither a plan nor a weight to estimate from
pub const DEFAULT_BASE_CALORIES: f64 = 2000.0;

pub const LATE_LUTEAL_CALORIE_BONUS: f64 = 150.0;
pub const OFF_PLAN_CALORIE_CUT: f64 = 200.0;

const DEFAULT_CYCLE_LENGTH: u32 = 28;
const BMI_TREND_THRESHOLD: f64 = 0.3;
const ACTIVITY_TREND_THRESHOLD: f64 = 0.15;

/// ---------------------------------------------------------------------------
/// Inputs
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
  pub profile: &'a UserProfile,
  pub plan: Option<&'a PersonalizedPlan>,
  pub latest_log: &'a DailyLog,
  /// Earlier logs; may also contain `latest_log`
  pub recent_logs: &'a [DailyLog],
  pub recent_bmi: &'a [BmiHistoryEntry],
  pub recent_activity: &'a [ActivityHistoryEntry],
}

/// Values every tier reads, computed once per evaluation
struct Evaluation<'a> {
  log: &'a DailyLog,
  base_calories: f64,
  session_minutes: u32,
  cycle_phase: Option<CyclePhase>,
  skipped_two_days: bool,
}

struct TierOutcome {
  tier: RuleTier,
  focus: String,
  nutrition: NutritionAdjustment,
  workout: WorkoutSuggestion,
}

/// Conditional tiers in precedence order; the default tier closes the list
const TIERS: [fn(&Evaluation) -> Option<TierOutcome>; 3] = [safety_tier, cycle_tier, compliance_tier];

/// ---------------------------------------------------------------------------
/// Entry Point
/// ---------------------------------------------------------------------------

pub fn derive_strategy(input: &StrategyInput) -> DailyStrategy {
  let log = input.latest_log;
  let signals = StrategySignals {
    cycle_phase: cycle_day(input.profile, log).and_then(CyclePhase::from_day),
    bmi_trend: bmi_trend(input.recent_bmi),
    activity_trend: activity_trend(input.recent_activity, log.date),
  };

  let eval = Evaluation {
    log,
    base_calories: base_calories(input.profile, input.plan),
    session_minutes: input.profile.effective_activity_level().session_minutes(),
    cycle_phase: signals.cycle_phase,
    skipped_two_days: skipped_two_days(log, input.recent_logs),
  };

  let outcome = TIERS
    .iter()
    .find_map(|tier| tier(&eval))
    .unwrap_or_else(|| default_tier(&eval));

  DailyStrategy {
    date: log.date,
    focus_of_the_day: outcome.focus,
    nutrition_adjustment: outcome.nutrition,
    workout_suggestion: outcome.workout,
    smart_tip: smart_tip(log.mood).to_string(),
    mood_hack: mood_hack(log.energy_level).to_string(),
    tier: outcome.tier,
    signals,
  }
}

/// Calorie target the adjustments start from
pub fn base_calories(profile: &UserProfile, plan: Option<&PersonalizedPlan>) -> f64 {
  plan
    .map(|p| p.daily_calories)
    .or_else(|| calorie_target(profile))
    .unwrap_or(DEFAULT_BASE_CALORIES)
}

/// ---------------------------------------------------------------------------
/// Tiers
/// ---------------------------------------------------------------------------

fn safety_tier(eval: &Evaluation) -> Option<TierOutcome> {
  let log = eval.log;
  let severe = log.energy_level == Rating::Baixo
    && log.mood.is_negative()
    && log.sleep_quality == SleepQuality::Ruim;
  if !severe {
    return None;
  }

  Some(TierOutcome {
    tier: RuleTier::Safety,
    focus: "Recuperação".to_string(),
    nutrition: NutritionAdjustment {
      action: NutritionAction::HidratacaoForcada,
      reason: "Sono ruim, energia baixa e humor abalado: hoje o foco é água, refeições leves e descanso."
        .to_string(),
      calories_target: eval.base_calories,
    },
    workout: WorkoutSuggestion {
      kind: WorkoutType::DescansoTotal,
      duration: "Dia inteiro".to_string(),
      reason: "Seu corpo precisa se recuperar antes de qualquer treino.".to_string(),
    },
  })
}

fn cycle_tier(eval: &Evaluation) -> Option<TierOutcome> {
  let (nutrition, workout) = match eval.cycle_phase? {
    CyclePhase::Menstrual => (
      NutritionAdjustment {
        action: NutritionAction::AumentarCarboidratos,
        reason: "Fase menstrual: carboidratos complexos ajudam a sustentar energia e humor.".to_string(),
        calories_target: eval.base_calories,
      },
      WorkoutSuggestion {
        kind: WorkoutType::YogaAlongamento,
        duration: "30 min".to_string(),
        reason: "Movimentos suaves aliviam cólicas e tensão.".to_string(),
      },
    ),
    CyclePhase::LateLuteal => (
      NutritionAdjustment {
        action: NutritionAction::AumentarCarboidratos,
        reason: "Fase lútea: o gasto energético sobe um pouco, priorize carboidratos complexos.".to_string(),
        calories_target: eval.base_calories + LATE_LUTEAL_CALORIE_BONUS,
      },
      WorkoutSuggestion {
        kind: WorkoutType::CaminhadaLeve,
        duration: "40 min".to_string(),
        reason: "Intensidade baixa respeita a queda de energia típica desta fase.".to_string(),
      },
    ),
    _ => return None,
  };

  Some(TierOutcome {
    tier: RuleTier::Cycle,
    focus: "Ciclo em Foco".to_string(),
    nutrition,
    workout,
  })
}

fn compliance_tier(eval: &Evaluation) -> Option<TierOutcome> {
  let off_plan = eval.log.diet_compliance_yesterday == DietCompliance::OffPlan;
  if !off_plan && !eval.skipped_two_days {
    return None;
  }

  let nutrition = if off_plan {
    NutritionAdjustment {
      action: NutritionAction::ReduzirCalorias,
      reason: "Ontem saiu do plano, e tudo bem. Um ajuste leve hoje equilibra a semana, sem compensações radicais."
        .to_string(),
      calories_target: (eval.base_calories - OFF_PLAN_CALORIE_CUT).max(CALORIE_FLOOR),
    }
  } else {
    keep_plan_nutrition(eval, "Alimentação em dia: mantenha o plano.")
  };

  let workout = if eval.skipped_two_days {
    WorkoutSuggestion {
      kind: WorkoutType::CaminhadaLeve,
      duration: "20 min".to_string(),
      reason: "Dois dias sem treino: uma sessão curta hoje mantém o hábito vivo.".to_string(),
    }
  } else {
    original_workout(eval, "Siga o treino planejado.")
  };

  Some(TierOutcome {
    tier: RuleTier::Compliance,
    focus: "Retomada".to_string(),
    nutrition,
    workout,
  })
}

fn default_tier(eval: &Evaluation) -> TierOutcome {
  let focus = if eval.log.mood == Mood::Ansioso {
    "Controle de Ansiedade"
  } else {
    "Foco Total"
  };

  TierOutcome {
    tier: RuleTier::Default,
    focus: focus.to_string(),
    nutrition: keep_plan_nutrition(eval, "Sinais estáveis: siga o plano atual."),
    workout: original_workout(eval, "Energia e sono em dia para o treino completo."),
  }
}

fn keep_plan_nutrition(eval: &Evaluation, reason: &str) -> NutritionAdjustment {
  NutritionAdjustment {
    action: NutritionAction::Manter,
    reason: reason.to_string(),
    calories_target: eval.base_calories,
  }
}

fn original_workout(eval: &Evaluation, reason: &str) -> WorkoutSuggestion {
  WorkoutSuggestion {
    kind: WorkoutType::TreinoOriginal,
    duration: format!("{} min", eval.session_minutes),
    reason: reason.to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Signals
/// ---------------------------------------------------------------------------

/// Cycle day on the 28-day scale, from the log or projected from the last period
pub fn cycle_day(profile: &UserProfile, log: &DailyLog) -> Option<u8> {
  if !profile.tracks_cycle() {
    return None;
  }
  if let Some(day) = log.menstrual_day.filter(|d| (1..=28).contains(d)) {
    return Some(day);
  }

  let last_period = profile.last_period_date?;
  let days_since = (log.date - last_period).num_days();
  if days_since < 0 {
    return None;
  }
  let length = profile.cycle_length.unwrap_or(DEFAULT_CYCLE_LENGTH).max(1) as i64;
  let day = (days_since % length) + 1;
  Some(day.min(28) as u8)
}

/// Latest log and the previous calendar day's log both report no workout
fn skipped_two_days(latest: &DailyLog, recent_logs: &[DailyLog]) -> bool {
  if latest.did_workout_yesterday {
    return false;
  }
  let Some(previous_day) = latest.date.pred_opt() else {
    return false;
  };
  recent_logs
    .iter()
    .any(|l| l.date == previous_day && !l.did_workout_yesterday)
}

pub fn bmi_trend(entries: &[BmiHistoryEntry]) -> Option<BmiTrend> {
  if entries.len() < 2 {
    return None;
  }
  let oldest = entries.iter().min_by_key(|e| e.date)?;
  let newest = entries.iter().max_by_key(|e| e.date)?;
  let delta = newest.bmi - oldest.bmi;

  Some(if delta > BMI_TREND_THRESHOLD {
    BmiTrend::Rising
  } else if delta < -BMI_TREND_THRESHOLD {
    BmiTrend::Falling
  } else {
    BmiTrend::Stable
  })
}

/// Minutes in the 7 days up to `as_of` against the 7 days before
pub fn activity_trend(entries: &[ActivityHistoryEntry], as_of: NaiveDate) -> Option<ActivityTrend> {
  let mut this_week = 0.0;
  let mut last_week = 0.0;
  for entry in entries {
    let days_ago = (as_of - entry.date.date_naive()).num_days();
    let minutes = entry.duration.max(0) as f64 / 60.0;
    match days_ago {
      0..=6 => this_week += minutes,
      7..=13 => last_week += minutes,
      _ => {}
    }
  }

  if this_week == 0.0 && last_week == 0.0 {
    return None;
  }
  if last_week == 0.0 {
    return Some(ActivityTrend::Increasing);
  }

  let delta = (this_week - last_week) / last_week;
  Some(if delta > ACTIVITY_TREND_THRESHOLD {
    ActivityTrend::Increasing
  } else if delta < -ACTIVITY_TREND_THRESHOLD {
    ActivityTrend::Decreasing
  } else {
    ActivityTrend::Steady
  })
}

/// ---------------------------------------------------------------------------
/// Tips
/// ---------------------------------------------------------------------------

fn smart_tip(mood: Mood) -> &'static str {
  match mood {
    Mood::Feliz => "Aproveite o bom humor para preparar as marmitas da semana.",
    Mood::Ansioso => "Ansiedade pede rotina: faça as refeições em horários fixos hoje.",
    Mood::Estressado => "Evite decisões no impulso: deixe um lanche saudável sempre à mão.",
    Mood::Desanimado => "Não busque o dia perfeito. Cumprir 70% do plano já é vitória.",
    Mood::Neutro => "Beba um copo de água antes de cada refeição.",
  }
}

fn mood_hack(energy: Rating) -> &'static str {
  match energy {
    Rating::Baixo => "10 minutos de sol pela manhã ou um cochilo de 20 minutos.",
    Rating::Medio => "Caminhada de 5 minutos depois do almoço.",
    Rating::Alto => "Respiração 4-7-8 antes de dormir para manter a energia amanhã.",
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
