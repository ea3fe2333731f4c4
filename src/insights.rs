//! Insight derivation from check-in and body history
//!
//! Flags are computed first, then turned into a prioritized list of alerts.
//! Ids are stable so the presentation layer can dedupe across refreshes.

use chrono::NaiveDate;

use crate::models::{
  ActivityHistoryEntry, ActivityTrend, BmiHistoryEntry, BmiTrend, DailyLog, DietCompliance, Goal,
  Insight, InsightCategory, InsightType, Mood, UserProfile,
};
use crate::strategy::{activity_trend, bmi_trend};

/// Logs considered for patterns
const WINDOW: usize = 7;

const SLEEP_DEFICIT_HOURS: f64 = 6.0;
const MIN_LOGS_FOR_SLEEP: usize = 3;
const STRESSED_DAYS: usize = 3;
const OFF_PLAN_DAYS: usize = 2;
const COMPLIANT_STREAK: usize = 3;

/// ---------------------------------------------------------------------------
/// Flags
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightFlags {
  /// Average sleep under 6h across at least 3 recent logs
  pub sleep_deficit: bool,

  /// 3+ of the last 7 logs stressed or anxious
  pub stress_pattern: bool,

  /// 2+ off-plan days in the last 7 logs
  pub diet_slips: bool,

  /// The 3 most recent logs fully on plan
  pub compliance_streak: bool,

  /// BMI falling while the goal is weight loss
  pub bmi_progress: bool,

  pub activity_up: bool,
  pub activity_down: bool,
}

impl InsightFlags {
  pub fn compute(
    profile: &UserProfile,
    logs: &[DailyLog],
    bmi: &[BmiHistoryEntry],
    activity: &[ActivityHistoryEntry],
  ) -> Self {
    let mut flags = InsightFlags::default();

    let mut recent: Vec<&DailyLog> = logs.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(WINDOW);

    if recent.len() >= MIN_LOGS_FOR_SLEEP {
      let avg_sleep = recent.iter().map(|l| l.sleep_hours).sum::<f64>() / recent.len() as f64;
      flags.sleep_deficit = avg_sleep < SLEEP_DEFICIT_HOURS;
    }

    let stressed = recent
      .iter()
      .filter(|l| matches!(l.mood, Mood::Estressado | Mood::Ansioso))
      .count();
    flags.stress_pattern = stressed >= STRESSED_DAYS;

    let off_plan = recent
      .iter()
      .filter(|l| l.diet_compliance_yesterday == DietCompliance::OffPlan)
      .count();
    flags.diet_slips = off_plan >= OFF_PLAN_DAYS;

    flags.compliance_streak = recent.len() >= COMPLIANT_STREAK
      && recent
        .iter()
        .take(COMPLIANT_STREAK)
        .all(|l| l.diet_compliance_yesterday == DietCompliance::FullyOnPlan);

    flags.bmi_progress =
      profile.goal == Some(Goal::Emagrecer) && bmi_trend(bmi) == Some(BmiTrend::Falling);

    if let Some(as_of) = activity_reference_date(&recent, activity) {
      match activity_trend(activity, as_of) {
        Some(ActivityTrend::Increasing) => flags.activity_up = true,
        Some(ActivityTrend::Decreasing) => flags.activity_down = true,
        _ => {}
      }
    }

    flags
  }

  /// Flags as insights, highest priority first
  pub fn to_prioritized_list(&self) -> Vec<Insight> {
    let mut insights: Vec<(u8, Insight)> = Vec::new();

    if self.sleep_deficit {
      insights.push((
        1,
        insight(
          "sleep_deficit",
          InsightType::Warning,
          InsightCategory::Sleep,
          "Sono abaixo do ideal",
          "Sua média de sono nos últimos dias ficou abaixo de 6 horas.",
          "Antecipe o horário de dormir em 30 minutos e evite telas na última hora.",
        ),
      ));
    }
    if self.diet_slips {
      insights.push((
        2,
        insight(
          "diet_slips",
          InsightType::Warning,
          InsightCategory::Diet,
          "Deslizes frequentes",
          "Você saiu do plano em mais de um dia na última semana.",
          "Planeje as refeições do dia seguinte à noite e deixe lanches prontos.",
        ),
      ));
    }
    if self.stress_pattern {
      insights.push((
        3,
        insight(
          "stress_pattern",
          InsightType::Pattern,
          InsightCategory::Stress,
          "Estresse recorrente",
          "Estresse ou ansiedade apareceram em vários check-ins recentes.",
          "Reserve 10 minutos por dia para respiração ou uma caminhada ao ar livre.",
        ),
      ));
    }
    if self.activity_down {
      insights.push((
        4,
        insight(
          "activity_down",
          InsightType::Warning,
          InsightCategory::Activity,
          "Menos movimento",
          "Seu tempo de atividade caiu em relação à semana anterior.",
          "Encaixe uma caminhada curta depois de uma das refeições.",
        ),
      ));
    }
    if self.compliance_streak {
      insights.push((
        5,
        insight(
          "compliance_streak",
          InsightType::Achievement,
          InsightCategory::Diet,
          "Plano em dia",
          "Você seguiu o plano nos três últimos dias.",
          "Mantenha a rotina e registre o check-in amanhã também.",
        ),
      ));
    }
    if self.bmi_progress {
      insights.push((
        5,
        insight(
          "bmi_progress",
          InsightType::Achievement,
          InsightCategory::Diet,
          "IMC em queda",
          "Seu IMC vem diminuindo desde as primeiras medições.",
          "Continue com o plano e atualize seu peso semanalmente.",
        ),
      ));
    }
    if self.activity_up {
      insights.push((
        5,
        insight(
          "activity_up",
          InsightType::Achievement,
          InsightCategory::Activity,
          "Mais movimento",
          "Você se movimentou mais do que na semana anterior.",
          "Aumente a intensidade aos poucos para manter a evolução.",
        ),
      ));
    }

    // Stable sort keeps push order within a priority
    insights.sort_by_key(|(priority, _)| *priority);
    insights.into_iter().map(|(_, i)| i).collect()
  }
}

pub fn derive_insights(
  profile: &UserProfile,
  logs: &[DailyLog],
  bmi: &[BmiHistoryEntry],
  activity: &[ActivityHistoryEntry],
) -> Vec<Insight> {
  InsightFlags::compute(profile, logs, bmi, activity).to_prioritized_list()
}

/// Newest log date, else newest activity date
fn activity_reference_date(
  recent: &[&DailyLog],
  activity: &[ActivityHistoryEntry],
) -> Option<NaiveDate> {
  recent
    .first()
    .map(|l| l.date)
    .or_else(|| activity.iter().map(|a| a.date.date_naive()).max())
}

fn insight(
  id: &str,
  kind: InsightType,
  category: InsightCategory,
  title: &str,
  description: &str,
  recommendation: &str,
) -> Insight {
  Insight {
    id: id.to_string(),
    kind,
    category,
    title: title.to_string(),
    description: description.to_string(),
    recommendation: recommendation.to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{date, mock_activity, mock_bmi, mock_daily_log, mock_onboarded_profile};

  fn week_of_logs() -> Vec<DailyLog> {
    (1..=7).map(|d| mock_daily_log(date(2026, 10, d))).collect()
  }

  #[test]
  fn test_no_insights_for_empty_history() {
    let profile = mock_onboarded_profile();
    assert!(derive_insights(&profile, &[], &[], &[]).is_empty());
  }

  #[test]
  fn test_sleep_deficit_needs_three_logs() {
    let profile = mock_onboarded_profile();
    let short = |d| DailyLog {
      sleep_hours: 5.0,
      ..mock_daily_log(date(2026, 10, d))
    };

    let two = vec![short(1), short(2)];
    assert!(!InsightFlags::compute(&profile, &two, &[], &[]).sleep_deficit);

    let three = vec![short(1), short(2), short(3)];
    let insights = derive_insights(&profile, &three, &[], &[]);
    assert_eq!(insights[0].id, "sleep_deficit");
    assert_eq!(insights[0].kind, InsightType::Warning);
  }

  #[test]
  fn test_only_last_seven_logs_count() {
    let profile = mock_onboarded_profile();
    let mut logs = week_of_logs();
    // Two old off-plan days fall outside the window
    for d in [1, 2] {
      logs.push(DailyLog {
        diet_compliance_yesterday: DietCompliance::OffPlan,
        ..mock_daily_log(date(2026, 9, d))
      });
    }
    assert!(!InsightFlags::compute(&profile, &logs, &[], &[]).diet_slips);

    logs[6].diet_compliance_yesterday = DietCompliance::OffPlan;
    logs[5].diet_compliance_yesterday = DietCompliance::OffPlan;
    assert!(InsightFlags::compute(&profile, &logs, &[], &[]).diet_slips);
  }

  #[test]
  fn test_stress_pattern_counts_anxious_and_stressed() {
    let profile = mock_onboarded_profile();
    let mut logs = week_of_logs();
    logs[0].mood = Mood::Ansioso;
    logs[3].mood = Mood::Estressado;
    assert!(!InsightFlags::compute(&profile, &logs, &[], &[]).stress_pattern);

    logs[5].mood = Mood::Ansioso;
    assert!(InsightFlags::compute(&profile, &logs, &[], &[]).stress_pattern);
  }

  #[test]
  fn test_compliance_streak_uses_most_recent_logs() {
    let profile = mock_onboarded_profile();
    let mut logs = week_of_logs();
    assert!(InsightFlags::compute(&profile, &logs, &[], &[]).compliance_streak);

    // Oct 6 is among the three newest
    logs[5].diet_compliance_yesterday = DietCompliance::MinorSlip;
    assert!(!InsightFlags::compute(&profile, &logs, &[], &[]).compliance_streak);
  }

  #[test]
  fn test_bmi_progress_only_for_weight_loss_goal() {
    let mut profile = mock_onboarded_profile();
    let bmi = vec![mock_bmi(28.4, 2026, 9, 1), mock_bmi(27.6, 2026, 10, 1)];

    profile.goal = Some(Goal::Emagrecer);
    assert!(InsightFlags::compute(&profile, &[], &bmi, &[]).bmi_progress);

    profile.goal = Some(Goal::Definir);
    assert!(!InsightFlags::compute(&profile, &[], &bmi, &[]).bmi_progress);
  }

  #[test]
  fn test_activity_drop_is_a_warning() {
    let profile = mock_onboarded_profile();
    let logs = vec![mock_daily_log(date(2026, 10, 10))];
    let activity = vec![mock_activity(2026, 10, 9, 900), mock_activity(2026, 10, 1, 3600)];

    let insights = derive_insights(&profile, &logs, &[], &activity);
    let drop = insights.iter().find(|i| i.id == "activity_down").unwrap();
    assert_eq!(drop.kind, InsightType::Warning);
    assert_eq!(drop.category, InsightCategory::Activity);
  }

  #[test]
  fn test_warnings_sort_before_achievements() {
    let profile = mock_onboarded_profile();
    let mut logs: Vec<DailyLog> = week_of_logs()
      .into_iter()
      .map(|l| DailyLog {
        sleep_hours: 5.0,
        ..l
      })
      .collect();
    logs[0].diet_compliance_yesterday = DietCompliance::OffPlan;
    logs[1].diet_compliance_yesterday = DietCompliance::OffPlan;

    let ids: Vec<String> = derive_insights(&profile, &logs, &[], &[])
      .into_iter()
      .map(|i| i.id)
      .collect();
    assert_eq!(ids, vec!["sleep_deficit", "diet_slips", "compliance_streak"]);
  }
}
