//! Session controller: the single owner of application state
//!
//! State is one tagged `AppState`; every transition goes through this
//! controller. Remote calls are wrapped in timeouts and their results are
//! committed only if no newer transition happened meanwhile (epoch check).
//! Persistence after a transition is best-effort: failures become warnings
//! and never roll the in-memory state back.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::access::needs_onboarding;
use crate::advisor::Advisor;
use crate::config::AppConfig;
use crate::gamification::{apply_reward, reward_check_in, CheckInReward};
use crate::insights::derive_insights;
use crate::journal::{self, JournalError};
use crate::models::{
  ActivityHistoryEntry, BmiHistoryEntry, DailyLog, DailyStrategy, Insight, PersonalizedPlan,
  ProfileRecord, UserProfile,
};
use crate::plan::{generate_with_advisor, GeneratedPlan, PlanError, PlanSource};
use crate::record_store::{AuthEvent, RecordStore, Session, StoreError};
use crate::router::{Screen, View, ViewRouter};
use crate::strategy::{derive_strategy, StrategyInput};

/// Logs read for insights
const INSIGHT_LOG_WINDOW: i64 = 7;
const INSIGHT_ACTIVITY_DAYS: i64 = 14;

/// ---------------------------------------------------------------------------
/// State
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthView {
  #[default]
  Login,
  Register,
  ForgotPassword,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
  pub user_id: String,
  pub profile: UserProfile,
  pub plan: Option<PersonalizedPlan>,
  pub router: ViewRouter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AppState {
  Loading,
  Unauthenticated { auth_view: AuthView },
  Onboarding { user_id: String, profile: UserProfile },
  Active(ActiveSession),
}

impl AppState {
  pub fn name(&self) -> &'static str {
    match self {
      AppState::Loading => "loading",
      AppState::Unauthenticated { .. } => "unauthenticated",
      AppState::Onboarding { .. } => "onboarding",
      AppState::Active(_) => "active",
    }
  }

  pub fn user_id(&self) -> Option<&str> {
    match self {
      AppState::Onboarding { user_id, .. } => Some(user_id),
      AppState::Active(session) => Some(&session.user_id),
      _ => None,
    }
  }

  pub fn profile(&self) -> Option<&UserProfile> {
    match self {
      AppState::Onboarding { profile, .. } => Some(profile),
      AppState::Active(session) => Some(&session.profile),
      _ => None,
    }
  }

  fn signed_out() -> Self {
    AppState::Unauthenticated {
      auth_view: AuthView::Login,
    }
  }

  /// Onboarding or Active depending on the gate
  fn routed(user_id: String, profile: UserProfile, plan: Option<PersonalizedPlan>) -> Self {
    if needs_onboarding(&profile) {
      AppState::Onboarding { user_id, profile }
    } else {
      AppState::Active(ActiveSession {
        user_id,
        profile,
        plan,
        router: ViewRouter::default(),
      })
    }
  }
}

/// ---------------------------------------------------------------------------
/// Errors & Settings
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("Cannot {operation} while {state}")]
  InvalidState {
    operation: &'static str,
    state: &'static str,
  },

  #[error("{0} timed out")]
  Timeout(&'static str),

  #[error("Superseded by a newer session change")]
  Stale,

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error(transparent)]
  Journal(#[from] JournalError),
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
  pub request_timeout: Duration,
  pub advisor_timeout: Duration,
  pub trial_days: i64,
}

impl Default for SessionSettings {
  fn default() -> Self {
    Self {
      request_timeout: Duration::from_secs(10),
      advisor_timeout: Duration::from_secs(20),
      trial_days: 7,
    }
  }
}

impl From<&AppConfig> for SessionSettings {
  fn from(config: &AppConfig) -> Self {
    Self {
      request_timeout: config.request_timeout,
      advisor_timeout: config.advisor_timeout,
      trial_days: config.trial_days,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInOutcome {
  pub strategy: DailyStrategy,
  pub reward: CheckInReward,
}

/// ---------------------------------------------------------------------------
/// Controller
/// ---------------------------------------------------------------------------

pub struct SessionController {
  store: Arc<dyn RecordStore>,
  advisor: Option<Arc<dyn Advisor>>,
  pool: SqlitePool,
  settings: SessionSettings,
  clock: fn() -> DateTime<Utc>,
  state: RwLock<AppState>,
  /// Bumped on every session-level transition
  epoch: AtomicU64,
  /// Serializes profile/plan writes to the record store
  writes: Mutex<()>,
  warnings: Mutex<Vec<String>>,
}

impl SessionController {
  pub fn new(
    store: Arc<dyn RecordStore>,
    advisor: Option<Arc<dyn Advisor>>,
    pool: SqlitePool,
    settings: SessionSettings,
  ) -> Self {
    Self {
      store,
      advisor,
      pool,
      settings,
      clock: Utc::now,
      state: RwLock::new(AppState::Loading),
      epoch: AtomicU64::new(0),
      writes: Mutex::new(()),
      warnings: Mutex::new(Vec::new()),
    }
  }

  pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
    self.clock = clock;
    self
  }

  fn now(&self) -> DateTime<Utc> {
    (self.clock)()
  }

  pub async fn state(&self) -> AppState {
    self.state.read().await.clone()
  }

  pub async fn take_warnings(&self) -> Vec<String> {
    std::mem::take(&mut *self.warnings.lock().await)
  }

  /// ---------------------------------------------------------------------------
  /// Session Lifecycle
  /// ---------------------------------------------------------------------------

  /// Loading -> Unauthenticated | Onboarding | Active. Never fails: any problem means no session.
  pub async fn restore(&self) -> AppState {
    let epoch = self.begin();
    *self.state.write().await = AppState::Loading;

    let next = match self.restore_inner().await {
      Ok(Some(state)) => state,
      Ok(None) => AppState::signed_out(),
      Err(e) => {
        warn!(error = %e, "Session restore failed, continuing signed out");
        AppState::signed_out()
      }
    };

    match self.commit(epoch, next).await {
      Ok(state) => state,
      Err(_) => self.state().await,
    }
  }

  async fn restore_inner(&self) -> Result<Option<AppState>, SessionError> {
    let Some(session) = self.remote("session restore", self.store.get_session()).await? else {
      return Ok(None);
    };
    let Some(record) = self
      .remote("profile read", self.store.get_profile(&session.user_id))
      .await?
    else {
      warn!(user_id = %session.user_id, "Session without a profile row");
      return Ok(None);
    };

    let profile = UserProfile::from(record);
    let plan = self.latest_plan(&session.user_id, &profile).await?;
    info!(user_id = %session.user_id, onboarded = !needs_onboarding(&profile), "Session restored");
    Ok(Some(AppState::routed(session.user_id, profile, plan)))
  }

  /// Unauthenticated -> Onboarding | Active
  pub async fn login(&self, email: &str, password: &str) -> Result<AppState, SessionError> {
    self.expect_unauthenticated("log in").await?;
    let epoch = self.begin();

    let session = self.remote("sign in", self.store.sign_in(email, password)).await?;
    let profile = match self
      .remote("profile read", self.store.get_profile(&session.user_id))
      .await?
    {
      Some(record) => UserProfile::from(record),
      None => {
        // Account exists but the profile row was never written
        let profile = self.new_account_profile(email_name(email), email);
        self.persist_new_profile(&session, &profile).await;
        profile
      }
    };
    let plan = self.latest_plan(&session.user_id, &profile).await?;

    info!(user_id = %session.user_id, "Logged in");
    self.commit(epoch, AppState::routed(session.user_id, profile, plan)).await
  }

  /// Unauthenticated -> Onboarding, always
  pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AppState, SessionError> {
    self.expect_unauthenticated("register").await?;
    let epoch = self.begin();

    let session = self.remote("sign up", self.store.sign_up(email, password)).await?;
    let profile = self.new_account_profile(name, email);

    let next = self
      .commit(
        epoch,
        AppState::Onboarding {
          user_id: session.user_id.clone(),
          profile: profile.clone(),
        },
      )
      .await?;

    info!(user_id = %session.user_id, "Registered, starting onboarding");
    self.persist_new_profile(&session, &profile).await;
    Ok(next)
  }

  /// Onboarding -> Active. `answers` carries the questionnaire fields; identity,
  /// gamification and subscription fields are kept from the current profile.
  pub async fn complete_onboarding(&self, answers: UserProfile) -> Result<GeneratedPlan, SessionError> {
    let (user_id, current) = match self.state().await {
      AppState::Onboarding { user_id, profile } => (user_id, profile),
      other => {
        return Err(SessionError::InvalidState {
          operation: "complete onboarding",
          state: other.name(),
        })
      }
    };

    let profile = merge_answers(&current, answers);
    if needs_onboarding(&profile) {
      error!(user_id = %user_id, "Onboarding completed without goal or weight");
      return Err(PlanError::InvalidProfile("goal and weight are required".to_string()).into());
    }

    let epoch = self.begin();
    let generated = generate_with_advisor(&profile, self.advisor.as_deref(), self.settings.advisor_timeout).await?;
    if generated.source == PlanSource::Fallback {
      debug!(user_id = %user_id, "Plan built from fallback content");
    }

    self
      .commit(
        epoch,
        AppState::Active(ActiveSession {
          user_id: user_id.clone(),
          profile: profile.clone(),
          plan: Some(generated.plan.clone()),
          router: ViewRouter::default(),
        }),
      )
      .await?;
    info!(user_id = %user_id, "Onboarding complete");

    self.record_body_snapshot(&user_id, &profile).await;
    let _guard = self.writes.lock().await;
    let saved = self
      .remote(
        "profile write",
        self.store.update_profile(&user_id, &ProfileRecord::onboarding_patch(&profile)),
      )
      .await;
    self.best_effort("profile", saved).await;
    let saved = self
      .remote("plan write", self.store.insert_plan(&user_id, &generated.plan))
      .await;
    self.best_effort("plan", saved).await;

    Ok(generated)
  }

  /// Active -> Unauthenticated. Local state is cleared even if the remote sign-out fails
  /// or another transition committed while it was in flight.
  pub async fn logout(&self) -> AppState {
    let epoch = self.begin();
    let result = self.remote("sign out", self.store.sign_out()).await;
    if let Err(e) = result {
      warn!(error = %e, "Remote sign-out failed");
    }

    // Applies even if a transition started while signing out
    let mut state = self.state.write().await;
    let next = AppState::signed_out();
    if self.epoch.load(Ordering::SeqCst) != epoch {
      debug!(from = state.name(), "Sign-out overrides a newer transition");
    }
    self.begin();
    *state = next.clone();
    next
  }

  /// React to store-side auth changes. Only `SignedOut` changes state.
  pub async fn handle_auth_event(&self, event: AuthEvent) {
    match event {
      AuthEvent::SignedOut => {
        let mut state = self.state.write().await;
        // An echo of our own sign-out must not cancel a login that started since
        if !matches!(*state, AppState::Unauthenticated { .. }) {
          self.begin();
          info!(from = state.name(), "Session invalidated externally");
          *state = AppState::signed_out();
        }
      }
      other => debug!(event = ?other, "Auth event"),
    }
  }

  /// Forward store auth events to `handle_auth_event` until the store goes away
  pub fn watch_auth_events(self: &Arc<Self>) -> JoinHandle<()> {
    let controller = Arc::clone(self);
    let mut events = self.store.subscribe();
    tokio::spawn(async move {
      loop {
        match events.recv().await {
          Ok(event) => controller.handle_auth_event(event).await,
          Err(broadcast::error::RecvError::Lagged(skipped)) => {
            warn!(skipped, "Auth event listener lagged");
          }
          Err(broadcast::error::RecvError::Closed) => break,
        }
      }
    })
  }

  pub async fn switch_auth_view(&self, view: AuthView) -> Result<AppState, SessionError> {
    let mut state = self.state.write().await;
    match &mut *state {
      AppState::Unauthenticated { auth_view } => {
        *auth_view = view;
        Ok(state.clone())
      }
      other => Err(SessionError::InvalidState {
        operation: "switch auth view",
        state: other.name(),
      }),
    }
  }

  /// ---------------------------------------------------------------------------
  /// Active Session Operations
  /// ---------------------------------------------------------------------------

  /// Apply edited answers to the profile. Account, subscription and gamification
  /// fields are kept from the session. Clearing goal or weight sends the user back to onboarding.
  pub async fn update_profile(&self, edited: UserProfile) -> Result<AppState, SessionError> {
    let epoch = self.epoch.load(Ordering::SeqCst);
    let (user_id, updated, next) = {
      let mut state = self.state.write().await;
      let (user_id, updated, next) = match std::mem::replace(&mut *state, AppState::Loading) {
        AppState::Active(session) => {
          let updated = merge_answers(&session.profile, edited);
          let user_id = session.user_id.clone();
          let next = if needs_onboarding(&updated) {
            warn!(user_id = %user_id, "Profile lost onboarding answers, back to onboarding");
            AppState::Onboarding {
              user_id: session.user_id,
              profile: updated.clone(),
            }
          } else {
            AppState::Active(ActiveSession {
              profile: updated.clone(),
              ..session
            })
          };
          (user_id, updated, next)
        }
        AppState::Onboarding { user_id, profile } => {
          let updated = merge_answers(&profile, edited);
          let next = AppState::Onboarding {
            user_id: user_id.clone(),
            profile: updated.clone(),
          };
          (user_id, updated, next)
        }
        other => {
          let name = other.name();
          *state = other;
          return Err(SessionError::InvalidState {
            operation: "update profile",
            state: name,
          });
        }
      };
      *state = next.clone();
      (user_id, updated, next)
    };

    self.invalidate_strategies(&user_id).await;
    self.record_body_snapshot(&user_id, &updated).await;

    let _guard = self.writes.lock().await;
    if self.epoch.load(Ordering::SeqCst) != epoch {
      return Err(SessionError::Stale);
    }
    let saved = self
      .remote(
        "profile write",
        self.store.update_profile(&user_id, &ProfileRecord::body_patch(&updated)),
      )
      .await;
    self.best_effort("profile", saved).await;
    Ok(next)
  }

  /// Build a fresh plan from the current profile; latest wins
  pub async fn regenerate_plan(&self) -> Result<GeneratedPlan, SessionError> {
    let epoch = self.epoch.load(Ordering::SeqCst);
    let active = self.active("regenerate plan").await?;

    let generated =
      generate_with_advisor(&active.profile, self.advisor.as_deref(), self.settings.advisor_timeout).await?;
    self
      .update_active(epoch, |session| session.plan = Some(generated.plan.clone()))
      .await?;
    info!(user_id = %active.user_id, source = ?generated.source, "Plan regenerated");

    self.invalidate_strategies(&active.user_id).await;
    let _guard = self.writes.lock().await;
    let saved = self
      .remote("plan write", self.store.insert_plan(&active.user_id, &generated.plan))
      .await;
    self.best_effort("plan", saved).await;
    Ok(generated)
  }

  /// Append today's check-in, credit the reward and return the day's strategy
  pub async fn record_check_in(&self, log: DailyLog) -> Result<CheckInOutcome, SessionError> {
    let epoch = self.epoch.load(Ordering::SeqCst);
    let active = self.active("check in").await?;

    journal::append_log(&self.pool, &active.user_id, &log).await?;
    let previous = journal::previous_log_date(&self.pool, &active.user_id, log.date).await?;

    let reward = reward_check_in(&active.profile, log.date, previous);
    let profile = self
      .update_active(epoch, |session| {
        apply_reward(&mut session.profile, reward);
        session.profile.clone()
      })
      .await?;
    if reward.leveled_up {
      info!(user_id = %active.user_id, level = reward.level, "Level up");
    }

    self.invalidate_strategies(&active.user_id).await;
    let strategy = self
      .strategy_for(&active.user_id, &profile, active.plan.as_ref(), &log)
      .await?;

    let _guard = self.writes.lock().await;
    let saved = self
      .remote(
        "gamification write",
        self.store.update_profile(&active.user_id, &ProfileRecord::gamification_patch(&profile)),
      )
      .await;
    self.best_effort("progress", saved).await;

    Ok(CheckInOutcome { strategy, reward })
  }

  /// Strategy for a day that already has a check-in; None otherwise
  pub async fn daily_strategy(&self, date: NaiveDate) -> Result<Option<DailyStrategy>, SessionError> {
    let active = self.active("load strategy").await?;
    let Some(log) = journal::log_for_date(&self.pool, &active.user_id, date).await? else {
      return Ok(None);
    };
    let strategy = self
      .strategy_for(&active.user_id, &active.profile, active.plan.as_ref(), &log)
      .await?;
    Ok(Some(strategy))
  }

  pub async fn insights(&self) -> Result<Vec<Insight>, SessionError> {
    let active = self.active("load insights").await?;
    let logs = journal::recent_logs(&self.pool, &active.user_id, INSIGHT_LOG_WINDOW).await?;
    let bmi = journal::recent_bmi(&self.pool, &active.user_id, journal::STRATEGY_BMI_WINDOW).await?;
    let since = self.now() - ChronoDuration::days(INSIGHT_ACTIVITY_DAYS);
    let activity = journal::activity_since(&self.pool, &active.user_id, since).await?;
    Ok(derive_insights(&active.profile, &logs, &bmi, &activity))
  }

  pub async fn record_activity(&self, entry: ActivityHistoryEntry) -> Result<(), SessionError> {
    let active = self.active("record activity").await?;
    journal::record_activity(&self.pool, &active.user_id, &entry).await?;
    self.invalidate_strategies(&active.user_id).await;
    Ok(())
  }

  pub async fn navigate(&self, view: View) -> Result<Screen, SessionError> {
    let now = self.now();
    self
      .update_active(self.epoch.load(Ordering::SeqCst), |session| {
        session.router.navigate(view, &session.profile, now)
      })
      .await
  }

  pub async fn open_upgrade(&self) -> Result<Screen, SessionError> {
    self
      .update_active(self.epoch.load(Ordering::SeqCst), |session| session.router.open_upgrade())
      .await
  }

  pub async fn resume_pending(&self) -> Result<Option<Screen>, SessionError> {
    let now = self.now();
    self
      .update_active(self.epoch.load(Ordering::SeqCst), |session| {
        session.router.resume_pending(&session.profile, now)
      })
      .await
  }

  /// ---------------------------------------------------------------------------
  /// Internals
  /// ---------------------------------------------------------------------------

  fn begin(&self) -> u64 {
    self.epoch.fetch_add(1, Ordering::SeqCst) + 1
  }

  /// Replace the state unless a newer transition started after `epoch`
  async fn commit(&self, epoch: u64, next: AppState) -> Result<AppState, SessionError> {
    let mut state = self.state.write().await;
    if self.epoch.load(Ordering::SeqCst) != epoch {
      debug!(epoch, "Dropping stale session result");
      return Err(SessionError::Stale);
    }
    *state = next.clone();
    Ok(next)
  }

  /// Mutate the active session in place, if it is still the one `epoch` saw
  async fn update_active<T>(
    &self,
    epoch: u64,
    f: impl FnOnce(&mut ActiveSession) -> T,
  ) -> Result<T, SessionError> {
    let mut state = self.state.write().await;
    if self.epoch.load(Ordering::SeqCst) != epoch {
      return Err(SessionError::Stale);
    }
    match &mut *state {
      AppState::Active(session) => Ok(f(session)),
      other => Err(SessionError::InvalidState {
        operation: "update session",
        state: other.name(),
      }),
    }
  }

  async fn active(&self, operation: &'static str) -> Result<ActiveSession, SessionError> {
    match &*self.state.read().await {
      AppState::Active(session) => Ok(session.clone()),
      other => Err(SessionError::InvalidState {
        operation,
        state: other.name(),
      }),
    }
  }

  async fn expect_unauthenticated(&self, operation: &'static str) -> Result<(), SessionError> {
    match &*self.state.read().await {
      AppState::Unauthenticated { .. } | AppState::Loading => Ok(()),
      other => Err(SessionError::InvalidState {
        operation,
        state: other.name(),
      }),
    }
  }

  /// Await a record store call with the request timeout
  async fn remote<T>(
    &self,
    operation: &'static str,
    call: impl Future<Output = Result<T, StoreError>>,
  ) -> Result<T, SessionError> {
    match tokio::time::timeout(self.settings.request_timeout, call).await {
      Ok(result) => Ok(result?),
      Err(_) => {
        warn!(operation, timeout_secs = self.settings.request_timeout.as_secs(), "Record store call timed out");
        Err(SessionError::Timeout(operation))
      }
    }
  }

  async fn latest_plan(&self, user_id: &str, profile: &UserProfile) -> Result<Option<PersonalizedPlan>, SessionError> {
    if needs_onboarding(profile) {
      return Ok(None);
    }
    let record = self.remote("plan read", self.store.get_latest_plan(user_id)).await?;
    Ok(record.map(|r| r.plan_data))
  }

  fn new_account_profile(&self, name: &str, email: &str) -> UserProfile {
    let trial_end = self.now() + ChronoDuration::days(self.settings.trial_days);
    UserProfile::new_account(name, email, trial_end)
  }

  async fn persist_new_profile(&self, session: &Session, profile: &UserProfile) {
    let _guard = self.writes.lock().await;
    let saved = self
      .remote(
        "profile create",
        self.store.create_profile(&session.user_id, &ProfileRecord::from(profile)),
      )
      .await;
    self.best_effort("profile", saved).await;
  }

  async fn best_effort(&self, what: &str, result: Result<(), SessionError>) {
    if let Err(e) = result {
      warn!(what, error = %e, "Persistence failed, keeping in-memory state");
      self
        .warnings
        .lock()
        .await
        .push(format!("Could not save {}: {}", what, e));
    }
  }

  async fn invalidate_strategies(&self, user_id: &str) {
    if let Err(e) = journal::invalidate_strategies(&self.pool, user_id).await {
      warn!(user_id, error = %e, "Could not clear cached strategies");
    }
  }

  async fn record_body_snapshot(&self, user_id: &str, profile: &UserProfile) {
    let (Some(weight), Some(height)) = (profile.known_weight(), profile.height) else {
      return;
    };
    let Some(entry) = BmiHistoryEntry::observe(weight, height, self.now()) else {
      return;
    };
    if let Err(e) = journal::record_bmi(&self.pool, user_id, &entry).await {
      warn!(user_id, error = %e, "Could not record BMI entry");
    }
  }

  /// Serve from cache when the inputs are unchanged, else derive and cache
  async fn strategy_for(
    &self,
    user_id: &str,
    profile: &UserProfile,
    plan: Option<&PersonalizedPlan>,
    log: &DailyLog,
  ) -> Result<DailyStrategy, SessionError> {
    let context = journal::load_strategy_context(&self.pool, user_id, log.date).await?;
    let input = StrategyInput {
      profile,
      plan,
      latest_log: log,
      recent_logs: &context.recent_logs,
      recent_bmi: &context.recent_bmi,
      recent_activity: &context.recent_activity,
    };

    let fingerprint = journal::fingerprint(&input)?;
    if let Some(cached) = journal::cached_strategy(&self.pool, user_id, log.date, &fingerprint).await? {
      return Ok(cached);
    }

    let strategy = derive_strategy(&input);
    debug!(user_id, date = %log.date, tier = ?strategy.tier, "Derived daily strategy");
    if let Err(e) = journal::cache_strategy(&self.pool, user_id, &strategy, &fingerprint).await {
      warn!(user_id, error = %e, "Could not cache strategy");
    }
    Ok(strategy)
  }
}

/// Questionnaire answers on top of the account fields the user does not edit during onboarding
fn merge_answers(current: &UserProfile, answers: UserProfile) -> UserProfile {
  UserProfile {
    name: current.name.clone(),
    email: current.email.clone(),
    points: current.points,
    level: current.level,
    streak_days: current.streak_days,
    subscription_status: current.subscription_status,
    trial_end_date: current.trial_end_date,
    subscription_end_date: current.subscription_end_date,
    ..answers
  }
}

/// Display name for an account created without one
fn email_name(email: &str) -> &str {
  email.split('@').next().filter(|s| !s.is_empty()).unwrap_or(email)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
