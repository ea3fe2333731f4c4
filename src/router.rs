//! Navigation between named views for an active session
//!
//! Premium views are admitted only while the subscription is active. A
//! blocked request lands on the paywall, which remembers the destination so
//! an upgrade can resume it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::is_subscription_active;
use crate::models::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
  Dashboard,
  Calorie,
  Meal,
  Water,
  Bmi,
  Activity,
  Chat,
  Profile,
  Emergency,
  Insights,
  Strategy,
}

impl View {
  pub const ALL: [View; 11] = [
    View::Dashboard,
    View::Calorie,
    View::Meal,
    View::Water,
    View::Bmi,
    View::Activity,
    View::Chat,
    View::Profile,
    View::Emergency,
    View::Insights,
    View::Strategy,
  ];

  /// Photo calorie analysis and meal planning
  pub fn is_premium(&self) -> bool {
    matches!(self, View::Calorie | View::Meal)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      View::Dashboard => "dashboard",
      View::Calorie => "calorie",
      View::Meal => "meal",
      View::Water => "water",
      View::Bmi => "bmi",
      View::Activity => "activity",
      View::Chat => "chat",
      View::Profile => "profile",
      View::Emergency => "emergency",
      View::Insights => "insights",
      View::Strategy => "strategy",
    }
  }
}

impl std::str::FromStr for View {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    View::ALL
      .into_iter()
      .find(|v| v.as_str() == s)
      .ok_or_else(|| format!("Unknown view: {}", s))
  }
}

/// What is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
  View { view: View },
  Paywall { requested: View },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRouter {
  current: Screen,
  /// Premium destination blocked by the paywall, kept until it is entered
  pending_redirect: Option<View>,
}

impl Default for ViewRouter {
  fn default() -> Self {
    Self {
      current: Screen::View {
        view: View::Dashboard,
      },
      pending_redirect: None,
    }
  }
}

impl ViewRouter {
  pub fn current(&self) -> Screen {
    self.current
  }

  pub fn pending_redirect(&self) -> Option<View> {
    self.pending_redirect
  }

  pub fn navigate(&mut self, view: View, profile: &UserProfile, now: DateTime<Utc>) -> Screen {
    self.current = if view.is_premium() && !is_subscription_active(profile, now) {
      self.pending_redirect = Some(view);
      Screen::Paywall { requested: view }
    } else {
      if self.pending_redirect == Some(view) {
        self.pending_redirect = None;
      }
      Screen::View { view }
    };
    self.current
  }

  /// Paywall call to action; the blocked destination stays pending
  pub fn open_upgrade(&mut self) -> Screen {
    self.current = Screen::View {
      view: View::Profile,
    };
    self.current
  }

  /// Enter the pending destination if the subscription now allows it
  pub fn resume_pending(&mut self, profile: &UserProfile, now: DateTime<Utc>) -> Option<Screen> {
    let requested = self.pending_redirect?;
    if !is_subscription_active(profile, now) {
      return None;
    }
    Some(self.navigate(requested, profile, now))
  }

  /// Re-check the current screen after the clock or the subscription moved
  pub fn refresh(&mut self, profile: &UserProfile, now: DateTime<Utc>) -> Screen {
    match self.current {
      Screen::View { view } if view.is_premium() => self.navigate(view, profile, now),
      Screen::Paywall { requested } if is_subscription_active(profile, now) => {
        self.navigate(requested, profile, now)
      }
      screen => screen,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
