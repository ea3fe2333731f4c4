//! Remote record store: authentication, profile rows and plan rows
//!
//! `RecordStore` is the capability the session controller consumes.
//! `HttpRecordStore` talks to a Supabase-compatible REST backend and keeps
//! the current session in the local `auth_session` table.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{PersonalizedPlan, PlanRecord, ProfileRecord};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
const AUTH_EVENT_CAPACITY: usize = 16;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Not authenticated")]
  NotAuthenticated,

  #[error("Authentication failed: {0}")]
  Auth(String),

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("Record store error ({status}): {message}")]
  Api { status: u16, message: String },

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Session storage error: {0}")]
  Storage(String),
}

impl From<reqwest::Error> for StoreError {
  fn from(e: reqwest::Error) -> Self {
    StoreError::Request(e.to_string())
  }
}

impl From<sqlx::Error> for StoreError {
  fn from(e: sqlx::Error) -> Self {
    StoreError::Storage(e.to_string())
  }
}

impl From<url::ParseError> for StoreError {
  fn from(e: url::ParseError) -> Self {
    StoreError::Request(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Session & Events
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub user_id: String,
  pub access_token: String,
  pub refresh_token: String,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
    now + Duration::minutes(TOKEN_REFRESH_BUFFER_MINUTES) >= self.expires_at
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
  SignedIn { user_id: String },
  TokenRefreshed { user_id: String },
  SignedOut,
}

/// ---------------------------------------------------------------------------
/// Capability
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait RecordStore: Send + Sync {
  /// Current valid session, refreshed if close to expiry. None when signed out or refresh failed.
  async fn get_session(&self) -> Result<Option<Session>, StoreError>;

  async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;

  async fn sign_up(&self, email: &str, password: &str) -> Result<Session, StoreError>;

  async fn sign_out(&self) -> Result<(), StoreError>;

  async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, StoreError>;

  async fn create_profile(&self, user_id: &str, record: &ProfileRecord) -> Result<(), StoreError>;

  /// Partial update; absent fields are left untouched
  async fn update_profile(&self, user_id: &str, patch: &ProfileRecord) -> Result<(), StoreError>;

  /// Plan with the greatest `created_at`
  async fn get_latest_plan(&self, user_id: &str) -> Result<Option<PlanRecord>, StoreError>;

  async fn insert_plan(&self, user_id: &str, plan: &PersonalizedPlan) -> Result<(), StoreError>;

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// ---------------------------------------------------------------------------
/// Auth API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
  refresh_token: String,
  #[serde(default)]
  expires_in: Option<i64>,
  #[serde(default)]
  expires_at: Option<i64>,
  user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
  id: String,
}

impl TokenResponse {
  fn into_session(self, now: DateTime<Utc>) -> Session {
    let expires_at = self
      .expires_at
      .and_then(|ts| DateTime::from_timestamp(ts, 0))
      .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)));
    Session {
      user_id: self.user.id,
      access_token: self.access_token,
      refresh_token: self.refresh_token,
      expires_at,
    }
  }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
  email: &'a str,
  password: &'a str,
}

#[derive(Debug, Serialize)]
struct NewPlanRow<'a> {
  user_id: &'a str,
  plan_data: &'a PersonalizedPlan,
}

/// ---------------------------------------------------------------------------
/// HTTP Record Store
/// ---------------------------------------------------------------------------

pub struct HttpRecordStore {
  client: Client,
  base_url: Url,
  anon_key: String,
  pool: SqlitePool,
  events: broadcast::Sender<AuthEvent>,
}

impl HttpRecordStore {
  pub fn new(
    base_url: &str,
    anon_key: impl Into<String>,
    pool: SqlitePool,
    timeout: StdDuration,
  ) -> Result<Self, StoreError> {
    // Trailing slash so relative joins keep any path prefix
    let normalized = format!("{}/", base_url.trim_end_matches('/'));
    let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

    Ok(Self {
      client: Client::builder().timeout(timeout).build()?,
      base_url: Url::parse(&normalized)?,
      anon_key: anon_key.into(),
      pool,
      events,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
    Ok(self.base_url.join(path)?)
  }

  fn with_auth(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
    request.header("apikey", &self.anon_key).bearer_auth(access_token)
  }

  async fn access_token(&self) -> Result<String, StoreError> {
    self
      .get_session()
      .await?
      .map(|s| s.access_token)
      .ok_or(StoreError::NotAuthenticated)
  }

  fn notify(&self, event: AuthEvent) {
    // No subscribers is fine
    let _ = self.events.send(event);
  }

  async fn token_grant<T: Serialize + ?Sized>(&self, grant_type: &str, body: &T) -> Result<Session, StoreError> {
    let mut url = self.endpoint("auth/v1/token")?;
    url.query_pairs_mut().append_pair("grant_type", grant_type);

    let response = self
      .client
      .post(url)
      .header("apikey", &self.anon_key)
      .json(body)
      .send()
      .await?;

    if response.status().is_client_error() {
      let message = error_message(response).await;
      return Err(StoreError::Auth(message));
    }
    let response = check(response).await?;
    let tokens: TokenResponse = response.json().await.map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(tokens.into_session(Utc::now()))
  }

  async fn refresh(&self, session: &Session) -> Result<Session, StoreError> {
    #[derive(Serialize)]
    struct RefreshBody<'a> {
      refresh_token: &'a str,
    }

    self
      .token_grant(
        "refresh_token",
        &RefreshBody {
          refresh_token: &session.refresh_token,
        },
      )
      .await
  }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
  async fn get_session(&self) -> Result<Option<Session>, StoreError> {
    let Some(session) = load_session(&self.pool).await? else {
      return Ok(None);
    };
    if !session.needs_refresh(Utc::now()) {
      return Ok(Some(session));
    }

    debug!(user_id = %session.user_id, "Refreshing record store session");
    match self.refresh(&session).await {
      Ok(refreshed) => {
        save_session(&self.pool, &refreshed).await?;
        self.notify(AuthEvent::TokenRefreshed {
          user_id: refreshed.user_id.clone(),
        });
        Ok(Some(refreshed))
      }
      Err(e) => {
        warn!(user_id = %session.user_id, error = %e, "Session refresh failed, signing out locally");
        clear_session(&self.pool).await?;
        self.notify(AuthEvent::SignedOut);
        Ok(None)
      }
    }
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
    let session = self.token_grant("password", &Credentials { email, password }).await?;
    save_session(&self.pool, &session).await?;
    info!(user_id = %session.user_id, "Signed in");
    self.notify(AuthEvent::SignedIn {
      user_id: session.user_id.clone(),
    });
    Ok(session)
  }

  async fn sign_up(&self, email: &str, password: &str) -> Result<Session, StoreError> {
    let response = self
      .client
      .post(self.endpoint("auth/v1/signup")?)
      .header("apikey", &self.anon_key)
      .json(&Credentials { email, password })
      .send()
      .await?;

    if response.status().is_client_error() {
      let message = error_message(response).await;
      return Err(StoreError::Auth(message));
    }
    let body = check(response).await?.text().await?;

    // Without a token pair the backend is waiting for email confirmation
    let tokens: TokenResponse = serde_json::from_str(&body)
      .map_err(|_| StoreError::Auth("Confirm your email address before signing in".to_string()))?;
    let session = tokens.into_session(Utc::now());

    save_session(&self.pool, &session).await?;
    info!(user_id = %session.user_id, "Registered");
    self.notify(AuthEvent::SignedIn {
      user_id: session.user_id.clone(),
    });
    Ok(session)
  }

  async fn sign_out(&self) -> Result<(), StoreError> {
    if let Some(session) = load_session(&self.pool).await? {
      let request = self.client.post(self.endpoint("auth/v1/logout")?);
      let result = self.with_auth(request, &session.access_token).send().await;
      match result {
        Ok(response) if !response.status().is_success() => {
          warn!(status = %response.status(), "Remote sign-out rejected");
        }
        Err(e) => warn!(error = %e, "Remote sign-out failed"),
        Ok(_) => {}
      }
    }

    clear_session(&self.pool).await?;
    info!("Signed out");
    self.notify(AuthEvent::SignedOut);
    Ok(())
  }

  async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, StoreError> {
    let token = self.access_token().await?;
    let mut url = self.endpoint("rest/v1/profiles")?;
    url
      .query_pairs_mut()
      .append_pair("id", &format!("eq.{}", user_id))
      .append_pair("select", "*");

    let response = check(self.with_auth(self.client.get(url), &token).send().await?).await?;
    let rows: Vec<ProfileRecord> = response.json().await.map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(rows.into_iter().next())
  }

  async fn create_profile(&self, user_id: &str, record: &ProfileRecord) -> Result<(), StoreError> {
    let token = self.access_token().await?;
    let row = ProfileRecord {
      id: Some(user_id.to_string()),
      ..record.clone()
    };

    let request = self
      .client
      .post(self.endpoint("rest/v1/profiles")?)
      .header("Prefer", "return=minimal")
      .json(&row);
    check(self.with_auth(request, &token).send().await?).await?;
    Ok(())
  }

  async fn update_profile(&self, user_id: &str, patch: &ProfileRecord) -> Result<(), StoreError> {
    let token = self.access_token().await?;
    let mut url = self.endpoint("rest/v1/profiles")?;
    url.query_pairs_mut().append_pair("id", &format!("eq.{}", user_id));

    let request = self
      .client
      .patch(url)
      .header("Prefer", "return=minimal")
      .json(patch);
    check(self.with_auth(request, &token).send().await?).await?;
    Ok(())
  }

  async fn get_latest_plan(&self, user_id: &str) -> Result<Option<PlanRecord>, StoreError> {
    let token = self.access_token().await?;
    let mut url = self.endpoint("rest/v1/plans")?;
    url
      .query_pairs_mut()
      .append_pair("user_id", &format!("eq.{}", user_id))
      .append_pair("order", "created_at.desc")
      .append_pair("limit", "1");

    let response = check(self.with_auth(self.client.get(url), &token).send().await?).await?;
    let rows: Vec<PlanRecord> = response.json().await.map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(rows.into_iter().next())
  }

  async fn insert_plan(&self, user_id: &str, plan: &PersonalizedPlan) -> Result<(), StoreError> {
    let token = self.access_token().await?;
    let request = self
      .client
      .post(self.endpoint("rest/v1/plans")?)
      .header("Prefer", "return=minimal")
      .json(&NewPlanRow {
        user_id,
        plan_data: plan,
      });
    check(self.with_auth(request, &token).send().await?).await?;
    Ok(())
  }

  fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
    self.events.subscribe()
  }
}

/// Pass successful responses through, turn the rest into `StoreError::Api`
async fn check(response: Response) -> Result<Response, StoreError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  if status == reqwest::StatusCode::UNAUTHORIZED {
    return Err(StoreError::NotAuthenticated);
  }
  let message = error_message(response).await;
  Err(StoreError::Api {
    status: status.as_u16(),
    message,
  })
}

/// Best human-readable message from an error body
async fn error_message(response: Response) -> String {
  let status = response.status();
  let body = response.text().await.unwrap_or_default();
  serde_json::from_str::<serde_json::Value>(&body)
    .ok()
    .and_then(|v| {
      ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(String::from))
    })
    .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

/// ---------------------------------------------------------------------------
/// Persisted Session
/// ---------------------------------------------------------------------------

pub async fn load_session(pool: &SqlitePool) -> Result<Option<Session>, StoreError> {
  let row = sqlx::query(
    "SELECT user_id, access_token, refresh_token, expires_at FROM auth_session WHERE id = 1",
  )
  .fetch_optional(pool)
  .await?;

  let Some(row) = row else {
    return Ok(None);
  };
  let expires_at: String = row.get("expires_at");
  let expires_at = DateTime::parse_from_rfc3339(&expires_at)
    .map_err(|e| StoreError::Storage(e.to_string()))?
    .with_timezone(&Utc);

  Ok(Some(Session {
    user_id: row.get("user_id"),
    access_token: row.get("access_token"),
    refresh_token: row.get("refresh_token"),
    expires_at,
  }))
}

pub async fn save_session(pool: &SqlitePool, session: &Session) -> Result<(), StoreError> {
  sqlx::query(
    r#"
    INSERT INTO auth_session (id, user_id, access_token, refresh_token, expires_at)
    VALUES (1, ?1, ?2, ?3, ?4)
    ON CONFLICT(id) DO UPDATE SET
      user_id = excluded.user_id,
      access_token = excluded.access_token,
      refresh_token = excluded.refresh_token,
      expires_at = excluded.expires_at,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(&session.user_id)
  .bind(&session.access_token)
  .bind(&session.refresh_token)
  .bind(session.expires_at.to_rfc3339())
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn clear_session(pool: &SqlitePool) -> Result<(), StoreError> {
  sqlx::query("DELETE FROM auth_session").execute(pool).await?;
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
