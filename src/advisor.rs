//! Advisory service for plan wording
//!
//! The advisor only writes text (meal titles, descriptions, substitutions and
//! tips) for numbers the plan generator already fixed. The Claude-backed
//! implementation talks to the Messages API; tests and offline runs inject
//! their own `Advisor`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const CLAUDE_API_URL: &str = "https://api.anthropic.com";
const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1500;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum AdvisorError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl From<reqwest::Error> for AdvisorError {
  fn from(e: reqwest::Error) -> Self {
    AdvisorError::Request(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Capability
/// ---------------------------------------------------------------------------

/// One meal slot the advisor has to write text for
#[derive(Debug, Clone, Serialize)]
pub struct MealSlot {
  pub slot: String,
  pub calories: f64,
  pub protein: f64,
  pub carbohydrates: f64,
  pub fats: f64,
}

/// Constraints sent to the advisor
#[derive(Debug, Clone, Serialize)]
pub struct PlanContentRequest {
  pub goal: String,
  pub daily_calories: f64,
  pub meals: Vec<MealSlot>,
  pub dietary_restrictions: Option<String>,
  pub meal_prep_preference: Option<String>,
  pub cooking_habit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealText {
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub substitutions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanContent {
  pub meals: Vec<MealText>,
  #[serde(default)]
  pub tips: Vec<String>,
}

#[async_trait]
pub trait Advisor: Send + Sync {
  async fn plan_content(&self, request: &PlanContentRequest) -> Result<PlanContent, AdvisorError>;
}

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  system: &'a str,
  messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Claude Advisor
/// ---------------------------------------------------------------------------

pub struct ClaudeAdvisor {
  client: Client,
  api_key: String,
  base_url: String,
}

impl ClaudeAdvisor {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self::with_base_url(api_key, CLAUDE_API_URL)
  }

  pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      api_key: api_key.into(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  async fn complete(&self, system_prompt: &str, user_message: String) -> Result<String, AdvisorError> {
    let request = ClaudeRequest {
      model: CLAUDE_MODEL,
      max_tokens: MAX_TOKENS,
      system: system_prompt,
      messages: vec![ClaudeMessage {
        role: "user".to_string(),
        content: user_message,
      }],
    };

    let response = self
      .client
      .post(format!("{}/v1/messages", self.base_url))
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(AdvisorError::Api(error_resp.error.message));
      }
      return Err(AdvisorError::Api(format!("HTTP {}: {}", status, body)));
    }

    let parsed: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| AdvisorError::Parse(e.to_string()))?;

    parsed
      .content
      .into_iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text)
      .ok_or_else(|| AdvisorError::Parse("No text content in response".to_string()))
  }
}

#[async_trait]
impl Advisor for ClaudeAdvisor {
  async fn plan_content(&self, request: &PlanContentRequest) -> Result<PlanContent, AdvisorError> {
    let system_prompt = include_str!("prompts/nutrition_system.txt");
    let constraints =
      serde_json::to_string_pretty(request).map_err(|e| AdvisorError::Parse(e.to_string()))?;

    let user_message = format!(
      r#"Write the meal plan text for these fixed targets.

CONSTRAINTS:
{}

Respond with JSON only: {{"meals": [{{"title": "...", "description": "...", "substitutions": ["..."]}}], "tips": ["..."]}}
Return exactly {} meals, in the same order as the slots."#,
      constraints,
      request.meals.len()
    );

    let text = self.complete(system_prompt, user_message).await?;
    let json = extract_json(&text)?;
    serde_json::from_str(json).map_err(|e| AdvisorError::Parse(format!("{}: {}", e, json)))
  }
}

/// Pull the JSON object out of a reply that may wrap it in prose or a code fence
fn extract_json(text: &str) -> Result<&str, AdvisorError> {
  let trimmed = text.trim();
  if trimmed.starts_with('{') && trimmed.ends_with('}') {
    return Ok(trimmed);
  }

  let body = match trimmed.find("```") {
    Some(fence) => {
      let after = &trimmed[fence + 3..];
      // Skip the language tag line
      let start = after.find('\n').map(|i| i + 1).unwrap_or(0);
      let inner = &after[start..];
      inner.find("```").map(|end| &inner[..end]).unwrap_or(inner)
    }
    None => trimmed,
  };

  match (body.find('{'), body.rfind('}')) {
    (Some(start), Some(end)) if start < end => Ok(body[start..=end].trim()),
    _ => Err(AdvisorError::Parse("Could not extract JSON from response".to_string())),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
