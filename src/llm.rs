//! LLM integration for workout plan generation
//!
//! This module handles communication with the Gemini API. The model only
//! ever proposes a plan; `plan_parser` decides whether it is usable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::baseline::ExerciseBaseline;
use crate::config::GeminiConfig;
use crate::weight_step;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Gemini API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  system_instruction: Content,
  contents: Vec<Content>,
  generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
  text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: String,
  temperature: f32,
  max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  content: Option<Content>,
  #[allow(dead_code)]
  finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
  #[serde(default)]
  pub prompt_token_count: u32,
  #[serde(default)]
  pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
  error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Plan Provider
/// ---------------------------------------------------------------------------

/// Anything that can turn a prompt into raw plan text.
#[async_trait]
pub trait PlanProvider: Send + Sync {
  fn name(&self) -> &'static str;

  async fn request_plan(&self, baselines: &[ExerciseBaseline]) -> Result<String, LlmError>;
}

/// ---------------------------------------------------------------------------
/// Gemini Client
/// ---------------------------------------------------------------------------

pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_seconds))
      .build()
      .map_err(|e| LlmError::Request(e.to_string()))?;

    Ok(Self { client, config })
  }

  /// Create a new Gemini client, loading API key from environment
  pub fn from_env() -> Result<Self, LlmError> {
    Self::new(GeminiConfig::from_env()?)
  }

  fn endpoint(&self) -> Result<Url, LlmError> {
    let action = format!("{}:generateContent", self.config.model);
    let mut url =
      Url::parse(&self.config.base_url).map_err(|e| LlmError::Request(e.to_string()))?;
    url
      .path_segments_mut()
      .map_err(|_| LlmError::Request(format!("Invalid base URL: {}", self.config.base_url)))?
      .pop_if_empty()
      .extend(["v1beta", "models", action.as_str()]);
    url.query_pairs_mut().append_pair("key", &self.config.api_key);
    Ok(url)
  }

  /// Call Gemini with a system prompt and user message, JSON output mode
  pub async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<(String, Usage), LlmError> {
    let request = GenerateContentRequest {
      system_instruction: Content {
        role: None,
        parts: vec![Part {
          text: Some(system_prompt.to_string()),
        }],
      },
      contents: vec![Content {
        role: Some("user".to_string()),
        parts: vec![Part {
          text: Some(user_message.to_string()),
        }],
      }],
      generation_config: GenerationConfig {
        response_mime_type: "application/json".to_string(),
        temperature: self.config.temperature,
        max_output_tokens: max_tokens,
      },
    };

    let response = self
      .client
      .post(self.endpoint()?)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      // Try to parse error response
      if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let gemini_response: GenerateContentResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    // Concatenate text parts of the first candidate
    let text = gemini_response
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .map(|content| {
        content
          .parts
          .into_iter()
          .filter_map(|p| p.text)
          .collect::<Vec<_>>()
          .join("")
      })
      .filter(|t| !t.trim().is_empty())
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))?;

    Ok((text, gemini_response.usage_metadata.unwrap_or_default()))
  }
}

#[async_trait]
impl PlanProvider for GeminiClient {
  fn name(&self) -> &'static str {
    "gemini"
  }

  async fn request_plan(&self, baselines: &[ExerciseBaseline]) -> Result<String, LlmError> {
    let system_prompt = include_str!("prompts/plan_system.txt");
    let user_message = build_plan_prompt(baselines);

    let (text, usage) = self.complete(system_prompt, &user_message, 2048).await?;
    info!(
      model = %self.config.model,
      prompt_tokens = usage.prompt_token_count,
      output_tokens = usage.candidates_token_count,
      "AI plan received"
    );

    Ok(text)
  }
}

/// ---------------------------------------------------------------------------
/// Prompt Construction
/// ---------------------------------------------------------------------------

fn format_weight(weight: f64) -> String {
  if weight.fract().abs() > f64::EPSILON {
    format!("{}kg", weight)
  } else {
    format!("{:.0}kg", weight)
  }
}

/// Describe the roster and the deterministic baseline for each exercise
pub fn build_plan_prompt(baselines: &[ExerciseBaseline]) -> String {
  let exercises = baselines
    .iter()
    .map(|b| {
      let e = &b.exercise;
      let mut block = format!(
        "- exercise_id: {}\n  name: {}\n  equipment: {} (step {})\n  type: {}, primary: {}, level: {}\n  baseline: {} x {} reps (range {}-{})\n",
        e.stable_id,
        e.name,
        e.equipment,
        format_weight(weight_step::increment_kg(e.equipment)),
        e.movement_type,
        e.primary_group,
        e.difficulty,
        format_weight(b.progression.weight_kg),
        b.progression.target_reps,
        b.rep_range.min,
        b.rep_range.max,
      );
      match b.last_top_weight {
        Some(w) => block.push_str(&format!(
          "  history: {} recent sessions, last top set {}\n",
          b.sessions_considered,
          format_weight(w)
        )),
        None => block.push_str("  history: none\n"),
      }
      if let Some(note) = &b.progression.stall_note {
        block.push_str(&format!("  stalled: {}\n", note));
      }
      block
    })
    .collect::<Vec<_>>()
    .join("");

  let prompt = format!(
    r#"Plan today's session.

EXERCISES:
{}
Respond with valid JSON matching the OUTPUT FORMAT specified in your instructions."#,
    exercises
  );
  debug!(chars = prompt.len(), "built plan prompt");
  prompt
}

/// Extract JSON from a model response (handles markdown code blocks)
pub fn extract_json(text: &str) -> Result<String, LlmError> {
  // Try direct parse first
  if text.trim().starts_with('{') {
    return Ok(text.trim().to_string());
  }

  // Look for JSON in code blocks
  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  // Look for plain code blocks
  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  // Last resort: find first { to last }
  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse("Could not extract JSON from response".to_string()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
