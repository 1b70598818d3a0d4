//! Environment-driven configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Nothing here is required: without an API key the planner simply
//! runs on the deterministic baseline.

use std::env;

use thiserror::Error;

use crate::llm::LlmError;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TEMPERATURE: f32 = 0.4;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_DATABASE_URL: &str = "sqlite://lift-log.db?mode=rwc";
const DEFAULT_HISTORY_SESSIONS: usize = 3;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

/// ---------------------------------------------------------------------------
/// Gemini
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key: String,
  pub model: String,
  pub base_url: String,
  pub temperature: f32,
  pub timeout_seconds: u64,
}

impl GeminiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key: api_key.into(),
      model: DEFAULT_GEMINI_MODEL.to_string(),
      base_url: GEMINI_BASE_URL.to_string(),
      temperature: DEFAULT_TEMPERATURE,
      timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
    }
  }

  pub fn from_env() -> Result<Self, LlmError> {
    let api_key = env::var("GEMINI_API_KEY")
      .ok()
      .filter(|k| !k.trim().is_empty())
      .ok_or(LlmError::MissingApiKey)?;

    let mut config = Self::new(api_key);
    if let Ok(model) = env::var("GEMINI_MODEL") {
      config.model = model;
    }
    if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
      config.base_url = base_url;
    }
    Ok(config)
  }
}

/// ---------------------------------------------------------------------------
/// Application
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CoachConfig {
  /// None disables AI planning entirely
  pub gemini: Option<GeminiConfig>,
  pub database_url: String,
  /// Sessions of history fed to the progression engine per exercise
  pub history_sessions: usize,
  pub log_level: String,
}

impl Default for CoachConfig {
  fn default() -> Self {
    Self {
      gemini: None,
      database_url: DEFAULT_DATABASE_URL.to_string(),
      history_sessions: DEFAULT_HISTORY_SESSIONS,
      log_level: DEFAULT_LOG_LEVEL.to_string(),
    }
  }
}

impl CoachConfig {
  /// Load `.env` (if present) then read the environment
  pub fn load() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_env()
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let history_sessions = match env::var("LIFT_LOG_HISTORY_SESSIONS") {
      Ok(raw) => match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => n,
        _ => {
          return Err(ConfigError::Invalid {
            key: "LIFT_LOG_HISTORY_SESSIONS".to_string(),
            value: raw,
          })
        }
      },
      Err(_) => defaults.history_sessions,
    };

    Ok(Self {
      gemini: GeminiConfig::from_env().ok(),
      database_url: env::var("LIFT_LOG_DATABASE_URL").unwrap_or(defaults.database_url),
      history_sessions,
      log_level: env::var("LIFT_LOG_LOG_LEVEL").unwrap_or(defaults.log_level),
    })
  }
}
