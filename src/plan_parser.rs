//! Boundary adapter for AI-generated workout plans
//!
//! The model's output is untrusted. This module decodes it leniently, drops
//! exercises it invented, clamps every number into a safe range, and only
//! then hands back a `GeneratedPlan`. Anything unusable comes back as a
//! `PlanError` so the caller can fall back to the baseline generator.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::extract_json;
use crate::models::{ExerciseForPlan, ExercisePlan, GeneratedPlan, PlannedSet, SessionSummary, SetType};

/// ---------------------------------------------------------------------------
/// Safety Limits
/// ---------------------------------------------------------------------------

pub const MIN_REPS: u32 = 1;
pub const MAX_REPS: u32 = 50;
pub const MIN_REST_SECONDS: u32 = 30;
pub const MAX_REST_SECONDS: u32 = 300;
pub const DEFAULT_REST_SECONDS: u32 = 90;
pub const WARMUP_REST_SECONDS: u32 = 60;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

/// Every variant means the same thing to the caller: use the baseline plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
  #[error("AI plan unusable: could not decode response ({0})")]
  Decode(String),

  #[error("AI plan unusable: response contained no exercise plans")]
  EmptyPlan,

  #[error("AI plan unusable: no exercise plans matched the requested exercises")]
  NoMatchingExercises,
}

impl PlanError {
  pub fn is_unusable(&self) -> bool {
    true
  }
}

impl Serialize for PlanError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Wire Format (as the model returns it)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiPlanResponse {
  #[serde(default, deserialize_with = "lenient_list")]
  pub exercise_plans: Vec<AiExercisePlan>,
  #[serde(default, deserialize_with = "lenient_object")]
  pub session_summary: Option<AiSessionSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiExercisePlan {
  #[serde(default, deserialize_with = "lenient_id")]
  pub exercise_id: String,
  #[serde(default, deserialize_with = "lenient_list")]
  pub warmup_sets: Vec<AiSet>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub working_sets: Vec<AiSet>,
  #[serde(default, deserialize_with = "lenient_number")]
  pub rest_seconds: Option<f64>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSet {
  #[serde(default, deserialize_with = "lenient_number")]
  pub weight: Option<f64>,
  #[serde(default, deserialize_with = "lenient_number")]
  pub reps: Option<f64>,
  #[serde(default, deserialize_with = "lenient_number")]
  pub set_number: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiSessionSummary {
  #[serde(default, deserialize_with = "lenient_number")]
  pub estimated_duration_minutes: Option<f64>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub focus: Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub notes: Option<String>,
}

/// Accept `80`, `80.5` or `"80"`; anything else (null, words, NaN) is None.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  let number = match value {
    Some(Value::Number(n)) => n.as_f64(),
    Some(Value::String(s)) => s.trim().trim_end_matches("kg").trim().parse::<f64>().ok(),
    _ => None,
  };
  Ok(number.filter(|n| n.is_finite()))
}

/// A list where `null` means empty and each malformed item is dropped on
/// its own. Only a non-list value fails the decode.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
  Ok(
    items
      .into_iter()
      .filter_map(|item| match serde_json::from_value(item) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
          warn!(error = %e, "dropping malformed AI plan item");
          None
        }
      })
      .collect(),
  )
}

/// An optional object that decodes to None when it has the wrong shape
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Stable IDs are strings; anything else can never match the roster
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(id)) => Ok(id),
    _ => Ok(String::new()),
  }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(text)) => Ok(Some(text)),
    _ => Ok(None),
  }
}

/// ---------------------------------------------------------------------------
/// Clamping
/// ---------------------------------------------------------------------------

pub fn clamp_reps(reps: f64) -> u32 {
  reps.round().clamp(MIN_REPS as f64, MAX_REPS as f64) as u32
}

pub fn clamp_weight(weight: f64) -> f64 {
  weight.max(0.0)
}

pub fn clamp_rest(rest_seconds: Option<f64>) -> u32 {
  match rest_seconds {
    Some(rest) => rest.round().clamp(MIN_REST_SECONDS as f64, MAX_REST_SECONDS as f64) as u32,
    None => DEFAULT_REST_SECONDS,
  }
}

fn to_planned_set(set: &AiSet, set_type: SetType, rest_seconds: u32) -> Option<PlannedSet> {
  let reps = set.reps?;
  Some(PlannedSet {
    set_type,
    weight: clamp_weight(set.weight.unwrap_or(0.0)),
    reps: clamp_reps(reps),
    rest_seconds,
  })
}

fn non_blank(text: Option<&str>) -> Option<String> {
  text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

/// ---------------------------------------------------------------------------
/// Parsing + Validation
/// ---------------------------------------------------------------------------

/// Decode raw model text (bare JSON or fenced) and validate it.
pub fn parse_plan(raw: &str, roster: &[ExerciseForPlan]) -> Result<GeneratedPlan, PlanError> {
  let json = extract_json(raw).map_err(|e| PlanError::Decode(e.to_string()))?;
  let response: AiPlanResponse =
    serde_json::from_str(&json).map_err(|e| PlanError::Decode(e.to_string()))?;
  validate_plan(response, roster)
}

/// Decode an already-parsed JSON value and validate it.
pub fn parse_plan_value(
  value: Value,
  roster: &[ExerciseForPlan],
) -> Result<GeneratedPlan, PlanError> {
  let response: AiPlanResponse =
    serde_json::from_value(value).map_err(|e| PlanError::Decode(e.to_string()))?;
  validate_plan(response, roster)
}

/// Match payload entries against the roster and clamp them.
///
/// Output follows roster order. Unknown stable IDs are dropped, as are
/// exercises left with no valid sets. If the same ID appears more than once
/// the first entry with at least one valid set wins.
pub fn validate_plan(
  response: AiPlanResponse,
  roster: &[ExerciseForPlan],
) -> Result<GeneratedPlan, PlanError> {
  if response.exercise_plans.is_empty() {
    return Err(PlanError::EmptyPlan);
  }

  for entry in &response.exercise_plans {
    let id = entry.exercise_id.trim();
    if !roster.iter().any(|e| e.stable_id == id) {
      warn!(exercise_id = id, "dropping AI plan entry for unknown exercise");
    }
  }

  let exercises: Vec<ExercisePlan> = roster
    .iter()
    .filter_map(|exercise| {
      response
        .exercise_plans
        .iter()
        .filter(|p| p.exercise_id.trim() == exercise.stable_id)
        .find_map(|entry| build_exercise_plan(exercise, entry))
    })
    .collect();

  if exercises.is_empty() {
    return Err(PlanError::NoMatchingExercises);
  }

  let summary = response.session_summary.map(|s| SessionSummary {
    estimated_duration_minutes: s
      .estimated_duration_minutes
      .filter(|m| *m > 0.0)
      .map(|m| m.round() as u32),
    focus: non_blank(s.focus.as_deref()),
    notes: non_blank(s.notes.as_deref()),
  });

  debug!(exercises = exercises.len(), "validated AI plan");

  Ok(GeneratedPlan { exercises, summary })
}

fn build_exercise_plan(exercise: &ExerciseForPlan, entry: &AiExercisePlan) -> Option<ExercisePlan> {
  let rest_seconds = clamp_rest(entry.rest_seconds);
  let warmup_rest = rest_seconds.min(WARMUP_REST_SECONDS);

  let warmups = entry
    .warmup_sets
    .iter()
    .filter_map(|s| to_planned_set(s, SetType::Warmup, warmup_rest));
  let working = entry
    .working_sets
    .iter()
    .filter_map(|s| to_planned_set(s, SetType::Working, rest_seconds));
  let sets: Vec<PlannedSet> = warmups.chain(working).collect();

  let dropped = entry.warmup_sets.len() + entry.working_sets.len() - sets.len();
  if dropped > 0 {
    warn!(exercise = %exercise.stable_id, dropped, "dropped AI sets without reps");
  }

  if sets.is_empty() {
    warn!(exercise = %exercise.stable_id, "AI plan entry has no valid sets");
    return None;
  }

  Some(ExercisePlan {
    exercise_id: exercise.exercise_id,
    stable_id: exercise.stable_id.clone(),
    name: exercise.name.clone(),
    sets,
    rest_seconds,
    notes: non_blank(entry.notes.as_deref()),
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
