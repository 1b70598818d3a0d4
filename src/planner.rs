//! Session planning: history in, plan out
//!
//! Loads recent history for each roster exercise, computes the deterministic
//! baseline, and asks the AI provider (if one is configured) to improve on
//! it. Anything the provider gets wrong lands the lifter on the baseline.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::baseline::{self, ExerciseBaseline};
use crate::config::CoachConfig;
use crate::db::DbPool;
use crate::history::{HistoryError, HistorySource, SqliteHistory};
use crate::llm::{GeminiClient, PlanProvider};
use crate::models::{ExerciseForPlan, GeneratedPlan};
use crate::plan_parser;

/// ---------------------------------------------------------------------------
/// Outcome
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
  Ai,
  /// `reason` is None when no provider is configured
  Baseline { reason: Option<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
  pub plan: GeneratedPlan,
  pub source: PlanSource,
}

impl PlanOutcome {
  pub fn is_ai(&self) -> bool {
    self.source == PlanSource::Ai
  }
}

/// ---------------------------------------------------------------------------
/// Planner
/// ---------------------------------------------------------------------------

pub struct Planner {
  history: Arc<dyn HistorySource>,
  provider: Option<Arc<dyn PlanProvider>>,
  history_sessions: usize,
}

impl Planner {
  pub fn new(history: Arc<dyn HistorySource>, history_sessions: usize) -> Self {
    Self {
      history,
      provider: None,
      history_sessions: history_sessions.max(1),
    }
  }

  pub fn with_provider(mut self, provider: Arc<dyn PlanProvider>) -> Self {
    self.provider = Some(provider);
    self
  }

  /// SQLite history plus Gemini when an API key is configured
  pub fn from_config(config: &CoachConfig, pool: DbPool) -> Self {
    let planner = Self::new(Arc::new(SqliteHistory::new(pool)), config.history_sessions);

    match config.gemini.clone().map(GeminiClient::new) {
      Some(Ok(client)) => planner.with_provider(Arc::new(client)),
      Some(Err(e)) => {
        warn!(error = %e, "AI client unavailable, planning on baseline only");
        planner
      }
      None => planner,
    }
  }

  /// Baseline per roster exercise, in roster order
  pub async fn baselines(
    &self,
    exercises: &[ExerciseForPlan],
  ) -> Result<Vec<ExerciseBaseline>, HistoryError> {
    let mut baselines = Vec::with_capacity(exercises.len());
    for exercise in exercises {
      let history = self
        .history
        .recent_sessions(exercise.exercise_id, self.history_sessions)
        .await?;
      baselines.push(ExerciseBaseline::compute(exercise, &history));
    }
    Ok(baselines)
  }

  /// Plan the session. Only a history failure is an error; provider and
  /// payload problems fall back to the baseline.
  pub async fn generate(&self, exercises: &[ExerciseForPlan]) -> Result<PlanOutcome, HistoryError> {
    let baselines = self.baselines(exercises).await?;

    let Some(provider) = &self.provider else {
      return Ok(PlanOutcome {
        plan: baseline::generate_plan(&baselines),
        source: PlanSource::Baseline { reason: None },
      });
    };

    let attempt = match provider.request_plan(&baselines).await {
      Ok(raw) => plan_parser::parse_plan(&raw, exercises).map_err(|e| e.to_string()),
      Err(e) => Err(e.to_string()),
    };

    match attempt {
      Ok(plan) => {
        info!(provider = provider.name(), exercises = plan.exercises.len(), "using AI plan");
        Ok(PlanOutcome {
          plan: fill_from_baseline(plan, &baselines),
          source: PlanSource::Ai,
        })
      }
      Err(reason) => {
        warn!(provider = provider.name(), %reason, "AI plan unavailable, using baseline");
        Ok(PlanOutcome {
          plan: baseline::generate_plan(&baselines),
          source: PlanSource::Baseline {
            reason: Some(reason),
          },
        })
      }
    }
  }
}

/// Roster exercises the AI left out get their baseline entry
fn fill_from_baseline(ai_plan: GeneratedPlan, baselines: &[ExerciseBaseline]) -> GeneratedPlan {
  let exercises = baselines
    .iter()
    .map(|b| {
      ai_plan
        .exercise(&b.exercise.stable_id)
        .cloned()
        .unwrap_or_else(|| {
          info!(exercise = %b.exercise.stable_id, "AI plan omitted exercise, using baseline");
          b.to_exercise_plan()
        })
    })
    .collect();

  GeneratedPlan {
    exercises,
    summary: ai_plan.summary,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  use async_trait::async_trait;

  use crate::llm::LlmError;
  use crate::models::{HistoricalSession, SetType};
  use crate::test_utils::{
    bench_press, seed_exercise, seed_session, seed_set, setup_test_db, squat, teardown_test_db,
    working_session, LoggedSet,
  };

  struct StubHistory(HashMap<i64, Vec<HistoricalSession>>);

  #[async_trait]
  impl HistorySource for StubHistory {
    async fn recent_sessions(
      &self,
      exercise_id: i64,
      limit: usize,
    ) -> Result<Vec<HistoricalSession>, HistoryError> {
      let sessions = self.0.get(&exercise_id).cloned().unwrap_or_default();
      Ok(sessions.into_iter().take(limit).collect())
    }
  }

  enum StubProvider {
    Reply(String),
    Fail,
  }

  #[async_trait]
  impl PlanProvider for StubProvider {
    fn name(&self) -> &'static str {
      "stub"
    }

    async fn request_plan(&self, _baselines: &[ExerciseBaseline]) -> Result<String, LlmError> {
      match self {
        StubProvider::Reply(text) => Ok(text.clone()),
        StubProvider::Fail => Err(LlmError::Api("quota exceeded".to_string())),
      }
    }
  }

  fn history() -> Arc<dyn HistorySource> {
    let mut sessions = HashMap::new();
    sessions.insert(bench_press().exercise_id, vec![working_session(2, &[(80.0, 10), (80.0, 10)])]);
    Arc::new(StubHistory(sessions))
  }

  fn planner_replying(reply: StubProvider) -> Planner {
    Planner::new(history(), 3).with_provider(Arc::new(reply))
  }

  #[tokio::test]
  async fn test_no_provider_uses_baseline() {
    let planner = Planner::new(history(), 3);
    let outcome = planner.generate(&[bench_press()]).await.unwrap();

    assert_eq!(outcome.source, PlanSource::Baseline { reason: None });
    let bench = &outcome.plan.exercises[0];
    assert!(bench.working_sets().all(|s| s.weight == 81.25 && s.reps == 6));
  }

  #[tokio::test]
  async fn test_valid_ai_plan_is_used() {
    let reply = r#"```json
{"exercise_plans": [
  {"exercise_id": "bench_press", "working_sets": [{"weight": 82.5, "reps": 6}, {"weight": 82.5, "reps": 6}], "rest_seconds": 150}
], "session_summary": {"focus": "Upper strength"}}
```"#;
    let planner = planner_replying(StubProvider::Reply(reply.to_string()));
    let outcome = planner.generate(&[bench_press()]).await.unwrap();

    assert!(outcome.is_ai());
    assert_eq!(outcome.plan.exercises[0].working_sets().count(), 2);
    assert_eq!(outcome.plan.exercises[0].rest_seconds, 150);
    assert_eq!(
      outcome.plan.summary.and_then(|s| s.focus).as_deref(),
      Some("Upper strength")
    );
  }

  #[tokio::test]
  async fn test_garbage_reply_falls_back() {
    let planner = planner_replying(StubProvider::Reply("I can't help with that".to_string()));
    let outcome = planner.generate(&[bench_press(), squat()]).await.unwrap();

    match outcome.source {
      PlanSource::Baseline { reason: Some(reason) } => assert!(reason.contains("AI plan unusable")),
      other => panic!("expected baseline fallback, got {:?}", other),
    }
    assert_eq!(outcome.plan.exercises.len(), 2);
  }

  #[tokio::test]
  async fn test_hallucinated_ids_only_falls_back() {
    let reply = r#"{"exercise_plans": [{"exercise_id": "cable_fly", "working_sets": [{"weight": 20, "reps": 12}]}]}"#;
    let planner = planner_replying(StubProvider::Reply(reply.to_string()));
    let outcome = planner.generate(&[bench_press()]).await.unwrap();

    assert!(!outcome.is_ai());
  }

  #[tokio::test]
  async fn test_provider_error_falls_back() {
    let planner = planner_replying(StubProvider::Fail);
    let outcome = planner.generate(&[bench_press()]).await.unwrap();

    assert_eq!(
      outcome.source,
      PlanSource::Baseline {
        reason: Some("API error: quota exceeded".to_string())
      }
    );
  }

  #[tokio::test]
  async fn test_partial_ai_plan_filled_from_baseline() {
    let reply = r#"{"exercise_plans": [{"exercise_id": "back_squat", "working_sets": [{"weight": 100, "reps": 5}]}]}"#;
    let planner = planner_replying(StubProvider::Reply(reply.to_string()));
    let outcome = planner.generate(&[bench_press(), squat()]).await.unwrap();

    assert!(outcome.is_ai());
    let ids: Vec<&str> = outcome.plan.exercises.iter().map(|e| e.stable_id.as_str()).collect();
    assert_eq!(ids, vec!["bench_press", "back_squat"]);
    // Bench came from the baseline
    assert!(outcome.plan.exercises[0].working_sets().all(|s| s.weight == 81.25));
    assert_eq!(outcome.plan.exercises[1].working_sets().count(), 1);
  }

  #[tokio::test]
  async fn test_planner_over_sqlite_history() {
    let pool = setup_test_db().await;
    let mut exercise = squat();
    exercise.exercise_id = seed_exercise(&pool, &exercise).await;

    for days_ago in [9, 6, 3] {
      let session = seed_session(&pool, days_ago, "completed").await;
      seed_set(&pool, session, exercise.exercise_id, LoggedSet::warmup(1, 60.0, 5)).await;
      seed_set(&pool, session, exercise.exercise_id, LoggedSet::working(2, 100.0, 8)).await;
    }

    let planner = Planner::from_config(&CoachConfig::default(), pool.clone());
    let outcome = planner.generate(&[exercise]).await.unwrap();

    let plan = &outcome.plan.exercises[0];
    assert_eq!(outcome.source, PlanSource::Baseline { reason: None });
    // In range: hold weight, add a rep. Three flat sessions: stalled.
    assert!(plan.working_sets().all(|s| s.weight == 100.0 && s.reps == 9));
    assert!(plan.sets.iter().any(|s| s.set_type == SetType::Warmup));
    assert!(plan.notes.as_deref().is_some_and(|n| n.contains("deload")));

    teardown_test_db(pool).await;
  }
}
