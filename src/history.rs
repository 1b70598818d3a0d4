//! Training history backed by SQLite
//!
//! The progression engine only ever sees `HistoricalSession`s; this module
//! is the one place that knows how sessions and sets are stored.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::db::DbPool;
use crate::models::{ExerciseForPlan, HistoricalSession, HistoricalSet, SetStatus, SetType, WorkoutSet};
use crate::records;
use crate::volume::SetsByExercise;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum HistoryError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Corrupt row: {0}")]
  Corrupt(String),
}

impl Serialize for HistoryError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

fn decode<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T, HistoryError> {
  raw.parse().map_err(HistoryError::Corrupt)
}

fn decode_reps(raw: i64) -> Result<u32, HistoryError> {
  u32::try_from(raw).map_err(|_| HistoryError::Corrupt(format!("Invalid rep count: {}", raw)))
}

/// ---------------------------------------------------------------------------
/// History Source
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait HistorySource: Send + Sync {
  /// Up to `limit` most recent completed sessions containing the exercise,
  /// most-recent-first. Only sets with a logged weight > 0 and reps >= 1.
  async fn recent_sessions(
    &self,
    exercise_id: i64,
    limit: usize,
  ) -> Result<Vec<HistoricalSession>, HistoryError>;
}

#[derive(Clone)]
pub struct SqliteHistory {
  pool: DbPool,
}

type HistoryRow = (i64, DateTime<Utc>, f64, i64, String);

type SetRow = (
  i64,
  i64,
  i64,
  String,
  String,
  Option<f64>,
  Option<i64>,
  Option<f64>,
  Option<i64>,
  Option<DateTime<Utc>>,
  bool,
);

impl SqliteHistory {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &DbPool {
    &self.pool
  }

  /// Roster entries for the given ids, in the order asked for.
  ///
  /// Unknown ids are skipped.
  pub async fn load_roster(&self, exercise_ids: &[i64]) -> Result<Vec<ExerciseForPlan>, HistoryError> {
    let mut roster = Vec::with_capacity(exercise_ids.len());

    for &id in exercise_ids {
      let row: Option<(i64, String, String, String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT id, stable_id, name, equipment, movement_type, difficulty, primary_group
        FROM exercises
        WHERE id = ?1
        "#,
      )
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;

      let Some((exercise_id, stable_id, name, equipment, movement_type, difficulty, primary_group)) = row
      else {
        debug!(exercise_id = id, "roster id not in exercise library");
        continue;
      };

      roster.push(ExerciseForPlan {
        exercise_id,
        stable_id,
        name,
        equipment: decode(&equipment)?,
        movement_type: decode(&movement_type)?,
        difficulty: decode(&difficulty)?,
        primary_group: decode(&primary_group)?,
      });
    }

    Ok(roster)
  }

  /// Every logged set of a session grouped by exercise, in set order
  pub async fn sets_by_exercise(&self, session_id: i64) -> Result<SetsByExercise, HistoryError> {
    let rows: Vec<SetRow> = sqlx::query_as(
      r#"
      SELECT id, exercise_id, set_number, set_type, status,
             planned_weight_kg, planned_reps, actual_weight_kg, actual_reps,
             completed_at, is_personal_record
      FROM workout_sets
      WHERE session_id = ?1
      ORDER BY exercise_id, set_number, id
      "#,
    )
    .bind(session_id)
    .fetch_all(&self.pool)
    .await?;

    let mut grouped = SetsByExercise::new();
    for (
      id,
      exercise_id,
      set_number,
      set_type,
      status,
      planned_weight_kg,
      planned_reps,
      actual_weight_kg,
      actual_reps,
      completed_at,
      is_personal_record,
    ) in rows
    {
      let set = WorkoutSet {
        id,
        set_number,
        set_type: decode::<SetType>(&set_type)?,
        status: decode::<SetStatus>(&status)?,
        planned_weight_kg,
        planned_reps: planned_reps.map(decode_reps).transpose()?,
        actual_weight_kg,
        actual_reps: actual_reps.map(decode_reps).transpose()?,
        completed_at,
        is_personal_record,
      };
      grouped.entry(exercise_id).or_default().push(set);
    }

    Ok(grouped)
  }

  /// Best PR-grade e1RM per exercise from completed sessions started before
  /// this one. Only exercises logged in this session are included.
  pub async fn previous_bests(&self, session_id: i64) -> Result<BTreeMap<i64, f64>, HistoryError> {
    let rows: Vec<(i64, i64, f64, i64)> = sqlx::query_as(
      r#"
      SELECT ws.exercise_id, ws.id, ws.actual_weight_kg, ws.actual_reps
      FROM workout_sets ws
      JOIN workout_sessions s ON s.id = ws.session_id
      WHERE s.status = 'completed'
        AND s.started_at < (SELECT started_at FROM workout_sessions WHERE id = ?1)
        AND ws.exercise_id IN (SELECT exercise_id FROM workout_sets WHERE session_id = ?1)
        AND ws.status = 'completed'
        AND ws.set_type = 'working'
        AND ws.actual_weight_kg IS NOT NULL
        AND ws.actual_reps IS NOT NULL
      "#,
    )
    .bind(session_id)
    .fetch_all(&self.pool)
    .await?;

    let mut sets: BTreeMap<i64, Vec<WorkoutSet>> = BTreeMap::new();
    for (exercise_id, id, weight, reps) in rows {
      sets.entry(exercise_id).or_default().push(WorkoutSet {
        id,
        set_number: 0,
        set_type: SetType::Working,
        status: SetStatus::Completed,
        planned_weight_kg: None,
        planned_reps: None,
        actual_weight_kg: Some(weight),
        actual_reps: Some(decode_reps(reps)?),
        completed_at: None,
        is_personal_record: false,
      });
    }

    Ok(
      sets
        .into_iter()
        .filter_map(|(exercise_id, sets)| {
          records::best_estimate(&sets).map(|best| (exercise_id, best.estimated_kg))
        })
        .collect(),
    )
  }

  /// Persist PR flags for the given set ids
  pub async fn save_personal_records(&self, set_ids: &[i64]) -> Result<(), HistoryError> {
    for id in set_ids {
      sqlx::query("UPDATE workout_sets SET is_personal_record = 1 WHERE id = ?1")
        .bind(id)
        .execute(&self.pool)
        .await?;
    }
    Ok(())
  }
}

#[async_trait]
impl HistorySource for SqliteHistory {
  async fn recent_sessions(
    &self,
    exercise_id: i64,
    limit: usize,
  ) -> Result<Vec<HistoricalSession>, HistoryError> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
      r#"
      WITH logged AS (
        SELECT session_id, set_number, id, set_type, actual_weight_kg, actual_reps
        FROM workout_sets
        WHERE exercise_id = ?1
          AND status = 'completed'
          AND actual_weight_kg > 0
          AND actual_reps >= 1
      ),
      recent AS (
        SELECT s.id, s.started_at
        FROM workout_sessions s
        WHERE s.status = 'completed'
          AND EXISTS (SELECT 1 FROM logged l WHERE l.session_id = s.id)
        ORDER BY s.started_at DESC, s.id DESC
        LIMIT ?2
      )
      SELECT r.id, r.started_at, l.actual_weight_kg, l.actual_reps, l.set_type
      FROM recent r
      JOIN logged l ON l.session_id = r.id
      ORDER BY r.started_at DESC, r.id DESC, l.set_number, l.id
      "#,
    )
    .bind(exercise_id)
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(&self.pool)
    .await?;

    let mut sessions: Vec<HistoricalSession> = Vec::new();
    let mut current_id = None;

    for (session_id, started_at, weight, reps, set_type) in rows {
      let set = HistoricalSet {
        weight,
        reps: decode_reps(reps)?,
        set_type: decode(&set_type)?,
      };

      match sessions.last_mut() {
        Some(session) if current_id == Some(session_id) => session.sets.push(set),
        _ => {
          current_id = Some(session_id);
          sessions.push(HistoricalSession {
            date: started_at,
            sets: vec![set],
          });
        }
      }
    }

    debug!(exercise_id, sessions = sessions.len(), "loaded exercise history");
    Ok(sessions)
  }
}
