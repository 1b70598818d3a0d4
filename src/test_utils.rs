//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown and seeding
//! - Exercise roster fixtures
//! - History and logged-set factories

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::config::GeminiConfig;
use crate::models::{
  Difficulty, Equipment, ExerciseForPlan, HistoricalSession, HistoricalSet, MovementType,
  MuscleGroup, SetStatus, SetType, WorkoutSet,
};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Insert a roster fixture into the exercise library, returns its row id
pub async fn seed_exercise(pool: &SqlitePool, exercise: &ExerciseForPlan) -> i64 {
  sqlx::query(
    r#"
    INSERT INTO exercises (stable_id, name, equipment, movement_type, difficulty, primary_group)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(&exercise.stable_id)
  .bind(&exercise.name)
  .bind(exercise.equipment.to_string())
  .bind(exercise.movement_type.to_string())
  .bind(exercise.difficulty.to_string())
  .bind(exercise.primary_group.to_string())
  .execute(pool)
  .await
  .expect("Failed to insert test exercise")
  .last_insert_rowid()
}

/// Insert a session started N days ago with the given status
pub async fn seed_session(pool: &SqlitePool, days_ago: i64, status: &str) -> i64 {
  let started_at = datetime_days_ago(days_ago);
  let completed_at = (status == "completed").then(|| started_at + Duration::minutes(60));

  sqlx::query(
    r#"
    INSERT INTO workout_sessions (started_at, completed_at, status)
    VALUES (?1, ?2, ?3)
    "#,
  )
  .bind(started_at)
  .bind(completed_at)
  .bind(status)
  .execute(pool)
  .await
  .expect("Failed to insert test session")
  .last_insert_rowid()
}

/// Shape of a seeded set row
pub struct LoggedSet {
  pub set_number: i64,
  pub set_type: SetType,
  pub status: SetStatus,
  pub weight: f64,
  pub reps: u32,
}

impl LoggedSet {
  pub fn working(set_number: i64, weight: f64, reps: u32) -> Self {
    Self {
      set_number,
      set_type: SetType::Working,
      status: SetStatus::Completed,
      weight,
      reps,
    }
  }

  pub fn warmup(set_number: i64, weight: f64, reps: u32) -> Self {
    Self {
      set_type: SetType::Warmup,
      ..Self::working(set_number, weight, reps)
    }
  }

  /// Prescribed but never logged
  pub fn planned(set_number: i64, weight: f64, reps: u32) -> Self {
    Self {
      status: SetStatus::Planned,
      ..Self::working(set_number, weight, reps)
    }
  }
}

/// Insert one set, returns its row id
pub async fn seed_set(pool: &SqlitePool, session_id: i64, exercise_id: i64, set: LoggedSet) -> i64 {
  let logged = set.status == SetStatus::Completed;

  sqlx::query(
    r#"
    INSERT INTO workout_sets (
      session_id, exercise_id, set_number, set_type, status,
      planned_weight_kg, planned_reps, actual_weight_kg, actual_reps, completed_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
  )
  .bind(session_id)
  .bind(exercise_id)
  .bind(set.set_number)
  .bind(set.set_type.to_string())
  .bind(set.status.to_string())
  .bind(set.weight)
  .bind(set.reps as i64)
  .bind(logged.then_some(set.weight))
  .bind(logged.then_some(set.reps as i64))
  .bind(logged.then(Utc::now))
  .execute(pool)
  .await
  .expect("Failed to insert test set")
  .last_insert_rowid()
}

/// ---------------------------------------------------------------------------
/// Roster Fixtures
/// ---------------------------------------------------------------------------

fn roster_entry(
  exercise_id: i64,
  stable_id: &str,
  name: &str,
  equipment: Equipment,
  movement_type: MovementType,
  primary_group: MuscleGroup,
) -> ExerciseForPlan {
  ExerciseForPlan {
    exercise_id,
    stable_id: stable_id.to_string(),
    name: name.to_string(),
    equipment,
    movement_type,
    difficulty: Difficulty::Intermediate,
    primary_group,
  }
}

pub fn bench_press() -> ExerciseForPlan {
  roster_entry(
    1,
    "bench_press",
    "Bench Press",
    Equipment::Barbell,
    MovementType::Compound,
    MuscleGroup::Chest,
  )
}

pub fn squat() -> ExerciseForPlan {
  roster_entry(
    2,
    "back_squat",
    "Back Squat",
    Equipment::Barbell,
    MovementType::Compound,
    MuscleGroup::Legs,
  )
}

pub fn curl() -> ExerciseForPlan {
  roster_entry(
    3,
    "barbell_curl",
    "Barbell Curl",
    Equipment::Barbell,
    MovementType::Isolation,
    MuscleGroup::Arms,
  )
}

pub fn push_up() -> ExerciseForPlan {
  roster_entry(
    4,
    "push_up",
    "Push-Up",
    Equipment::Bodyweight,
    MovementType::Compound,
    MuscleGroup::Chest,
  )
}

/// Gemini settings pointed at a mock server
pub fn gemini_config(base_url: &str) -> GeminiConfig {
  GeminiConfig {
    model: "gemini-test".to_string(),
    base_url: base_url.to_string(),
    ..GeminiConfig::new("test-key")
  }
}

/// ---------------------------------------------------------------------------
/// History Factories
/// ---------------------------------------------------------------------------

fn sets_of(set_type: SetType, sets: &[(f64, u32)]) -> impl Iterator<Item = HistoricalSet> + '_ {
  sets.iter().map(move |&(weight, reps)| HistoricalSet {
    weight,
    reps,
    set_type,
  })
}

/// A past session made of working sets only, given as (weight, reps)
pub fn working_session(days_ago: i64, working: &[(f64, u32)]) -> HistoricalSession {
  session_with_warmup(days_ago, &[], working)
}

/// A past session with warmups logged ahead of the working sets
pub fn session_with_warmup(
  days_ago: i64,
  warmups: &[(f64, u32)],
  working: &[(f64, u32)],
) -> HistoricalSession {
  HistoricalSession {
    date: datetime_days_ago(days_ago),
    sets: sets_of(SetType::Warmup, warmups)
      .chain(sets_of(SetType::Working, working))
      .collect(),
  }
}

/// A set as the session repository would hand it back
pub fn logged_set(
  id: i64,
  set_type: SetType,
  status: SetStatus,
  weight: Option<f64>,
  reps: Option<u32>,
) -> WorkoutSet {
  WorkoutSet {
    id,
    set_number: id,
    set_type,
    status,
    planned_weight_kg: weight,
    planned_reps: reps,
    actual_weight_kg: weight,
    actual_reps: reps,
    completed_at: (status == SetStatus::Completed).then(Utc::now),
    is_personal_record: false,
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('exercises', 'workout_sessions', 'workout_sets')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 3);
    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_set_links_to_session() {
    let pool = setup_test_db().await;
    let exercise_id = seed_exercise(&pool, &squat()).await;
    let session_id = seed_session(&pool, 2, "completed").await;
    seed_set(&pool, session_id, exercise_id, LoggedSet::working(1, 100.0, 5)).await;
    seed_set(&pool, session_id, exercise_id, LoggedSet::planned(2, 100.0, 5)).await;

    let logged: (i64,) = sqlx::query_as(
      "SELECT COUNT(*) FROM workout_sets WHERE session_id = ?1 AND actual_reps IS NOT NULL",
    )
    .bind(session_id)
    .fetch_one(&pool)
    .await
    .expect("Failed to count sets");

    assert_eq!(logged.0, 1);
    teardown_test_db(pool).await;
  }

  #[test]
  fn test_fixture_ids_are_distinct() {
    let ids = [bench_press(), squat(), curl(), push_up()].map(|e| e.exercise_id);
    for (i, id) in ids.iter().enumerate() {
      assert!(!ids[i + 1..].contains(id));
    }
  }

  #[test]
  fn test_session_with_warmup_orders_sets() {
    let session = session_with_warmup(1, &[(40.0, 8)], &[(80.0, 5), (80.0, 5)]);
    assert_eq!(session.sets[0].set_type, SetType::Warmup);
    assert_eq!(session.working_sets().count(), 2);
  }

  #[test]
  fn test_approx_macro() {
    assert_approx_eq!(1.0_f64, 1.0005_f64, 0.001);
  }
}
