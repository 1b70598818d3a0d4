//! End-of-workout summary: volume, duration and PRs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records;
use crate::volume::{self, SetsByExercise};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
  pub exercise_id: i64,
  pub working_sets: usize,
  pub tonnage_kg: f64,
  pub best_estimate_kg: Option<f64>,
  pub personal_record_set_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
  pub session_id: i64,
  pub duration_seconds: i64,
  pub total_working_sets: usize,
  pub total_tonnage_kg: f64,
  pub exercises: Vec<ExerciseSummary>,
}

impl WorkoutSummary {
  /// `previous_bests` maps exercise id to its best e1RM before this session
  pub fn compute(
    session_id: i64,
    sets_by_exercise: &SetsByExercise,
    previous_bests: &BTreeMap<i64, f64>,
    duration_seconds: i64,
  ) -> Self {
    let exercises = sets_by_exercise
      .iter()
      .map(|(exercise_id, sets)| ExerciseSummary {
        exercise_id: *exercise_id,
        working_sets: volume::working_sets_for_exercise(sets),
        tonnage_kg: volume::tonnage(sets),
        best_estimate_kg: records::best_estimate(sets).map(|e| e.estimated_kg),
        personal_record_set_ids: records::detect_personal_records(
          sets,
          previous_bests.get(exercise_id).copied(),
        ),
      })
      .collect();

    Self {
      session_id,
      duration_seconds,
      total_working_sets: volume::working_sets_for_session(sets_by_exercise),
      total_tonnage_kg: volume::session_tonnage(sets_by_exercise),
      exercises,
    }
  }

  pub fn personal_record_count(&self) -> usize {
    self
      .exercises
      .iter()
      .map(|e| e.personal_record_set_ids.len())
      .sum()
  }
}
