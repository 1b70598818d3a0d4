//! Working-set and tonnage aggregation over logged sets

use std::collections::BTreeMap;

use crate::models::WorkoutSet;

/// Sets logged for one session, keyed by exercise id
pub type SetsByExercise = BTreeMap<i64, Vec<WorkoutSet>>;

pub fn working_sets_for_exercise(sets: &[WorkoutSet]) -> usize {
  sets.iter().filter(|s| s.is_completed_working()).count()
}

pub fn working_sets_for_session(sets_by_exercise: &SetsByExercise) -> usize {
  sets_by_exercise
    .values()
    .map(|sets| working_sets_for_exercise(sets))
    .sum()
}

/// Σ weight × reps over completed working sets. Missing actuals count as zero.
pub fn tonnage(sets: &[WorkoutSet]) -> f64 {
  sets
    .iter()
    .filter(|s| s.is_completed_working())
    .map(|s| s.actual_weight_kg.unwrap_or(0.0) * s.actual_reps.unwrap_or(0) as f64)
    .sum()
}

pub fn session_tonnage(sets_by_exercise: &SetsByExercise) -> f64 {
  sets_by_exercise.values().map(|sets| tonnage(sets)).sum()
}
