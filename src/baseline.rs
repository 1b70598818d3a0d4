//! Deterministic baseline plan
//!
//! What the lifter gets when no AI plan is available or the AI plan was
//! unusable. Also the reference point the AI prompt is built around.

use serde::{Deserialize, Serialize};

use crate::models::{
  Difficulty, Equipment, ExerciseForPlan, ExercisePlan, GeneratedPlan, HistoricalSession,
  MovementType, PlannedSet, SetType,
};
use crate::progression::{self, ProgressionResult};
use crate::weight_step;

const COMPOUND_REST_SECONDS: u32 = 150;
const ISOLATION_REST_SECONDS: u32 = 90;
const WARMUP_REST_SECONDS: u32 = 60;

/// (fraction of working weight, reps)
const WARMUP_RAMP: [(f64, u32); 2] = [(0.5, 8), (0.75, 5)];

/// ---------------------------------------------------------------------------
/// Per-Exercise Defaults
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
  pub min: u32,
  pub max: u32,
}

impl RepRange {
  pub fn for_movement(movement_type: MovementType) -> Self {
    match movement_type {
      MovementType::Compound => Self { min: 6, max: 10 },
      MovementType::Isolation => Self { min: 10, max: 15 },
    }
  }
}

/// Starting load when there is no history: the empty implement or a light pair
pub fn fallback_weight_kg(equipment: Equipment) -> f64 {
  match equipment {
    Equipment::Barbell => 20.0,
    Equipment::Dumbbell => 10.0,
    Equipment::EzBar => 15.0,
    Equipment::TrapBar => 30.0,
    Equipment::Cable => 15.0,
    Equipment::Machine => 20.0,
    Equipment::Kettlebell => 12.0,
    Equipment::Bodyweight | Equipment::Band => 0.0,
  }
}

pub fn working_set_count(difficulty: Difficulty) -> usize {
  match difficulty {
    Difficulty::Advanced => 4,
    Difficulty::Beginner | Difficulty::Intermediate => 3,
  }
}

pub fn rest_seconds(movement_type: MovementType) -> u32 {
  match movement_type {
    MovementType::Compound => COMPOUND_REST_SECONDS,
    MovementType::Isolation => ISOLATION_REST_SECONDS,
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Baseline
/// ---------------------------------------------------------------------------

/// The progression decision for one exercise plus the context behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseBaseline {
  pub exercise: ExerciseForPlan,
  pub rep_range: RepRange,
  pub progression: ProgressionResult,
  pub sessions_considered: usize,
  pub last_top_weight: Option<f64>,
}

impl ExerciseBaseline {
  /// `history` is most-recent-first
  pub fn compute(exercise: &ExerciseForPlan, history: &[HistoricalSession]) -> Self {
    let rep_range = RepRange::for_movement(exercise.movement_type);
    let progression = progression::compute(
      history,
      rep_range.min,
      rep_range.max,
      exercise.is_compound(),
      exercise.is_lower_body(),
      fallback_weight_kg(exercise.equipment),
    );

    Self {
      exercise: exercise.clone(),
      rep_range,
      progression,
      sessions_considered: history.len(),
      last_top_weight: history.first().and_then(|s| s.top_working_weight()),
    }
  }

  fn warmup_sets(&self) -> Vec<PlannedSet> {
    let equipment = self.exercise.equipment;
    let working_weight = self.progression.weight_kg;
    if !self.exercise.is_compound() || weight_step::increment_kg(equipment) == 0.0 {
      return Vec::new();
    }

    WARMUP_RAMP
      .iter()
      .map(|(fraction, reps)| (weight_step::round_down(working_weight * fraction, equipment), *reps))
      .filter(|(weight, _)| *weight > 0.0 && *weight < working_weight)
      .map(|(weight, reps)| PlannedSet {
        set_type: SetType::Warmup,
        weight,
        reps,
        rest_seconds: WARMUP_REST_SECONDS,
      })
      .collect()
  }

  pub fn to_exercise_plan(&self) -> ExercisePlan {
    let rest = rest_seconds(self.exercise.movement_type);
    let working = (0..working_set_count(self.exercise.difficulty)).map(|_| PlannedSet {
      set_type: SetType::Working,
      weight: self.progression.weight_kg,
      reps: self.progression.target_reps,
      rest_seconds: rest,
    });

    let mut sets = self.warmup_sets();
    sets.extend(working);

    ExercisePlan {
      exercise_id: self.exercise.exercise_id,
      stable_id: self.exercise.stable_id.clone(),
      name: self.exercise.name.clone(),
      sets,
      rest_seconds: rest,
      notes: self.progression.stall_note.clone(),
    }
  }
}

/// Plan every baseline in roster order
pub fn generate_plan(baselines: &[ExerciseBaseline]) -> GeneratedPlan {
  GeneratedPlan {
    exercises: baselines.iter().map(|b| b.to_exercise_plan()).collect(),
    summary: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{bench_press, curl, push_up, squat, working_session};

  #[test]
  fn test_cold_start_uses_equipment_fallback() {
    let baseline = ExerciseBaseline::compute(&squat(), &[]);
    assert_eq!(baseline.progression.weight_kg, 20.0);
    assert_eq!(baseline.progression.target_reps, 6);
    assert_eq!(baseline.sessions_considered, 0);
    assert_eq!(baseline.last_top_weight, None);
  }

  #[test]
  fn test_plan_has_warmups_then_working_sets() {
    let history = vec![working_session(0, &[(100.0, 10), (100.0, 10), (100.0, 10)])];
    let plan = ExerciseBaseline::compute(&squat(), &history).to_exercise_plan();

    // Lower-body compound at top of range: +2.5
    let working: Vec<_> = plan.working_sets().collect();
    assert_eq!(working.len(), 3);
    assert!(working.iter().all(|s| s.weight == 102.5 && s.reps == 6));

    let warmups: Vec<_> = plan.sets.iter().filter(|s| s.set_type == SetType::Warmup).collect();
    assert_eq!(warmups.len(), 2);
    assert_eq!(warmups[0].weight, 50.0);
    assert_eq!(warmups[0].reps, 8);
    assert_eq!(warmups[1].weight, 75.0);
    assert_eq!(warmups[1].reps, 5);
    assert_eq!(plan.sets[0].set_type, SetType::Warmup);
    assert_eq!(plan.rest_seconds, 150);
  }

  #[test]
  fn test_isolation_and_bodyweight_skip_warmups() {
    let plan = ExerciseBaseline::compute(&curl(), &[working_session(0, &[(25.0, 12)])]).to_exercise_plan();
    assert!(plan.sets.iter().all(|s| s.set_type == SetType::Working));
    assert_eq!(plan.rest_seconds, 90);

    let plan = ExerciseBaseline::compute(&push_up(), &[]).to_exercise_plan();
    assert!(plan.sets.iter().all(|s| s.set_type == SetType::Working));
    assert!(plan.sets.iter().all(|s| s.weight == 0.0));
  }

  #[test]
  fn test_empty_bar_has_no_useful_warmups() {
    let plan = ExerciseBaseline::compute(&bench_press(), &[]).to_exercise_plan();
    // 20kg bar: 50% -> 10, 75% -> 15 on a 2.5 grid, both lighter than 20
    let warmups: Vec<f64> = plan
      .sets
      .iter()
      .filter(|s| s.set_type == SetType::Warmup)
      .map(|s| s.weight)
      .collect();
    assert_eq!(warmups, vec![10.0, 15.0]);
  }

  #[test]
  fn test_stall_note_becomes_exercise_note() {
    let history = vec![
      working_session(0, &[(80.0, 8)]),
      working_session(3, &[(80.0, 8)]),
      working_session(6, &[(80.0, 8)]),
    ];
    let plan = ExerciseBaseline::compute(&bench_press(), &history).to_exercise_plan();
    assert!(plan.notes.unwrap().contains("deload"));
  }

  #[test]
  fn test_generate_plan_keeps_roster_order() {
    let baselines = vec![
      ExerciseBaseline::compute(&curl(), &[]),
      ExerciseBaseline::compute(&squat(), &[]),
    ];
    let plan = generate_plan(&baselines);
    let ids: Vec<&str> = plan.exercises.iter().map(|e| e.stable_id.as_str()).collect();
    assert_eq!(ids, vec!["barbell_curl", "back_squat"]);
    assert!(plan.exercises.iter().all(|e| !e.sets.is_empty()));
  }

  #[test]
  fn test_advanced_lifters_get_extra_set() {
    let mut exercise = bench_press();
    exercise.difficulty = Difficulty::Advanced;
    let plan = ExerciseBaseline::compute(&exercise, &[]).to_exercise_plan();
    assert_eq!(plan.working_sets().count(), 4);
  }
}
