//! Personal-record detection from logged sets

use crate::models::WorkoutSet;
use crate::strength::{self, OneRepMaxEstimate};

/// e1RM for a logged set, if it was a completed working set we trust enough
fn usable_estimate(set: &WorkoutSet) -> Option<OneRepMaxEstimate> {
  if !set.is_completed_working() {
    return None;
  }
  let estimate = strength::calculate_with_confidence(set.actual_weight_kg?, set.actual_reps?)?;
  estimate.usable_for_pr.then_some(estimate)
}

/// Best PR-grade estimate among the sets
pub fn best_estimate(sets: &[WorkoutSet]) -> Option<OneRepMaxEstimate> {
  sets
    .iter()
    .filter_map(usable_estimate)
    .max_by(|a, b| a.estimated_kg.total_cmp(&b.estimated_kg))
}

/// Ids of sets that beat the running best, in logging order.
///
/// Each PR raises the bar for the sets after it, so two sets only both count
/// if the second beats the first.
pub fn detect_personal_records(sets: &[WorkoutSet], previous_best_kg: Option<f64>) -> Vec<i64> {
  let mut best = previous_best_kg.unwrap_or(0.0);
  let mut records = Vec::new();

  for set in sets {
    if let Some(estimate) = usable_estimate(set) {
      if estimate.estimated_kg > best {
        best = estimate.estimated_kg;
        records.push(set.id);
      }
    }
  }

  records
}

/// Flag PR sets in place, returns how many were flagged
pub fn mark_personal_records(sets: &mut [WorkoutSet], previous_best_kg: Option<f64>) -> usize {
  let records = detect_personal_records(sets, previous_best_kg);
  for set in sets.iter_mut() {
    set.is_personal_record = records.contains(&set.id);
  }
  records.len()
}
