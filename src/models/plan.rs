use serde::{Deserialize, Serialize};

use super::workout::SetType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSet {
  pub set_type: SetType,
  pub weight: f64,
  pub reps: u32,
  pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
  pub exercise_id: i64,
  pub stable_id: String,
  pub name: String,
  pub sets: Vec<PlannedSet>,
  pub rest_seconds: u32,
  pub notes: Option<String>,
}

impl ExercisePlan {
  pub fn working_sets(&self) -> impl Iterator<Item = &PlannedSet> {
    self.sets.iter().filter(|s| s.set_type == SetType::Working)
  }
}

/// Session-level notes returned alongside an AI plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSummary {
  pub estimated_duration_minutes: Option<u32>,
  pub focus: Option<String>,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneratedPlan {
  pub exercises: Vec<ExercisePlan>,
  pub summary: Option<SessionSummary>,
}

impl GeneratedPlan {
  pub fn exercise(&self, stable_id: &str) -> Option<&ExercisePlan> {
    self.exercises.iter().find(|e| e.stable_id == stable_id)
  }
}
