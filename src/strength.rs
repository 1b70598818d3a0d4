//! One-rep max estimation
//!
//! Epley and Brzycki both degrade as reps climb, so each only answers inside
//! its validated rep window. Outside it the answer is `None`, never a guess.

use serde::{Deserialize, Serialize};

const EPLEY_MAX_REPS: u32 = 30;
const BRZYCKI_MAX_REPS: u32 = 36;

/// Past this the set is endurance work and says little about max strength
const MAX_ESTIMABLE_REPS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
  Low,
  Moderate,
  High,
}

impl Confidence {
  pub fn from_reps(reps: u32) -> Self {
    match reps {
      0..=5 => Confidence::High,
      6..=10 => Confidence::Moderate,
      _ => Confidence::Low,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneRepMaxEstimate {
  pub estimated_kg: f64,
  pub confidence: Confidence,
  pub usable_for_pr: bool,
}

/// Epley: `w * (1 + r/30)`, exact at a single rep
pub fn epley(weight: f64, reps: u32) -> Option<f64> {
  if weight <= 0.0 || !(1..=EPLEY_MAX_REPS).contains(&reps) {
    return None;
  }
  if reps == 1 {
    return Some(weight);
  }
  Some(weight * (1.0 + reps as f64 / 30.0))
}

/// Brzycki: `w * 36 / (37 - r)`. The rep window keeps the divisor positive.
pub fn brzycki(weight: f64, reps: u32) -> Option<f64> {
  if weight <= 0.0 || !(1..=BRZYCKI_MAX_REPS).contains(&reps) {
    return None;
  }
  if reps == 1 {
    return Some(weight);
  }
  Some(weight * (36.0 / (37.0 - reps as f64)))
}

/// Epley estimate tagged with how far it can be trusted
pub fn calculate_with_confidence(weight: f64, reps: u32) -> Option<OneRepMaxEstimate> {
  if weight <= 0.0 || reps < 1 || reps > MAX_ESTIMABLE_REPS {
    return None;
  }
  let estimated_kg = epley(weight, reps)?;
  let confidence = Confidence::from_reps(reps);

  Some(OneRepMaxEstimate {
    estimated_kg,
    confidence,
    usable_for_pr: confidence != Confidence::Low,
  })
}
