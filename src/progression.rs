//! Progressive-Overload Engine
//!
//! Decides next-session load and rep target for one exercise from its
//! recent history. Each decision looks only at working sets:
//! - heaviest working set = the weight used
//! - worst set = did every set clear the range
//! - average reps = overall effort across sets
//!
//! Key principles:
//! - Double progression: fill the rep range, then add load and reset reps
//! - Load jumps scale with the lift (lower-body compound > compound > isolation)
//! - A collapsed set triggers a 5% back-off, mild fatigue only holds
//! - No usable history = cold start at the caller's fallback weight

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::HistoricalSession;

/// Progression loads are quantized to the smallest plate pair.
pub const WEIGHT_STEP_KG: f64 = 1.25;

/// Back-off applied when a set falls well short of the range
const DECREASE_FACTOR: f64 = 0.95;

/// How many reps below the range a set may fall before we back off
const COLLAPSE_MARGIN: i64 = 2;

const STALL_WINDOW: usize = 3;
const STALL_TOLERANCE_KG: f64 = 0.01;

// ---------------------------------------------------------------------------
/// Exercise Category: Sets load increment and cap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    /// Squats, deadlifts, hinges: large muscles tolerate bigger jumps
    LowerBodyCompound,
    /// Presses, rows, pull-ups
    Compound,
    /// Single-joint accessories
    Isolation,
}

impl ExerciseCategory {
    pub fn from_flags(is_compound: bool, is_lower_body: bool) -> Self {
        match (is_compound, is_lower_body) {
            (true, true) => Self::LowerBodyCompound,
            (true, false) => Self::Compound,
            (false, _) => Self::Isolation,
        }
    }

    pub fn increment_kg(&self) -> f64 {
        match self {
            Self::LowerBodyCompound => 2.5,
            Self::Compound | Self::Isolation => 1.25,
        }
    }

    pub fn cap_kg(&self) -> f64 {
        match self {
            Self::LowerBodyCompound => 10.0,
            Self::Compound => 5.0,
            Self::Isolation => 2.5,
        }
    }
}

// ---------------------------------------------------------------------------
/// Progression Result: What to prescribe next session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionResult {
    pub weight_kg: f64,
    pub target_reps: u32,
    pub is_stalled: bool,
    pub stall_note: Option<String>,
}

impl ProgressionResult {
    fn cold_start(fallback_weight_kg: f64, range_min: u32) -> Self {
        Self {
            weight_kg: fallback_weight_kg,
            target_reps: range_min,
            is_stalled: false,
            stall_note: None,
        }
    }
}

/// Which branch of the decision table fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionDecision {
    /// No usable history
    ColdStart,
    /// Every set hit the top of the range
    Increase,
    /// Average inside the range, chase one more rep
    Hold,
    /// A set collapsed well below the range
    Decrease,
    /// Average below range but no set collapsed
    FatigueHold,
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to the nearest 1.25 kg, halves going up.
pub fn round_to_step(weight: f64) -> f64 {
    (weight / WEIGHT_STEP_KG + 0.5).floor() * WEIGHT_STEP_KG
}

pub fn increase_weight(last_weight: f64, category: ExerciseCategory) -> f64 {
    let stepped = (last_weight + category.increment_kg()).min(last_weight + category.cap_kg());
    round_to_step(stepped)
}

/// 5% off, rounded to the grid. Up to 12.5 kg that can round back to the
/// same load; those drop one step below instead, never below zero.
pub fn decrease_weight(last_weight: f64) -> f64 {
    let backed_off = round_to_step(last_weight * DECREASE_FACTOR);
    if backed_off < last_weight {
        return backed_off;
    }
    (((last_weight / WEIGHT_STEP_KG).ceil() - 1.0) * WEIGHT_STEP_KG).max(0.0)
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Compute the next prescription for one exercise.
///
/// `last_sessions` must be ordered most-recent-first. `fallback_weight_kg`
/// is returned as-is (not rounded) when there is nothing to progress from.
pub fn compute(
    last_sessions: &[HistoricalSession],
    range_min: u32,
    range_max: u32,
    is_compound: bool,
    is_lower_body: bool,
    fallback_weight_kg: f64,
) -> ProgressionResult {
    let category = ExerciseCategory::from_flags(is_compound, is_lower_body);
    let (decision, mut result) = decide(last_sessions, range_min, range_max, category, fallback_weight_kg);

    if decision != ProgressionDecision::ColdStart {
        if let Some(note) = detect_stall(last_sessions) {
            result.is_stalled = true;
            result.stall_note = Some(note);
        }
    }

    debug!(
        ?decision,
        ?category,
        weight_kg = result.weight_kg,
        target_reps = result.target_reps,
        is_stalled = result.is_stalled,
        "progression computed"
    );

    result
}

/// Run the decision table on the most recent session only.
pub fn decide(
    last_sessions: &[HistoricalSession],
    range_min: u32,
    range_max: u32,
    category: ExerciseCategory,
    fallback_weight_kg: f64,
) -> (ProgressionDecision, ProgressionResult) {
    let Some(latest) = last_sessions.first() else {
        return (
            ProgressionDecision::ColdStart,
            ProgressionResult::cold_start(fallback_weight_kg, range_min),
        );
    };

    let reps: Vec<u32> = latest.working_sets().map(|s| s.reps).collect();
    let (Some(worst_set_reps), Some(last_weight)) =
        (reps.iter().copied().min(), latest.top_working_weight())
    else {
        return (
            ProgressionDecision::ColdStart,
            ProgressionResult::cold_start(fallback_weight_kg, range_min),
        );
    };
    let avg_reps = reps.iter().map(|&r| r as f64).sum::<f64>() / reps.len() as f64;

    let hold_reps = ((avg_reps.floor() as u32) + 1).min(range_max);

    let (decision, weight_kg, target_reps) = if worst_set_reps >= range_max {
        (
            ProgressionDecision::Increase,
            increase_weight(last_weight, category),
            range_min,
        )
    } else if avg_reps >= range_min as f64 {
        (ProgressionDecision::Hold, round_to_step(last_weight), hold_reps)
    } else if (worst_set_reps as i64) < range_min as i64 - COLLAPSE_MARGIN {
        (
            ProgressionDecision::Decrease,
            decrease_weight(last_weight),
            range_min,
        )
    } else {
        (ProgressionDecision::FatigueHold, round_to_step(last_weight), hold_reps)
    };

    (
        decision,
        ProgressionResult {
            weight_kg,
            target_reps,
            is_stalled: false,
            stall_note: None,
        },
    )
}

// ---------------------------------------------------------------------------
// Stall Detection
// ---------------------------------------------------------------------------

/// Stall = the last three sessions all topped out at the same working weight.
///
/// Every session in the window must contain a working set; a warmup-only
/// session breaks the window.
pub fn detect_stall(last_sessions: &[HistoricalSession]) -> Option<String> {
    let top_weights: Vec<f64> = last_sessions
        .iter()
        .take(STALL_WINDOW)
        .filter_map(|s| s.top_working_weight())
        .collect();

    if top_weights.len() < STALL_WINDOW {
        return None;
    }

    let max = top_weights.iter().copied().fold(f64::MIN, f64::max);
    let min = top_weights.iter().copied().fold(f64::MAX, f64::min);
    if max - min >= STALL_TOLERANCE_KG {
        return None;
    }

    Some(format!(
        "Top weight unchanged for {} sessions. Consider a deload: drop ~10% for a week, then build back up.",
        STALL_WINDOW
    ))
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
