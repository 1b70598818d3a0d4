//! Workout lifecycle state machine
//!
//! Idle -> Setup -> GeneratingPlan -> Active <-> Paused -> Completed
//!
//! The machine is a pure function. Callers own the current phase and feed
//! it back in with each event; nothing is stored here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
/// Phase: Where the in-memory session currently is
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkoutPhase {
    #[default]
    Idle,
    Setup {
        exercise_ids: Vec<i64>,
    },
    GeneratingPlan,
    Active {
        started_at_millis: i64,
        accumulated_pause_seconds: i64,
    },
    Paused {
        paused_at_millis: i64,
        started_at_millis: i64,
        accumulated_pause_seconds: i64,
    },
    Completed {
        session_id: i64,
    },
}

impl WorkoutPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkoutPhase::Completed { .. })
    }

    /// Active or paused: a workout is underway
    pub fn is_in_progress(&self) -> bool {
        matches!(self, WorkoutPhase::Active { .. } | WorkoutPhase::Paused { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkoutPhase::Idle => "idle",
            WorkoutPhase::Setup { .. } => "setup",
            WorkoutPhase::GeneratingPlan => "generating_plan",
            WorkoutPhase::Active { .. } => "active",
            WorkoutPhase::Paused { .. } => "paused",
            WorkoutPhase::Completed { .. } => "completed",
        }
    }
}

// ---------------------------------------------------------------------------
/// Event: The only inputs the machine accepts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkoutEvent {
    SelectExercises { exercise_ids: Vec<i64> },
    RequestPlanGeneration,
    StartWithoutPlan { at_millis: i64 },
    PlanReceived { at_millis: i64 },
    PlanFailed { at_millis: i64 },
    PauseWorkout { at_millis: i64 },
    ResumeWorkout { at_millis: i64 },
    FinishWorkout { session_id: i64 },
    DiscardWorkout,
}

impl WorkoutEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkoutEvent::SelectExercises { .. } => "select_exercises",
            WorkoutEvent::RequestPlanGeneration => "request_plan_generation",
            WorkoutEvent::StartWithoutPlan { .. } => "start_without_plan",
            WorkoutEvent::PlanReceived { .. } => "plan_received",
            WorkoutEvent::PlanFailed { .. } => "plan_failed",
            WorkoutEvent::PauseWorkout { .. } => "pause_workout",
            WorkoutEvent::ResumeWorkout { .. } => "resume_workout",
            WorkoutEvent::FinishWorkout { .. } => "finish_workout",
            WorkoutEvent::DiscardWorkout => "discard_workout",
        }
    }
}

// ---------------------------------------------------------------------------
/// Transition: Accepted with the next phase, or rejected
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Accepted(WorkoutPhase),
    Rejected,
}

impl Transition {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Transition::Accepted(_))
    }

    pub fn into_phase(self) -> Option<WorkoutPhase> {
        match self {
            Transition::Accepted(phase) => Some(phase),
            Transition::Rejected => None,
        }
    }
}

fn active(started_at_millis: i64, accumulated_pause_seconds: i64) -> WorkoutPhase {
    WorkoutPhase::Active {
        started_at_millis,
        accumulated_pause_seconds,
    }
}

/// Apply one event to one phase.
///
/// Any pair not in the lifecycle table is `Rejected`; callers ignore the
/// event and keep their current phase.
pub fn transition(phase: &WorkoutPhase, event: &WorkoutEvent) -> Transition {
    use WorkoutEvent as E;
    use WorkoutPhase as P;

    let next = match (phase, event) {
        (P::Idle, E::SelectExercises { exercise_ids }) => P::Setup {
            exercise_ids: exercise_ids.clone(),
        },

        (P::Setup { .. }, E::RequestPlanGeneration) => P::GeneratingPlan,
        (P::Setup { .. }, E::StartWithoutPlan { at_millis }) => active(*at_millis, 0),

        (P::GeneratingPlan, E::PlanReceived { at_millis })
        | (P::GeneratingPlan, E::PlanFailed { at_millis }) => active(*at_millis, 0),

        (
            P::Active {
                started_at_millis,
                accumulated_pause_seconds,
            },
            E::PauseWorkout { at_millis },
        ) => P::Paused {
            paused_at_millis: *at_millis,
            started_at_millis: *started_at_millis,
            accumulated_pause_seconds: *accumulated_pause_seconds,
        },
        (P::Active { .. }, E::FinishWorkout { session_id }) => P::Completed {
            session_id: *session_id,
        },
        (P::Active { .. }, E::DiscardWorkout) => P::Idle,

        (
            P::Paused {
                paused_at_millis,
                started_at_millis,
                accumulated_pause_seconds,
            },
            E::ResumeWorkout { at_millis },
        ) => {
            // Whole seconds only, truncated
            let paused_for = (at_millis - paused_at_millis) / 1000;
            active(*started_at_millis, accumulated_pause_seconds + paused_for)
        }
        (P::Paused { .. }, E::DiscardWorkout) => P::Idle,

        _ => return Transition::Rejected,
    };

    Transition::Accepted(next)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
