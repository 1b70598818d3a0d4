//! In-memory workout session driven by the lifecycle state machine

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::models::GeneratedPlan;
use crate::summary::WorkoutSummary;
use crate::volume::SetsByExercise;
use crate::workout_state::{transition, Transition, WorkoutEvent, WorkoutPhase};

/// Owns the current phase. Invalid events are ignored, never errors.
#[derive(Debug, Clone, Default)]
pub struct WorkoutSession {
  phase: WorkoutPhase,
  plan: Option<GeneratedPlan>,
}

impl WorkoutSession {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn phase(&self) -> &WorkoutPhase {
    &self.phase
  }

  pub fn plan(&self) -> Option<&GeneratedPlan> {
    self.plan.as_ref()
  }

  /// Feed one event through the machine; returns whether it was accepted
  pub fn apply(&mut self, event: WorkoutEvent) -> bool {
    match transition(&self.phase, &event) {
      Transition::Accepted(next) => {
        debug!(from = self.phase.name(), to = next.name(), event = event.name(), "workout phase changed");
        if matches!(next, WorkoutPhase::Idle) {
          self.plan = None;
        }
        self.phase = next;
        true
      }
      Transition::Rejected => {
        debug!(phase = self.phase.name(), event = event.name(), "ignoring event");
        false
      }
    }
  }

  /// Deliver the plan outcome. A plan only sticks if the machine accepts it.
  pub fn receive_plan(&mut self, plan: Option<GeneratedPlan>, at_millis: i64) -> bool {
    let event = match plan {
      Some(_) => WorkoutEvent::PlanReceived { at_millis },
      None => WorkoutEvent::PlanFailed { at_millis },
    };
    let accepted = self.apply(event);
    if accepted {
      self.plan = plan;
    }
    accepted
  }

  /// Seconds of actual training: wall time minus pauses, frozen while paused
  pub fn active_seconds(&self, now_millis: i64) -> i64 {
    let elapsed = match &self.phase {
      WorkoutPhase::Active {
        started_at_millis,
        accumulated_pause_seconds,
      } => (now_millis - started_at_millis) / 1000 - accumulated_pause_seconds,
      WorkoutPhase::Paused {
        paused_at_millis,
        started_at_millis,
        accumulated_pause_seconds,
      } => (paused_at_millis - started_at_millis) / 1000 - accumulated_pause_seconds,
      _ => 0,
    };
    elapsed.max(0)
  }

  /// Finish the workout and summarize the logged sets.
  ///
  /// Returns None (and stays put) unless the session was active.
  pub fn finish(
    &mut self,
    session_id: i64,
    now_millis: i64,
    sets_by_exercise: &SetsByExercise,
    previous_bests: &BTreeMap<i64, f64>,
  ) -> Option<WorkoutSummary> {
    let duration_seconds = self.active_seconds(now_millis);
    if !self.apply(WorkoutEvent::FinishWorkout { session_id }) {
      return None;
    }

    let summary = WorkoutSummary::compute(session_id, sets_by_exercise, previous_bests, duration_seconds);
    info!(
      session_id,
      duration_seconds,
      working_sets = summary.total_working_sets,
      tonnage_kg = summary.total_tonnage_kg,
      personal_records = summary.personal_record_count(),
      "workout completed"
    );
    Some(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{SetStatus, SetType};
  use crate::test_utils::logged_set;

  fn started_session() -> WorkoutSession {
    let mut session = WorkoutSession::new();
    assert!(session.apply(WorkoutEvent::SelectExercises { exercise_ids: vec![1] }));
    assert!(session.apply(WorkoutEvent::StartWithoutPlan { at_millis: 0 }));
    session
  }

  #[test]
  fn test_invalid_events_are_ignored() {
    let mut session = WorkoutSession::new();
    assert!(!session.apply(WorkoutEvent::PauseWorkout { at_millis: 10 }));
    assert!(!session.apply(WorkoutEvent::FinishWorkout { session_id: 1 }));
    assert_eq!(session.phase(), &WorkoutPhase::Idle);
  }

  #[test]
  fn test_active_seconds_excludes_pauses() {
    let mut session = started_session();
    assert_eq!(session.active_seconds(30_000), 30);

    session.apply(WorkoutEvent::PauseWorkout { at_millis: 60_000 });
    assert_eq!(session.active_seconds(600_000), 60);

    session.apply(WorkoutEvent::ResumeWorkout { at_millis: 90_000 });
    assert_eq!(session.active_seconds(120_000), 90);
  }

  #[test]
  fn test_plan_received_sticks() {
    let mut session = WorkoutSession::new();
    session.apply(WorkoutEvent::SelectExercises { exercise_ids: vec![1] });

    // Not generating yet: ignored
    assert!(!session.receive_plan(Some(GeneratedPlan::default()), 5));
    assert!(session.plan().is_none());

    session.apply(WorkoutEvent::RequestPlanGeneration);
    assert!(session.receive_plan(Some(GeneratedPlan::default()), 5));
    assert!(session.plan().is_some());
    assert!(session.phase().is_in_progress());

    session.apply(WorkoutEvent::DiscardWorkout);
    assert!(session.plan().is_none());
  }

  #[test]
  fn test_plan_failure_still_starts_workout() {
    let mut session = WorkoutSession::new();
    session.apply(WorkoutEvent::SelectExercises { exercise_ids: vec![1] });
    session.apply(WorkoutEvent::RequestPlanGeneration);
    assert!(session.receive_plan(None, 1_000));
    assert_eq!(
      session.phase(),
      &WorkoutPhase::Active {
        started_at_millis: 1_000,
        accumulated_pause_seconds: 0
      }
    );
  }

  #[test]
  fn test_finish_produces_summary_once() {
    let mut session = started_session();
    let mut sets = SetsByExercise::new();
    sets.insert(
      1,
      vec![logged_set(1, SetType::Working, SetStatus::Completed, Some(60.0), Some(10))],
    );

    let summary = session.finish(42, 1_800_000, &sets, &BTreeMap::new()).unwrap();
    assert_eq!(summary.duration_seconds, 1800);
    assert_eq!(summary.total_tonnage_kg, 600.0);
    assert_eq!(session.phase(), &WorkoutPhase::Completed { session_id: 42 });

    assert!(session.finish(99, 1_900_000, &sets, &BTreeMap::new()).is_none());
    assert_eq!(session.phase(), &WorkoutPhase::Completed { session_id: 42 });
  }
}
