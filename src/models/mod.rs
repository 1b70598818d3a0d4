pub mod exercise;
pub mod plan;
pub mod workout;

pub use exercise::{Difficulty, Equipment, ExerciseForPlan, MovementType, MuscleGroup};
pub use plan::{ExercisePlan, GeneratedPlan, PlannedSet, SessionSummary};
pub use workout::{HistoricalSession, HistoricalSet, SetStatus, SetType, WorkoutSet};
