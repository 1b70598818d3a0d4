pub mod baseline;
pub mod config;
pub mod db;
pub mod history;
pub mod llm;
pub mod models;
pub mod plan_parser;
pub mod planner;
pub mod progression;
pub mod records;
pub mod session;
pub mod strength;
pub mod summary;
pub mod volume;
pub mod weight_step;
pub mod workout_state;

#[cfg(test)]
mod test_utils;

pub use baseline::ExerciseBaseline;
pub use config::{CoachConfig, ConfigError, GeminiConfig};
pub use history::{HistoryError, HistorySource, SqliteHistory};
pub use llm::{GeminiClient, LlmError, PlanProvider};
pub use plan_parser::PlanError;
pub use planner::{PlanOutcome, PlanSource, Planner};
pub use progression::ProgressionResult;
pub use session::WorkoutSession;
pub use summary::WorkoutSummary;
pub use workout_state::{transition, Transition, WorkoutEvent, WorkoutPhase};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns false if a subscriber was
/// already installed.
pub fn init_tracing(level: &str) -> bool {
  let filter = std::env::var("RUST_LOG")
    .map_or_else(|_| EnvFilter::new(level), EnvFilter::new)
    .add_directive(
      "sqlx=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    )
    .add_directive(
      "reqwest=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    );

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .try_init()
    .is_ok()
}
