use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
  Warmup,
  #[default]
  Working,
}

impl std::fmt::Display for SetType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Warmup => write!(f, "warmup"),
      Self::Working => write!(f, "working"),
    }
  }
}

impl std::str::FromStr for SetType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "warmup" => Ok(Self::Warmup),
      "working" => Ok(Self::Working),
      _ => Err(format!("Unknown set type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetStatus {
  #[default]
  Planned,
  Completed,
  Skipped,
}

impl std::fmt::Display for SetStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Planned => write!(f, "planned"),
      Self::Completed => write!(f, "completed"),
      Self::Skipped => write!(f, "skipped"),
    }
  }
}

impl std::str::FromStr for SetStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "planned" => Ok(Self::Planned),
      "completed" => Ok(Self::Completed),
      "skipped" => Ok(Self::Skipped),
      _ => Err(format!("Unknown set status: {}", s)),
    }
  }
}

/// A logged set as stored by the session repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
  pub id: i64,
  pub set_number: i64,
  pub set_type: SetType,
  pub status: SetStatus,
  pub planned_weight_kg: Option<f64>,
  pub planned_reps: Option<u32>,
  pub actual_weight_kg: Option<f64>,
  pub actual_reps: Option<u32>,
  pub completed_at: Option<DateTime<Utc>>,
  pub is_personal_record: bool,
}

impl WorkoutSet {
  /// Completed working sets are the only ones that count toward volume and PRs
  pub fn is_completed_working(&self) -> bool {
    self.set_type == SetType::Working && self.status == SetStatus::Completed
  }
}

/// One set from a past session, reduced to what the progression engine needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSet {
  pub weight: f64,
  pub reps: u32,
  pub set_type: SetType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSession {
  pub date: DateTime<Utc>,
  pub sets: Vec<HistoricalSet>,
}

impl HistoricalSession {
  pub fn working_sets(&self) -> impl Iterator<Item = &HistoricalSet> {
    self.sets.iter().filter(|s| s.set_type == SetType::Working)
  }

  /// Heaviest working weight, None if the session only had warmups
  pub fn top_working_weight(&self) -> Option<f64> {
    self.working_sets().map(|s| s.weight).reduce(f64::max)
  }
}
