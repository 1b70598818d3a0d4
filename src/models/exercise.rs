use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Exercise Metadata Enums
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
  Barbell,
  Dumbbell,
  EzBar,
  TrapBar,
  Cable,
  Machine,
  Kettlebell,
  Bodyweight,
  Band,
}

impl Equipment {
  pub const ALL: [Equipment; 9] = [
    Equipment::Barbell,
    Equipment::Dumbbell,
    Equipment::EzBar,
    Equipment::TrapBar,
    Equipment::Cable,
    Equipment::Machine,
    Equipment::Kettlebell,
    Equipment::Bodyweight,
    Equipment::Band,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Equipment::Barbell => "barbell",
      Equipment::Dumbbell => "dumbbell",
      Equipment::EzBar => "ez_bar",
      Equipment::TrapBar => "trap_bar",
      Equipment::Cable => "cable",
      Equipment::Machine => "machine",
      Equipment::Kettlebell => "kettlebell",
      Equipment::Bodyweight => "bodyweight",
      Equipment::Band => "band",
    }
  }
}

impl std::fmt::Display for Equipment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Equipment {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Equipment::ALL
      .iter()
      .copied()
      .find(|e| e.as_str() == s)
      .ok_or_else(|| format!("Unknown equipment: {}", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
  Compound,
  Isolation,
}

impl std::fmt::Display for MovementType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Compound => write!(f, "compound"),
      Self::Isolation => write!(f, "isolation"),
    }
  }
}

impl std::str::FromStr for MovementType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "compound" => Ok(Self::Compound),
      "isolation" => Ok(Self::Isolation),
      _ => Err(format!("Unknown movement type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  #[default]
  Intermediate,
  Advanced,
}

impl std::fmt::Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Beginner => write!(f, "beginner"),
      Self::Intermediate => write!(f, "intermediate"),
      Self::Advanced => write!(f, "advanced"),
    }
  }
}

impl std::str::FromStr for Difficulty {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "beginner" => Ok(Self::Beginner),
      "intermediate" => Ok(Self::Intermediate),
      "advanced" => Ok(Self::Advanced),
      _ => Err(format!("Unknown difficulty: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
  Chest,
  Back,
  Shoulders,
  Arms,
  Legs,
  LowerBack,
  Core,
  FullBody,
}

impl MuscleGroup {
  /// Legs and lower back get the bigger load jumps
  pub fn is_lower_body(&self) -> bool {
    matches!(self, MuscleGroup::Legs | MuscleGroup::LowerBack)
  }
}

impl std::fmt::Display for MuscleGroup {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::Chest => "chest",
      Self::Back => "back",
      Self::Shoulders => "shoulders",
      Self::Arms => "arms",
      Self::Legs => "legs",
      Self::LowerBack => "lower_back",
      Self::Core => "core",
      Self::FullBody => "full_body",
    };
    f.write_str(s)
  }
}

impl std::str::FromStr for MuscleGroup {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "chest" => Ok(Self::Chest),
      "back" => Ok(Self::Back),
      "shoulders" => Ok(Self::Shoulders),
      "arms" => Ok(Self::Arms),
      "legs" => Ok(Self::Legs),
      "lower_back" => Ok(Self::LowerBack),
      "core" => Ok(Self::Core),
      "full_body" => Ok(Self::FullBody),
      _ => Err(format!("Unknown muscle group: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Roster Entry
/// ---------------------------------------------------------------------------

/// One exercise the user selected for the session.
///
/// `stable_id` is the identifier shared with the AI provider; `exercise_id`
/// is the local database key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseForPlan {
  pub exercise_id: i64,
  pub stable_id: String,
  pub name: String,
  pub equipment: Equipment,
  pub movement_type: MovementType,
  pub difficulty: Difficulty,
  pub primary_group: MuscleGroup,
}

impl ExerciseForPlan {
  pub fn is_compound(&self) -> bool {
    self.movement_type == MovementType::Compound
  }

  pub fn is_lower_body(&self) -> bool {
    self.primary_group.is_lower_body()
  }
}
