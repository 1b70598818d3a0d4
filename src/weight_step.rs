//! Equipment-aware load quantization
//!
//! Plates, pin stacks and kettlebells come in fixed jumps. Anything the
//! engine prescribes for a real implement has to land on one of them.

use crate::models::Equipment;

/// Smallest load change the equipment allows, in kg. Zero means unloaded.
pub fn increment_kg(equipment: Equipment) -> f64 {
  match equipment {
    Equipment::Barbell | Equipment::Dumbbell | Equipment::EzBar | Equipment::TrapBar => 2.5,
    Equipment::Cable | Equipment::Machine => 5.0,
    Equipment::Kettlebell => 4.0,
    Equipment::Bodyweight | Equipment::Band => 0.0,
  }
}

/// Snap a load down to the nearest achievable step.
///
/// Always rounds toward zero so a prescription never exceeds what was asked.
/// Unloaded equipment passes the weight through unchanged.
pub fn round_down(weight: f64, equipment: Equipment) -> f64 {
  let increment = increment_kg(equipment);
  if increment == 0.0 {
    return weight;
  }
  (weight / increment).floor() * increment
}
