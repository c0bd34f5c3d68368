//! Control rod controller
//!
//! A rod's neutron cross-section creeps toward the operator's target at a
//! fixed rate, so a SCRAM takes several ticks to bite.

use crate::error::CommandError;
use crate::part::ReactorPart;

/// Fully withdrawn
pub const MIN_INSERTION: f32 = 0.0;
/// Fully inserted
pub const MAX_INSERTION: f32 = 2.0;
/// Operator setting a fresh reactor starts with
pub const DEFAULT_INSERTION: f32 = 1.0;
/// Largest cross-section change per tick
pub const ROD_STEP_PER_TICK: f32 = 0.1;

/// Check an absolute insertion level from the operator
pub fn validate_insertion(level: f32) -> Result<f32, CommandError> {
    if level.is_finite() && (MIN_INSERTION..=MAX_INSERTION).contains(&level) {
        Ok(level)
    } else {
        Err(CommandError::InsertionOutOfRange(level))
    }
}

/// Move an active rod's cross-section one step toward its target.
/// Returns the change applied (0 for anything that is not a working rod).
pub fn relax<G>(part: &mut ReactorPart<G>) -> f32 {
    if !part.is_active_control_rod() {
        return 0.0;
    }

    let target = part
        .configured_insertion_level
        .clamp(MIN_INSERTION, MAX_INSERTION);
    let step = (target - part.neutron_cross_section).clamp(-ROD_STEP_PER_TICK, ROD_STEP_PER_TICK);
    part.neutron_cross_section += step;
    step
}
