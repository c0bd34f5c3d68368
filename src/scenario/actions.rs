//! Operator actions a scenario can schedule

use serde::{Deserialize, Serialize};

/// One operator action, applied right before the tick it is scheduled for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioAction {
    // === CONTROL RODS ===
    /// Set every rod's target insertion (0 = withdrawn, 2 = fully inserted)
    SetRods { level: f32 },

    /// Move every rod's target by `delta`, clamped to the valid range
    AdjustRods { delta: f32 },

    /// Set one rod's target insertion
    SetRodAt { x: i32, y: i32, level: f32 },

    // === PARTS ===
    /// Build a prefab into an empty slot
    PlacePart { x: i32, y: i32, prefab: String },

    /// Take the part out of a slot
    RemovePart { x: i32, y: i32 },

    /// Rebuild a melted part from its prefab
    RepairPart { x: i32, y: i32 },

    // === DIRECT STATE ===
    /// Drop neutrons into a cell, headings cycling through the cardinals
    InjectNeutrons {
        x: i32,
        y: i32,
        count: u32,
        velocity: u32,
    },

    /// Force the casing to a temperature (Kelvin)
    SetCasingTemperature { kelvin: f32 },

    /// Melt the reactor down right now
    TriggerMeltdown,

    /// Clear the grid and rebuild the scenario layout
    Reset,

    /// Write a line to the run log
    Log { message: String },
}

/// An action and the tick it fires on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedAction {
    /// Zero-based tick index
    pub tick: u64,
    pub action: ScenarioAction,
}
