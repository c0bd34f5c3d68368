//! Error types for operator commands, layouts and tuning config

use thiserror::Error;

/// Why an operator command was refused. A refused command changes nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("slot ({x}, {y}) is outside the reactor grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("reactor has melted down")]
    ReactorMelted,

    #[error("part at ({x}, {y}) has melted")]
    PartMelted { x: i32, y: i32 },

    #[error("insertion level {0} is outside 0..=2")]
    InsertionOutOfRange(f32),

    #[error("part at ({x}, {y}) is not a control rod")]
    NotAControlRod { x: i32, y: i32 },

    #[error("slot ({x}, {y}) is empty")]
    EmptySlot { x: i32, y: i32 },

    #[error("slot ({x}, {y}) is occupied")]
    SlotOccupied { x: i32, y: i32 },
}

/// Problems applying a prefab layout
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout is {layout_width}x{layout_height} but the grid is {grid_width}x{grid_height}")]
    DimensionMismatch {
        layout_width: usize,
        layout_height: usize,
        grid_width: usize,
        grid_height: usize,
    },

    #[error("layout cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("unknown prefab `{0}`")]
    UnknownPrefab(String),

    #[error("reactor has melted down; reset it before applying a layout")]
    ReactorMelted,

    #[error("failed to parse layout: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Problems loading tuning config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse reactor config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
