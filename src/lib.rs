//! # Fission - headless reactor scenario runner
//!
//! Builds a `fission_core::Reactor` from a RON scenario, drives it tick by
//! tick and reports what happened.

pub mod config;
pub mod scenario;

pub use config::AppConfig;
pub use scenario::{RunOptions, RunReport, ScenarioDefinition, ScenarioExecutor};

/// Common imports for internal use
pub mod prelude {
    pub use fission_core::{GasMixture, Layout, PartId, Reactor, ReactorConfig};
    pub use glam::IVec2;
}
