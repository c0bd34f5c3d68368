//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `fission.ron` file (if exists)
//! 3. Environment variables prefixed with `FISSION_`
//!
//! Example environment variable: `FISSION_RUN__REPORT_INTERVAL=50`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Main runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub atmosphere: AtmosphereConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Tick loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks to run when neither the scenario nor the CLI says otherwise
    pub ticks: u64,
    /// Seconds per tick
    pub timestep: f32,
    /// RNG seed when neither the scenario nor the CLI sets one
    pub seed: u64,
    /// Stop as soon as the reactor melts down
    pub stop_on_meltdown: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            timestep: 0.5,
            seed: 42,
            stop_on_meltdown: true,
        }
    }
}

/// Gas volumes surrounding the reactor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    /// Liters of casing air
    pub casing_air_volume: f32,
    /// Liters of the room the reactor stands in
    pub ambient_volume: f32,
    /// Kelvin
    pub ambient_temperature: f32,
    /// Outlet pipe capacity in liters
    pub outlet_volume: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            casing_air_volume: 1000.0,
            ambient_volume: 2500.0,
            ambient_temperature: 293.15,
            outlet_volume: 2000.0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Ticks between table rows
    pub interval: u64,
    /// Print the final reactor snapshot as RON
    pub print_snapshot: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval: 50,
            print_snapshot: false,
        }
    }
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `fission.ron` file (if exists)
    /// 3. Environment variables prefixed with `FISSION_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from("fission")
    }

    /// Same layering with a different config file name (extension optional)
    pub fn load_from(file_name: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("run.ticks", 600_i64)?
            .set_default("run.timestep", 0.5)?
            .set_default("run.seed", 42_i64)?
            .set_default("run.stop_on_meltdown", true)?
            .set_default("atmosphere.casing_air_volume", 1000.0)?
            .set_default("atmosphere.ambient_volume", 2500.0)?
            .set_default("atmosphere.ambient_temperature", 293.15)?
            .set_default("atmosphere.outlet_volume", 2000.0)?
            .set_default("report.interval", 50_i64)?
            .set_default("report.print_snapshot", false)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(file_name)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (FISSION_RUN__TICKS, etc.)
            .add_source(Environment::with_prefix("FISSION").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.run.ticks, 600);
        assert_eq!(config.run.timestep, 0.5);
        assert!(config.run.stop_on_meltdown);
        assert_eq!(config.atmosphere.ambient_temperature, 293.15);
        assert_eq!(config.report.interval, 50);
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = AppConfig::load_from("no_such_fission_config").expect("Failed to load config");
        assert_eq!(config.run.seed, 42);
        assert_eq!(config.atmosphere.outlet_volume, 2000.0);
        assert!(!config.report.print_snapshot);
    }
}
