//! Scenario definition and RON file loading

use anyhow::{Context, Result};
use fission_core::{Gas, GasMixture, Layout, ReactorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::actions::TimedAction;
use super::verification::VerificationCondition;

/// Gas fed into the reactor inlet every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoolantSupply {
    /// Liters available at the inlet each tick
    pub volume: f32,
    /// Kelvin
    pub temperature: f32,
    /// Moles per species
    #[serde(default)]
    pub gases: Vec<(Gas, f32)>,
}

impl CoolantSupply {
    /// A fresh inlet volume for one tick
    pub fn to_mixture(&self) -> GasMixture {
        self.gases
            .iter()
            .fold(GasMixture::new(self.volume, self.temperature), |mix, (gas, moles)| {
                mix.with_moles(*gas, *moles)
            })
    }
}

impl Default for CoolantSupply {
    fn default() -> Self {
        Self {
            volume: 2000.0,
            temperature: 293.15,
            gases: vec![(Gas::Nitrogen, 80.0), (Gas::Oxygen, 20.0)],
        }
    }
}

/// Top-level scenario definition loaded from RON files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Scenario name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Grid size and initial parts
    pub layout: Layout,

    /// Tuning overrides; anything left out keeps its default
    #[serde(default)]
    pub reactor: ReactorConfig,

    #[serde(default)]
    pub coolant: CoolantSupply,

    /// Temperature new parts are built at (Kelvin)
    #[serde(default = "default_part_temperature")]
    pub part_temperature: f32,

    /// RNG seed; the command line wins over this
    #[serde(default)]
    pub seed: Option<u64>,

    /// Tick count; the command line wins over this
    #[serde(default)]
    pub ticks: Option<u64>,

    /// Scheduled operator actions
    #[serde(default)]
    pub timeline: Vec<TimedAction>,

    /// Checks run against the finished run
    #[serde(default)]
    pub verify: Vec<VerificationCondition>,
}

fn default_part_temperature() -> f32 {
    293.15
}

impl ScenarioDefinition {
    /// Load scenario from RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

        Self::from_ron_str(&content)
            .with_context(|| format!("Failed to parse RON scenario: {}", path.display()))
    }

    pub fn from_ron_str(source: &str) -> Result<Self> {
        let scenario: Self = ron::from_str(source).context("Invalid scenario RON")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Save scenario to RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize scenario to RON")?;

        std::fs::write(path.as_ref(), ron).with_context(|| {
            format!("Failed to write scenario file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// Catch obvious mistakes before a long run
    fn validate(&self) -> Result<()> {
        if self.layout.width == 0 || self.layout.height == 0 {
            anyhow::bail!(
                "Scenario '{}' has an empty {}x{} grid",
                self.name,
                self.layout.width,
                self.layout.height
            );
        }
        if self.reactor.warning_temperature > self.reactor.meltdown_temperature {
            log::warn!(
                "Scenario '{}': warning temperature {} K is above meltdown at {} K",
                self.name,
                self.reactor.warning_temperature,
                self.reactor.meltdown_temperature
            );
        }
        Ok(())
    }
}
