//! Reactor tuning constants
//!
//! Every field has a default so a RON file only needs to name what it
//! overrides, e.g. `(reaction_rate: 10.0, meltdown_temperature: 1000.0)`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use fission_simulation::MaterialId;

/// Tuning knobs for one reactor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    /// Global multiplier on every neutron interaction roll
    pub reaction_rate: f32,
    /// Extra multiplier for balancing without touching `reaction_rate`
    pub reaction_bias: f32,
    /// Heat from neutron-stimulated emission (50 and 25 K per event, times this)
    pub stimulated_heating_factor: f32,
    /// Heat from spontaneous emission (20 and 10 K per event, times this)
    pub spontaneous_heating_factor: f32,
    /// Percent chance per unit of radioactivity for the stimulated paths
    pub stimulated_chance_scale: f32,
    /// Percent chance per unit of hardness to reflect a neutron
    pub reflection_chance_per_hardness: f32,

    /// Amount of `neutron_radioactivity` consumed per low-energy emission
    pub neutron_reactant: f32,
    /// Amount of `radioactivity` produced per low-energy emission
    pub neutron_product: f32,
    /// Amount of `radioactivity` consumed per mid-energy emission
    pub radioactivity_reactant: f32,
    /// Amount of `fissile_isotopes` produced per mid-energy emission
    pub radioactivity_product: f32,

    /// Number of samples the thermal power average spans
    pub thermal_power_precision: u32,

    /// Casing temperature (K) that triggers a meltdown
    pub meltdown_temperature: f32,
    /// Casing temperature (K) that raises the overheat alarm
    pub warning_temperature: f32,

    pub casing_material: u16,
    /// Energy to raise the casing by one Kelvin
    pub casing_thermal_mass: f32,
    pub casing_initial_temperature: f32,
    /// Area used for the casing / casing air exchange
    pub casing_gas_cross_section: f32,

    /// Liters pulled from the inlet each tick
    pub intake_volume: f32,
    /// Liters of casing air pushed to the outlet each tick
    pub vent_volume: f32,

    /// Radiation added per neutron leaving the grid
    pub radiation_per_leaked_neutron: f32,
    /// Energy (J) deposited in the casing per neutron leaving the grid
    pub leaked_neutron_energy: f32,

    /// Moles of tritium released into the casing per point of meltdown badness
    pub meltdown_tritium_per_badness: f32,
    pub meltdown_min_throws: u32,
    pub meltdown_max_throws: u32,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            reaction_rate: 5.0,
            reaction_bias: 1.0,
            stimulated_heating_factor: 1.0,
            spontaneous_heating_factor: 1.0,
            stimulated_chance_scale: 10.0,
            reflection_chance_per_hardness: 2.0,
            neutron_reactant: 0.01,
            neutron_product: 0.005,
            radioactivity_reactant: 0.01,
            radioactivity_product: 0.005,
            thermal_power_precision: 128,
            meltdown_temperature: 2500.0,
            warning_temperature: 2000.0,
            casing_material: MaterialId::STEEL,
            casing_thermal_mass: 100_000.0,
            casing_initial_temperature: 293.15,
            casing_gas_cross_section: 50.0,
            intake_volume: 200.0,
            vent_volume: 200.0,
            radiation_per_leaked_neutron: 1.0,
            leaked_neutron_energy: 100.0,
            meltdown_tritium_per_badness: 0.5,
            meltdown_min_throws: 10,
            meltdown_max_throws: 30,
        }
    }
}

impl ReactorConfig {
    /// Parse a (possibly partial) config from RON
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Base percent chance that a neutron interacts with a part
    pub fn interaction_chance(&self, density: f32, neutron_cross_section: f32) -> f32 {
        density * self.reaction_rate * neutron_cross_section * self.reaction_bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReactorConfig::default();
        assert_eq!(config.casing_material, MaterialId::STEEL);
        assert_eq!(config.thermal_power_precision, 128);
        assert!(config.warning_temperature < config.meltdown_temperature);
        assert!(config.meltdown_min_throws <= config.meltdown_max_throws);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config =
            ReactorConfig::from_ron_str("(reaction_rate: 10.0, meltdown_temperature: 1000.0)")
                .expect("valid config");
        assert_eq!(config.reaction_rate, 10.0);
        assert_eq!(config.meltdown_temperature, 1000.0);
        assert_eq!(config.reaction_bias, 1.0);
    }

    #[test]
    fn test_bad_ron_is_an_error() {
        let parsed = ReactorConfig::from_ron_str("(reaction_rate: \"fast\")");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_interaction_chance() {
        let config = ReactorConfig {
            reaction_rate: 10.0,
            reaction_bias: 0.5,
            ..Default::default()
        };
        assert_eq!(config.interaction_chance(2.0, 3.0), 30.0);
    }
}
