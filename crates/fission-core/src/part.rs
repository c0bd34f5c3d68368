//! Reactor part - one grid cell's physical state

use fission_simulation::{MaterialProperties, Materials, PartDef, PartKind};
use glam::IVec2;

use crate::heat::ThermalBody;
use crate::rng_trait::ReactorRng;
use crate::snapshot::PartSnapshot;

/// Slag soaks up neutrons
pub const MELTED_NEUTRON_CROSS_SECTION: f32 = 5.0;
/// Slag conducts heat well
pub const MELTED_THERMAL_CROSS_SECTION: f32 = 20.0;
/// A melted gas channel is mostly plugged
pub const MELTED_GAS_THERMAL_CROSS_SECTION: f32 = 0.05;
/// Number of melted icon variants
pub const MELT_VARIANTS: u32 = 3;

/// Melt health lost per tick while above the melting point
pub const MELT_DAMAGE_MIN: u32 = 10;
pub const MELT_DAMAGE_MAX: u32 = 50;

/// One occupied grid cell
#[derive(Clone, Debug)]
pub struct ReactorPart<G> {
    /// Prefab this part was built from, used for repair
    pub prefab: String,
    pub name: String,
    pub kind: PartKind,
    pub icon: String,

    /// Kelvin, never negative
    pub temperature: f32,
    pub thermal_mass: f32,
    pub neutron_cross_section: f32,
    pub thermal_cross_section: f32,
    pub gas_thermal_cross_section: f32,

    pub melting_point: f32,
    pub melt_health: i32,
    pub melted: bool,

    /// Operator target for control rods, 0..=2
    pub configured_insertion_level: f32,

    /// Private working copy; reactions deplete it
    pub properties: MaterialProperties,

    /// Liters of gas routed through this part per tick (0 = no gas channel)
    pub gas_volume: f32,
    /// Gas passing through this tick
    pub gas_contents: Option<G>,
}

impl<G> ReactorPart<G> {
    /// Build a fresh part from its prefab
    pub fn from_def(def: &PartDef, materials: &Materials, temperature: f32) -> Self {
        Self {
            prefab: def.id.clone(),
            name: def.name.clone(),
            kind: def.kind,
            icon: def.icon.clone(),
            temperature,
            thermal_mass: def.thermal_mass,
            neutron_cross_section: def.neutron_cross_section,
            thermal_cross_section: def.thermal_cross_section,
            gas_thermal_cross_section: def.gas_thermal_cross_section,
            melting_point: def.melting_point,
            melt_health: def.melt_health,
            melted: false,
            configured_insertion_level: def.insertion_level,
            properties: materials.properties(def.material),
            gas_volume: def.gas_volume,
            gas_contents: None,
        }
    }

    pub fn is_control_rod(&self) -> bool {
        self.kind == PartKind::ControlRod
    }

    /// A control rod that still responds to the operator and absorbs neutrons
    pub fn is_active_control_rod(&self) -> bool {
        self.is_control_rod() && !self.melted
    }

    pub fn has_gas_channel(&self) -> bool {
        self.gas_volume > 0.0
    }

    pub fn thermal_body(&self) -> ThermalBody {
        ThermalBody::new(
            self.temperature,
            self.thermal_mass,
            Some(self.properties.thermal_conductivity),
        )
    }

    /// Take health off a part sitting above its melting point.
    /// Returns true if this pushed it over the edge.
    pub fn apply_overheat_damage<R: ReactorRng>(&mut self, rng: &mut R) -> bool {
        if self.melted || self.temperature <= self.melting_point || self.melt_health <= 0 {
            return false;
        }

        self.melt_health -= rng.gen_range_u32(MELT_DAMAGE_MIN, MELT_DAMAGE_MAX) as i32;
        if self.melt_health <= 0 {
            return self.melt(rng);
        }
        false
    }

    /// Turn the part into slag. Returns false if it already was.
    pub fn melt<R: ReactorRng>(&mut self, rng: &mut R) -> bool {
        if self.melted {
            return false;
        }

        self.melted = true;
        self.melt_health = self.melt_health.min(0);
        self.icon = format!(
            "{}_melted_{}",
            self.icon,
            rng.gen_range_u32(1, MELT_VARIANTS)
        );
        self.neutron_cross_section = MELTED_NEUTRON_CROSS_SECTION;
        self.thermal_cross_section = MELTED_THERMAL_CROSS_SECTION;
        self.gas_thermal_cross_section = MELTED_GAS_THERMAL_CROSS_SECTION;

        log::warn!(
            "{} melted at {:.0} K (melting point {:.0} K)",
            self.name,
            self.temperature,
            self.melting_point
        );
        true
    }

    /// Contribution to meltdown badness; slag counts double
    pub fn meltdown_badness(&self) -> f32 {
        let props = &self.properties;
        let base = props.radioactivity * 2.0
            + props.neutron_radioactivity * 5.0
            + props.fissile_isotopes * 10.0;
        if self.melted {
            base * 2.0
        } else {
            base
        }
    }

    pub fn snapshot(&self, position: IVec2, neutron_count: u32) -> PartSnapshot {
        PartSnapshot {
            position,
            temperature: self.temperature,
            neutron_count,
            icon: self.icon.clone(),
            name: self.name.clone(),
            radioactivity: self.properties.radioactivity,
            neutron_radioactivity: self.properties.neutron_radioactivity,
            fissile_isotopes: self.properties.fissile_isotopes,
            melted: self.melted,
        }
    }
}
