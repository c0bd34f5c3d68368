//! Reactor part prefabs
//!
//! A prefab is the immutable recipe a grid cell is built from. The engine
//! turns one into a mutable part with its own copy of the material values.

use serde::{Deserialize, Serialize};

use crate::MaterialId;

/// Built-in prefab IDs
pub struct PartId;

impl PartId {
    pub const FUEL_ROD_URANIUM: &'static str = "fuel_rod_uranium";
    pub const FUEL_ROD_PLUTONIUM: &'static str = "fuel_rod_plutonium";
    pub const FUEL_ROD_THORIUM: &'static str = "fuel_rod_thorium";
    pub const CONTROL_ROD: &'static str = "control_rod";
    pub const GAS_CHANNEL: &'static str = "gas_channel";
    pub const HEAT_EXCHANGER: &'static str = "heat_exchanger";
    pub const MODERATOR: &'static str = "moderator";
}

/// What role a part plays in the core
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartKind {
    FuelRod,
    /// Operator-adjustable absorber
    ControlRod,
    /// Carries coolant gas through the core
    GasChannel,
    /// Gas channel tuned for heat pickup
    HeatExchanger,
    /// Slows neutrons down
    Moderator,
}

/// Recipe for one reactor part
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartDef {
    pub id: String,
    /// Human readable name shown in the UI
    pub name: String,
    pub kind: PartKind,
    pub material: u16,
    /// Base icon state; melted parts get a variant suffix
    pub icon: String,

    /// Energy needed to raise the part by one Kelvin
    pub thermal_mass: f32,
    pub neutron_cross_section: f32,
    pub thermal_cross_section: f32,
    pub gas_thermal_cross_section: f32,

    pub melting_point: f32,
    pub melt_health: i32,

    /// Liters of gas the channel holds per tick (0 = no gas channel)
    pub gas_volume: f32,
    /// Starting operator target for control rods
    pub insertion_level: f32,
}

impl Default for PartDef {
    fn default() -> Self {
        Self {
            id: "unknown".to_string(),
            name: "unknown part".to_string(),
            kind: PartKind::Moderator,
            material: MaterialId::STEEL,
            icon: "base".to_string(),
            thermal_mass: 10_000.0,
            neutron_cross_section: 0.5,
            thermal_cross_section: 10.0,
            gas_thermal_cross_section: 15.0,
            melting_point: 2100.0,
            melt_health: 100,
            gas_volume: 0.0,
            insertion_level: 1.0,
        }
    }
}

/// Registry of all part prefabs
#[derive(Clone, Debug)]
pub struct PartDefs {
    parts: Vec<PartDef>,
}

impl PartDefs {
    pub fn new() -> Self {
        let mut parts = Self { parts: Vec::new() };
        parts.register_defaults();
        parts
    }

    fn register_defaults(&mut self) {
        self.register(PartDef {
            id: PartId::FUEL_ROD_URANIUM.to_string(),
            name: "uranium fuel rod".to_string(),
            kind: PartKind::FuelRod,
            material: MaterialId::URANIUM,
            icon: "fuel_rod".to_string(),
            thermal_mass: 8_000.0,
            neutron_cross_section: 1.0,
            gas_thermal_cross_section: 0.0,
            melting_point: 1405.0,
            ..Default::default()
        });

        self.register(PartDef {
            id: PartId::FUEL_ROD_PLUTONIUM.to_string(),
            name: "plutonium fuel rod".to_string(),
            kind: PartKind::FuelRod,
            material: MaterialId::PLUTONIUM,
            icon: "fuel_rod".to_string(),
            thermal_mass: 8_000.0,
            neutron_cross_section: 1.0,
            gas_thermal_cross_section: 0.0,
            melting_point: 913.0,
            ..Default::default()
        });

        self.register(PartDef {
            id: PartId::FUEL_ROD_THORIUM.to_string(),
            name: "thorium fuel rod".to_string(),
            kind: PartKind::FuelRod,
            material: MaterialId::THORIUM,
            icon: "fuel_rod".to_string(),
            thermal_mass: 8_000.0,
            neutron_cross_section: 1.0,
            gas_thermal_cross_section: 0.0,
            melting_point: 2023.0,
            ..Default::default()
        });

        self.register(PartDef {
            id: PartId::CONTROL_ROD.to_string(),
            name: "control rod".to_string(),
            kind: PartKind::ControlRod,
            material: MaterialId::BORON_CARBIDE,
            icon: "control_rod".to_string(),
            thermal_mass: 6_000.0,
            neutron_cross_section: 1.0,
            gas_thermal_cross_section: 0.0,
            melting_point: 2723.0,
            insertion_level: 1.0,
            ..Default::default()
        });

        self.register(PartDef {
            id: PartId::GAS_CHANNEL.to_string(),
            name: "gas channel".to_string(),
            kind: PartKind::GasChannel,
            material: MaterialId::STEEL,
            icon: "gas_channel".to_string(),
            neutron_cross_section: 0.1,
            gas_thermal_cross_section: 15.0,
            melting_point: 1700.0,
            gas_volume: 100.0,
            ..Default::default()
        });

        self.register(PartDef {
            id: PartId::HEAT_EXCHANGER.to_string(),
            name: "heat exchanger".to_string(),
            kind: PartKind::HeatExchanger,
            material: MaterialId::COPPER,
            icon: "heat_exchanger".to_string(),
            neutron_cross_section: 0.1,
            thermal_cross_section: 25.0,
            gas_thermal_cross_section: 30.0,
            melting_point: 1357.0,
            gas_volume: 50.0,
            ..Default::default()
        });

        self.register(PartDef {
            id: PartId::MODERATOR.to_string(),
            name: "graphite moderator".to_string(),
            kind: PartKind::Moderator,
            material: MaterialId::GRAPHITE,
            icon: "moderator".to_string(),
            neutron_cross_section: 2.0,
            gas_thermal_cross_section: 0.0,
            melting_point: 3900.0,
            ..Default::default()
        });
    }

    /// Add or replace a prefab
    pub fn register(&mut self, part: PartDef) {
        match self.parts.iter_mut().find(|p| p.id == part.id) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
    }

    pub fn get(&self, id: &str) -> Option<&PartDef> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartDef> {
        self.parts.iter()
    }
}

impl Default for PartDefs {
    fn default() -> Self {
        Self::new()
    }
}
