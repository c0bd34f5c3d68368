//! Material definitions and registry

use serde::{Deserialize, Serialize};

/// Built-in material IDs
pub struct MaterialId;

impl MaterialId {
    // Structural
    pub const STEEL: u16 = 0;
    pub const COPPER: u16 = 1;
    pub const GRAPHITE: u16 = 2;
    pub const BORON_CARBIDE: u16 = 3;

    // Fuels
    pub const URANIUM: u16 = 4;
    pub const PLUTONIUM: u16 = 5;
    pub const THORIUM: u16 = 6;
}

/// Physical constants of a substance.
///
/// Parts hold their own mutable copy of these values: reactions consume
/// `neutron_radioactivity` and `radioactivity` and produce `radioactivity`
/// and `fissile_isotopes` over time, so the table entry is only a prototype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub electrical_conductivity: f32,
    /// Heat conductivity (W/m·K-like scale)
    pub thermal_conductivity: f32,
    /// Chance of reflecting a neutron scales with this
    pub hardness: f32,
    /// Density (g/cm³) - scales every neutron interaction roll
    pub density: f32,
    pub reflectivity: f32,
    pub flammability: f32,
    pub chemical_resistance: f32,
    /// Mid-energy emission potential, produced by neutron-induced decay
    pub radioactivity: f32,
    /// Low-energy emission potential
    pub neutron_radioactivity: f32,
    /// Spent-fuel products; weighs heavily in meltdown badness
    pub fissile_isotopes: f32,
    pub active_plasma: f32,
}

/// Definition of a material
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialDef {
    pub id: u16,
    pub name: String,
    pub properties: MaterialProperties,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            properties: MaterialProperties {
                thermal_conductivity: 1.0,
                density: 1.0,
                ..Default::default()
            },
        }
    }
}

/// Registry of all materials
#[derive(Clone, Debug)]
pub struct Materials {
    materials: Vec<MaterialDef>,
}

impl Materials {
    pub fn new() -> Self {
        let mut materials = Self {
            materials: Vec::new(),
        };
        materials.register_defaults();
        materials
    }

    fn register_defaults(&mut self) {
        // Casing and gas channel walls
        self.register(MaterialDef {
            id: MaterialId::STEEL,
            name: "steel".to_string(),
            properties: MaterialProperties {
                electrical_conductivity: 1.4,
                thermal_conductivity: 45.0,
                hardness: 4.5,
                density: 7.85,
                reflectivity: 0.6,
                chemical_resistance: 6.0,
                ..Default::default()
            },
        });

        // Heat exchanger fins
        self.register(MaterialDef {
            id: MaterialId::COPPER,
            name: "copper".to_string(),
            properties: MaterialProperties {
                electrical_conductivity: 6.0,
                thermal_conductivity: 400.0,
                hardness: 3.0,
                density: 8.96,
                reflectivity: 0.9,
                chemical_resistance: 3.0,
                ..Default::default()
            },
        });

        // Moderator: soft, slows neutrons rather than bouncing them
        self.register(MaterialDef {
            id: MaterialId::GRAPHITE,
            name: "graphite".to_string(),
            properties: MaterialProperties {
                electrical_conductivity: 0.1,
                thermal_conductivity: 120.0,
                hardness: 1.5,
                density: 2.2,
                reflectivity: 0.1,
                flammability: 2.0,
                chemical_resistance: 4.0,
                ..Default::default()
            },
        });

        // Control rod absorber
        self.register(MaterialDef {
            id: MaterialId::BORON_CARBIDE,
            name: "boron_carbide".to_string(),
            properties: MaterialProperties {
                thermal_conductivity: 30.0,
                hardness: 9.5,
                density: 2.52,
                reflectivity: 0.2,
                chemical_resistance: 8.0,
                ..Default::default()
            },
        });

        self.register(MaterialDef {
            id: MaterialId::URANIUM,
            name: "uranium".to_string(),
            properties: MaterialProperties {
                electrical_conductivity: 0.4,
                thermal_conductivity: 27.0,
                hardness: 6.0,
                density: 19.1,
                reflectivity: 0.3,
                chemical_resistance: 2.0,
                radioactivity: 1.0,
                neutron_radioactivity: 4.0,
                ..Default::default()
            },
        });

        // Hotter and less stable than uranium
        self.register(MaterialDef {
            id: MaterialId::PLUTONIUM,
            name: "plutonium".to_string(),
            properties: MaterialProperties {
                electrical_conductivity: 0.07,
                thermal_conductivity: 6.7,
                hardness: 5.0,
                density: 19.8,
                reflectivity: 0.3,
                chemical_resistance: 1.0,
                radioactivity: 3.0,
                neutron_radioactivity: 7.0,
                fissile_isotopes: 0.5,
                ..Default::default()
            },
        });

        // Slow burner: mostly bred through the mid-energy path
        self.register(MaterialDef {
            id: MaterialId::THORIUM,
            name: "thorium".to_string(),
            properties: MaterialProperties {
                electrical_conductivity: 0.7,
                thermal_conductivity: 54.0,
                hardness: 3.0,
                density: 11.7,
                reflectivity: 0.4,
                chemical_resistance: 3.0,
                radioactivity: 2.0,
                neutron_radioactivity: 1.0,
                ..Default::default()
            },
        });
    }

    fn register(&mut self, material: MaterialDef) {
        let id = material.id as usize;

        // Ensure vec is large enough
        if self.materials.len() <= id {
            self.materials.resize(id + 1, MaterialDef::default());
        }

        self.materials[id] = material;
    }

    /// Get material definition by ID
    pub fn get(&self, id: u16) -> &MaterialDef {
        self.materials
            .get(id as usize)
            .unwrap_or(&self.materials[0])
    }

    /// Get the prototype properties for a material
    pub fn properties(&self, id: u16) -> MaterialProperties {
        self.get(id).properties
    }

    /// Look up a material by its name
    pub fn find(&self, name: &str) -> Option<&MaterialDef> {
        self.materials.iter().find(|m| m.name == name)
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}
