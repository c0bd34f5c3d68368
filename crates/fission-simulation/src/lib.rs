//! Material, part and gas data for the fission reactor simulation
//!
//! This crate provides the foundational data types the engine builds on:
//! - Material definitions (MaterialId, MaterialDef, MaterialProperties, Materials)
//! - Part prefabs (PartId, PartKind, PartDef, PartDefs)
//! - The gas capability interface (Gas, GasVolume) and an in-memory GasMixture

mod gas;
mod materials;
mod parts;

pub use gas::{Gas, GasMixture, GasVolume, MINIMUM_HEAT_CAPACITY, TCMB};
pub use materials::{MaterialDef, MaterialId, MaterialProperties, Materials};
pub use parts::{PartDef, PartDefs, PartId, PartKind};
