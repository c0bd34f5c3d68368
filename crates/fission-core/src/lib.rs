//! Fission reactor core simulation - neutron transport, heat, melt and meltdown

pub mod config;
pub mod control_rod;
pub mod diffusion;
pub mod error;
pub mod gas_reactions;
pub mod grid;
pub mod heat;
pub mod layout;
pub mod meltdown;
pub mod neutron;
pub mod part;
pub mod reactor;
pub mod rng_trait;
pub mod snapshot;
pub mod stats;
pub mod transport;

// Re-export the data crate so hosts only need one dependency
pub use fission_simulation::{
    Gas, GasMixture, GasVolume, MaterialDef, MaterialId, MaterialProperties, Materials, PartDef,
    PartDefs, PartId, PartKind,
};

pub use config::ReactorConfig;
pub use error::{CommandError, ConfigError, LayoutError};
pub use grid::ReactorGrid;
pub use heat::ThermalBody;
pub use layout::{GridCellFactory, Layout, LayoutCell, PrefabFactory};
pub use meltdown::{AudioCue, EffectLog, EffectRequest, MeltdownReport, NoopEffects, ReactorEffects};
pub use neutron::{Compass, Neutron, NeutronList};
pub use part::ReactorPart;
pub use reactor::{GasPorts, Reactor, RodAdjustment, SkipReason, TickStatus, TickSummary};
pub use rng_trait::ReactorRng;
pub use snapshot::{PartSnapshot, ReactorSnapshot};
pub use stats::{CountingStats, NoopStats, ReactorStats};
