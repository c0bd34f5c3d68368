//! Read-only views of reactor state for presentation layers
//!
//! Payload size grows with grid area; callers throttle how often they
//! capture, not how often the reactor ticks.

use fission_simulation::GasVolume;
use glam::IVec2;
use serde::Serialize;

use crate::reactor::Reactor;
use crate::rng_trait::ReactorRng;

/// One occupied cell as the UI sees it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartSnapshot {
    pub position: IVec2,
    pub temperature: f32,
    pub neutron_count: u32,
    pub icon: String,
    pub name: String,
    pub radioactivity: f32,
    pub neutron_radioactivity: f32,
    pub fissile_isotopes: f32,
    pub melted: bool,
}

/// Whole-reactor view
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReactorSnapshot {
    pub width: usize,
    pub height: usize,
    pub radiation_level: f32,
    pub thermal_power: f32,
    pub control_rod_actual: f32,
    pub control_rod_set: f32,
    pub casing_temperature: f32,
    pub overheat_alarm: bool,
    pub melted: bool,
    pub parts: Vec<PartSnapshot>,
}

impl ReactorSnapshot {
    pub fn capture<G: GasVolume, R: ReactorRng>(reactor: &Reactor<G, R>) -> Self {
        let grid = reactor.grid();
        let parts = grid
            .parts()
            .map(|(position, part)| part.snapshot(position, grid.neutron_count(position)))
            .collect();

        Self {
            width: grid.width(),
            height: grid.height(),
            radiation_level: reactor.radiation_level(),
            thermal_power: reactor.thermal_power(),
            control_rod_actual: reactor.avg_control_rod_insertion(),
            control_rod_set: reactor.control_rod_set(),
            casing_temperature: reactor.casing_temperature(),
            overheat_alarm: reactor.is_alarm_raised(),
            melted: reactor.is_melted(),
            parts,
        }
    }

    pub fn part_at(&self, position: IVec2) -> Option<&PartSnapshot> {
        self.parts.iter().find(|p| p.position == position)
    }

    pub fn hottest_part(&self) -> Option<&PartSnapshot> {
        self.parts
            .iter()
            .max_by(|a, b| a.temperature.total_cmp(&b.temperature))
    }
}
