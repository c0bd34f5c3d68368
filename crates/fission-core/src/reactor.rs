//! Reactor grid coordinator
//!
//! One call to [`Reactor::tick`] runs the whole core for one atmospheric
//! step:
//! 1. pull gas from the inlet into the casing and every gas channel
//! 2. process each occupied cell in raster order (diffusion, melt damage,
//!    neutron transport), reading neutrons from a snapshot of the flux
//! 3. commit the new flux in one go; neutrons leaving the grid hit the casing
//! 4. update radiation, thermal power and the control rod average
//! 5. check the overheat alarm and the meltdown threshold
//! 6. push channel gas and some casing air to the outlet

use fission_simulation::{GasVolume, Materials};
use glam::IVec2;

use crate::config::ReactorConfig;
use crate::control_rod::{self, DEFAULT_INSERTION, MAX_INSERTION, MIN_INSERTION};
use crate::diffusion::HeatDiffusion;
use crate::error::{CommandError, LayoutError};
use crate::grid::ReactorGrid;
use crate::heat::{self, guard_temperature, ThermalBody};
use crate::layout::{GridCellFactory, Layout};
use crate::meltdown::{self, AudioCue, MeltdownReport, ReactorEffects};
use crate::neutron::{Neutron, NeutronList};
use crate::part::ReactorPart;
use crate::rng_trait::ReactorRng;
use crate::snapshot::ReactorSnapshot;
use crate::stats::ReactorStats;
use crate::transport::NeutronTransport;

/// The alarm re-arms once the casing is this fraction of the warning temperature
pub const ALARM_RESET_FRACTION: f32 = 0.95;

/// Gas connections for one tick
pub struct GasPorts<'a, G> {
    pub inlet: Option<&'a mut G>,
    pub outlet: Option<&'a mut G>,
    /// The tile the reactor stands on; receives the casing air on meltdown
    pub ambient: Option<&'a mut G>,
}

impl<'a, G> GasPorts<'a, G> {
    pub fn new(inlet: &'a mut G, outlet: &'a mut G) -> Self {
        Self {
            inlet: Some(inlet),
            outlet: Some(outlet),
            ambient: None,
        }
    }

    pub fn with_ambient(mut self, ambient: &'a mut G) -> Self {
        self.ambient = Some(ambient);
        self
    }

    /// No pipes attached
    pub fn disconnected() -> Self {
        Self {
            inlet: None,
            outlet: None,
            ambient: None,
        }
    }
}

/// Operator input for all control rods at once
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RodAdjustment {
    /// Must lie in 0..=2
    Absolute(f32),
    /// Result is clamped to 0..=2
    Delta(f32),
}

/// Why a tick did nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingInlet,
    MissingOutlet,
    InvalidTimestep,
}

/// Bookkeeping from one processed tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    /// Neutrons in the grid after the commit
    pub neutrons: usize,
    /// Neutrons that left the grid this tick
    pub leaked: u32,
    /// Reaction energy deposited in parts
    pub energy_delta: f32,
    pub parts_melted: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickStatus {
    /// The reactor melted down earlier; nothing left to simulate
    Inert,
    /// Gas desync or bad input; state untouched
    Skipped(SkipReason),
    Processed(TickSummary),
    /// This tick pushed the casing past the meltdown temperature
    MeltedDown {
        summary: TickSummary,
        report: MeltdownReport,
    },
}

/// Log a refused command and hand the error back
fn rejected<T>(err: CommandError) -> Result<T, CommandError> {
    log::debug!("Reactor command rejected: {}", err);
    Err(err)
}

/// One reactor: its grid, casing and aggregate state
pub struct Reactor<G, R> {
    config: ReactorConfig,
    materials: Materials,
    grid: ReactorGrid<G>,
    rng: R,

    casing_temperature: f32,
    air_contents: G,

    radiation_level: f32,
    thermal_power: f32,
    control_rod_set: f32,
    avg_control_rod_insertion: f32,
    alarm_raised: bool,
    melted: bool,
    ticks: u64,
}

impl<G: GasVolume, R: ReactorRng> Reactor<G, R> {
    /// Empty reactor. `air_contents` is the casing's own gas volume.
    pub fn new(
        width: usize,
        height: usize,
        config: ReactorConfig,
        air_contents: G,
        rng: R,
    ) -> Self {
        Self {
            casing_temperature: config.casing_initial_temperature,
            config,
            materials: Materials::new(),
            grid: ReactorGrid::new(width, height),
            rng,
            air_contents,
            radiation_level: 0.0,
            thermal_power: 0.0,
            control_rod_set: DEFAULT_INSERTION,
            avg_control_rod_insertion: 0.0,
            alarm_raised: false,
            melted: false,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    pub fn grid(&self) -> &ReactorGrid<G> {
        &self.grid
    }

    /// Direct access for hosts and tests that set up unusual states
    pub fn grid_mut(&mut self) -> &mut ReactorGrid<G> {
        &mut self.grid
    }

    pub fn radiation_level(&self) -> f32 {
        self.radiation_level
    }

    pub fn thermal_power(&self) -> f32 {
        self.thermal_power
    }

    pub fn control_rod_set(&self) -> f32 {
        self.control_rod_set
    }

    pub fn avg_control_rod_insertion(&self) -> f32 {
        self.avg_control_rod_insertion
    }

    pub fn casing_temperature(&self) -> f32 {
        self.casing_temperature
    }

    pub fn set_casing_temperature(&mut self, temperature: f32) {
        self.casing_temperature = guard_temperature(temperature, "casing temperature override");
    }

    pub fn air_contents(&self) -> &G {
        &self.air_contents
    }

    pub fn is_alarm_raised(&self) -> bool {
        self.alarm_raised
    }

    pub fn is_melted(&self) -> bool {
        self.melted
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> ReactorSnapshot {
        ReactorSnapshot::capture(self)
    }

    fn casing_conductivity(&self) -> f32 {
        self.materials
            .properties(self.config.casing_material)
            .thermal_conductivity
    }

    /// Place a neutron by hand. Returns false outside the grid or after meltdown.
    pub fn inject_neutron(&mut self, position: IVec2, neutron: Neutron) -> bool {
        !self.melted && self.grid.add_neutron(position, neutron)
    }

    /// Run one simulation step of `dt` seconds
    pub fn tick(
        &mut self,
        dt: f32,
        ports: GasPorts<'_, G>,
        effects: &mut dyn ReactorEffects,
        stats: &mut dyn ReactorStats,
    ) -> TickStatus {
        if self.melted {
            return TickStatus::Inert;
        }

        let GasPorts {
            inlet,
            outlet,
            ambient,
        } = ports;
        let Some(inlet) = inlet else {
            log::debug!("Reactor tick skipped: no inlet");
            return TickStatus::Skipped(SkipReason::MissingInlet);
        };
        let Some(outlet) = outlet else {
            log::debug!("Reactor tick skipped: no outlet");
            return TickStatus::Skipped(SkipReason::MissingOutlet);
        };
        if dt.is_nan() || dt <= 0.0 {
            log::debug!("Reactor tick skipped: timestep {}", dt);
            return TickStatus::Skipped(SkipReason::InvalidTimestep);
        }

        self.ticks += 1;
        self.route_intake(inlet);

        let mut casing = ThermalBody::new(
            self.casing_temperature,
            self.config.casing_thermal_mass,
            Some(self.casing_conductivity()),
        );
        let summary = self.process_cells(&mut casing, stats);

        // Leaked neutrons are absorbed by the casing
        if summary.leaked > 0 {
            stats.record_neutrons_leaked(summary.leaked);
            if casing.thermal_mass > 0.0 {
                let heat = summary.leaked as f32 * self.config.leaked_neutron_energy;
                casing.temperature = guard_temperature(
                    casing.temperature + heat / casing.thermal_mass,
                    "leaked neutron heating",
                );
            }
        }
        heat::exchange_with_gas(
            &mut casing,
            &mut self.air_contents,
            self.config.casing_gas_cross_section,
        );
        self.casing_temperature = casing.temperature;

        self.radiation_level = summary.leaked as f32 * self.config.radiation_per_leaked_neutron;
        let precision = self.config.thermal_power_precision.max(1) as f32;
        self.thermal_power += (summary.energy_delta / dt - self.thermal_power) / precision;
        self.update_control_rod_average();
        self.update_alarm(effects);

        if self.casing_temperature > self.config.meltdown_temperature {
            if let Some(report) = self.trigger_meltdown(ambient, effects) {
                return TickStatus::MeltedDown { summary, report };
            }
        }

        self.vent(outlet);
        TickStatus::Processed(summary)
    }

    /// Split the intake between the gas channels and the casing air
    fn route_intake(&mut self, inlet: &mut G) {
        let mut intake = inlet.remove_volume(self.config.intake_volume);
        for part in self.grid.parts_mut().filter(|p| p.has_gas_channel()) {
            let share = intake.remove_volume(part.gas_volume);
            match part.gas_contents.as_mut() {
                Some(gas) => gas.merge(share),
                None => part.gas_contents = Some(share),
            }
        }
        self.air_contents.merge(intake);
    }

    /// Every cell in raster order, then the flux commit
    fn process_cells(
        &mut self,
        casing: &mut ThermalBody,
        stats: &mut dyn ReactorStats,
    ) -> TickSummary {
        let current = self.grid.take_flux();
        let mut next = vec![NeutronList::new(); current.len()];
        let mut summary = TickSummary::default();

        for (index, resident) in current.iter().enumerate() {
            let outgoing = if self.grid.part_at(index).is_some() {
                HeatDiffusion::diffuse_part(&mut self.grid, index, casing);
                match self.grid.part_at_mut(index) {
                    Some(part) => {
                        if part.apply_overheat_damage(&mut self.rng) {
                            stats.record_part_melted();
                            summary.parts_melted += 1;
                        }
                        let outcome = NeutronTransport::process_part(
                            part,
                            resident,
                            &self.config,
                            &mut self.rng,
                            stats,
                        );
                        summary.energy_delta += outcome.energy_delta;
                        outcome.neutrons
                    }
                    None => resident.clone(),
                }
            } else {
                // Empty cells are transparent
                resident.clone()
            };

            let origin = self.grid.position_of(index);
            for neutron in outgoing {
                match self.grid.index_of(origin + neutron.direction.step()) {
                    Some(destination) => next[destination].push(neutron),
                    None => summary.leaked += 1,
                }
            }
        }

        self.grid.commit_flux(next);
        summary.neutrons = self.grid.total_neutrons();
        summary
    }

    /// Channel gas and a slice of casing air go to the outlet
    fn vent(&mut self, outlet: &mut G) {
        for part in self.grid.parts_mut() {
            if let Some(gas) = part.gas_contents.take() {
                outlet.merge(gas);
            }
        }
        let exhaust = self.air_contents.remove_volume(self.config.vent_volume);
        outlet.merge(exhaust);
    }

    fn update_control_rod_average(&mut self) {
        let (sum, count) = self
            .grid
            .parts()
            .filter(|(_, part)| part.is_active_control_rod())
            .fold((0.0, 0u32), |(sum, count), (_, part)| {
                (sum + part.neutron_cross_section, count + 1)
            });
        self.avg_control_rod_insertion = if count > 0 { sum / count as f32 } else { 0.0 };
    }

    fn update_alarm(&mut self, effects: &mut dyn ReactorEffects) {
        let threshold = self.config.warning_temperature;
        if !self.alarm_raised && self.casing_temperature > threshold {
            self.alarm_raised = true;
            log::warn!(
                "Reactor casing overheating: {:.0} K (warning at {:.0} K)",
                self.casing_temperature,
                threshold
            );
            effects.announce(&format!(
                "Warning: reactor casing temperature at {:.0} K.",
                self.casing_temperature
            ));
            effects.play_audio(AudioCue::OverheatAlarm);
        } else if self.alarm_raised && self.casing_temperature < threshold * ALARM_RESET_FRACTION {
            self.alarm_raised = false;
            log::info!(
                "Reactor casing cooled to {:.0} K, alarm cleared",
                self.casing_temperature
            );
        }
    }

    /// Melt the whole reactor down. Does nothing if it already has.
    pub fn trigger_meltdown(
        &mut self,
        ambient: Option<&mut G>,
        effects: &mut dyn ReactorEffects,
    ) -> Option<MeltdownReport> {
        if self.melted {
            return None;
        }
        self.melted = true;

        let report = meltdown::run_meltdown(
            &mut self.grid,
            &mut self.air_contents,
            ambient,
            &self.config,
            &mut self.rng,
            effects,
        );
        self.thermal_power = 0.0;
        self.avg_control_rod_insertion = 0.0;
        Some(report)
    }

    /// Set the target for every working control rod
    pub fn set_control_rod_target(
        &mut self,
        adjustment: RodAdjustment,
    ) -> Result<f32, CommandError> {
        if self.melted {
            return rejected(CommandError::ReactorMelted);
        }

        let target = match adjustment {
            RodAdjustment::Absolute(level) => {
                control_rod::validate_insertion(level).or_else(rejected)?
            }
            RodAdjustment::Delta(delta) if delta.is_finite() => {
                (self.control_rod_set + delta).clamp(MIN_INSERTION, MAX_INSERTION)
            }
            RodAdjustment::Delta(delta) => {
                return rejected(CommandError::InsertionOutOfRange(delta));
            }
        };

        self.control_rod_set = target;
        for part in self.grid.parts_mut().filter(|p| p.is_active_control_rod()) {
            part.configured_insertion_level = target;
        }
        Ok(target)
    }

    /// Set the target of a single rod
    pub fn set_rod_target_at(&mut self, position: IVec2, level: f32) -> Result<(), CommandError> {
        if self.melted {
            return rejected(CommandError::ReactorMelted);
        }
        let level = control_rod::validate_insertion(level).or_else(rejected)?;

        let (x, y) = (position.x, position.y);
        if !self.grid.contains(position) {
            return rejected(CommandError::OutOfBounds { x, y });
        }
        let Some(part) = self.grid.part_mut(position) else {
            return rejected(CommandError::EmptySlot { x, y });
        };
        if part.melted {
            return rejected(CommandError::PartMelted { x, y });
        }
        if !part.is_control_rod() {
            return rejected(CommandError::NotAControlRod { x, y });
        }

        part.configured_insertion_level = level;
        Ok(())
    }

    /// Replace whatever sits at `position`. `None` removes the part.
    /// Returns the part that was there.
    pub fn swap_part(
        &mut self,
        position: IVec2,
        part: Option<ReactorPart<G>>,
    ) -> Result<Option<ReactorPart<G>>, CommandError> {
        let index = self.command_slot(position)?;
        let (x, y) = (position.x, position.y);

        match self.grid.part_at(index) {
            Some(existing) if existing.melted => {
                return rejected(CommandError::PartMelted { x, y })
            }
            None if part.is_none() => return rejected(CommandError::EmptySlot { x, y }),
            _ => {}
        }

        let part = part.map(|p| self.adopt(p));
        let previous = self.grid.replace_at(index, part);
        self.update_control_rod_average();
        log::debug!("Swapped reactor part at ({}, {})", x, y);
        Ok(previous)
    }

    /// Put a part into an empty slot
    pub fn insert_part(
        &mut self,
        position: IVec2,
        part: ReactorPart<G>,
    ) -> Result<(), CommandError> {
        let index = self.command_slot(position)?;
        if self.grid.part_at(index).is_some() {
            return rejected(CommandError::SlotOccupied {
                x: position.x,
                y: position.y,
            });
        }

        let part = self.adopt(part);
        self.grid.replace_at(index, Some(part));
        self.update_control_rod_average();
        Ok(())
    }

    /// Rebuild a melted part from its prefab.
    /// Returns false if the part was intact or the factory could not build it.
    pub fn repair_part<F: GridCellFactory<G>>(
        &mut self,
        position: IVec2,
        factory: &mut F,
    ) -> Result<bool, CommandError> {
        let index = self.command_slot(position)?;
        let Some(existing) = self.grid.part_at(index) else {
            return rejected(CommandError::EmptySlot {
                x: position.x,
                y: position.y,
            });
        };
        if !existing.melted {
            return Ok(false);
        }

        let prefab = existing.prefab.clone();
        let Some(fresh) = factory.create(position, &prefab) else {
            return Ok(false);
        };
        let fresh = self.adopt(fresh);
        if let Some(slag) = self.grid.replace_at(index, Some(fresh)) {
            factory.destroy(position, slag);
        }
        self.update_control_rod_average();
        log::info!("Repaired {} at ({}, {})", prefab, position.x, position.y);
        Ok(true)
    }

    /// Slot index for an operator command, refusing melted reactors and bad positions
    fn command_slot(&self, position: IVec2) -> Result<usize, CommandError> {
        if self.melted {
            return rejected(CommandError::ReactorMelted);
        }
        match self.grid.index_of(position) {
            Some(index) => Ok(index),
            None => rejected(CommandError::OutOfBounds {
                x: position.x,
                y: position.y,
            }),
        }
    }

    /// New rods follow the operator's current setting
    fn adopt(&self, mut part: ReactorPart<G>) -> ReactorPart<G> {
        if part.is_control_rod() {
            part.configured_insertion_level = self.control_rod_set;
        }
        part
    }

    fn check_layout_dimensions(&self, layout: &Layout) -> Result<(), LayoutError> {
        if layout.width != self.grid.width() || layout.height != self.grid.height() {
            return Err(LayoutError::DimensionMismatch {
                layout_width: layout.width,
                layout_height: layout.height,
                grid_width: self.grid.width(),
                grid_height: self.grid.height(),
            });
        }
        Ok(())
    }

    /// Every cell of `layout` built through `factory`, or nothing.
    /// On failure the cells built so far go back to the factory.
    fn build_cells<F: GridCellFactory<G>>(
        &self,
        layout: &Layout,
        factory: &mut F,
    ) -> Result<Vec<(usize, IVec2, ReactorPart<G>)>, LayoutError> {
        self.check_layout_dimensions(layout)?;

        let mut built = Vec::with_capacity(layout.cells.len());
        for cell in &layout.cells {
            let position = IVec2::new(cell.x, cell.y);
            let entry = match self.grid.index_of(position) {
                None => Err(LayoutError::OutOfBounds {
                    x: cell.x,
                    y: cell.y,
                }),
                Some(index) => factory
                    .create(position, &cell.prefab)
                    .map(|part| (index, position, part))
                    .ok_or_else(|| LayoutError::UnknownPrefab(cell.prefab.clone())),
            };
            match entry {
                Ok(entry) => built.push(entry),
                Err(err) => {
                    for (_, position, part) in built {
                        factory.destroy(position, part);
                    }
                    return Err(err);
                }
            }
        }
        Ok(built)
    }

    fn place_cells<F: GridCellFactory<G>>(
        &mut self,
        built: Vec<(usize, IVec2, ReactorPart<G>)>,
        factory: &mut F,
    ) -> usize {
        let placed = built.len();
        for (index, position, part) in built {
            let part = self.adopt(part);
            if let Some(previous) = self.grid.replace_at(index, Some(part)) {
                factory.destroy(position, previous);
            }
        }
        self.update_control_rod_average();

        log::info!(
            "Applied reactor layout: {} parts on a {}x{} grid",
            placed,
            self.grid.width(),
            self.grid.height()
        );
        placed
    }

    /// Build every cell of `layout` through `factory`.
    ///
    /// Either every cell is placed or none is. Parts displaced from occupied
    /// slots go back to the factory. Returns the number of parts placed.
    pub fn apply_layout<F: GridCellFactory<G>>(
        &mut self,
        layout: &Layout,
        factory: &mut F,
    ) -> Result<usize, LayoutError> {
        if self.melted {
            return Err(LayoutError::ReactorMelted);
        }
        let built = self.build_cells(layout, factory)?;
        Ok(self.place_cells(built, factory))
    }

    /// Explicit external reset: clear the grid, restore aggregate state and
    /// build `layout`. The only way back from a meltdown.
    ///
    /// The layout is built before anything is cleared, so a failed reset
    /// leaves the reactor as it was.
    pub fn reset<F: GridCellFactory<G>>(
        &mut self,
        layout: &Layout,
        factory: &mut F,
    ) -> Result<usize, LayoutError> {
        let built = self.build_cells(layout, factory)?;

        for (position, part) in self.grid.clear() {
            factory.destroy(position, part);
        }
        let volume = self.air_contents.volume();
        self.air_contents.remove_volume(volume);
        self.air_contents
            .set_temperature(self.config.casing_initial_temperature);

        self.melted = false;
        self.ticks = 0;
        self.casing_temperature = self.config.casing_initial_temperature;
        self.radiation_level = 0.0;
        self.thermal_power = 0.0;
        self.control_rod_set = DEFAULT_INSERTION;
        self.avg_control_rod_insertion = 0.0;
        self.alarm_raised = false;
        log::info!("Reactor reset");

        Ok(self.place_cells(built, factory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PrefabFactory;
    use crate::meltdown::{EffectLog, EffectRequest, NoopEffects};
    use crate::neutron::Compass;
    use crate::stats::NoopStats;
    use fission_simulation::{Gas, GasMixture, PartId};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    type TestReactor = Reactor<GasMixture, Xoshiro256StarStar>;

    fn reactor(width: usize, height: usize) -> TestReactor {
        Reactor::new(
            width,
            height,
            ReactorConfig::default(),
            GasMixture::new(1000.0, 293.15),
            Xoshiro256StarStar::seed_from_u64(42),
        )
    }

    fn build(reactor: &mut TestReactor, layout: Layout) {
        reactor
            .apply_layout(&layout, &mut PrefabFactory::default())
            .expect("layout applies");
    }

    fn pipes() -> (GasMixture, GasMixture) {
        (
            GasMixture::new(2000.0, 293.15).with_moles(Gas::Nitrogen, 100.0),
            GasMixture::new(2000.0, 293.15),
        )
    }

    #[test]
    fn test_missing_pipes_skip_tick() {
        let mut r = reactor(2, 2);
        build(
            &mut r,
            Layout::new(2, 2).with(0, 0, PartId::FUEL_ROD_URANIUM),
        );
        let before = r.grid().part(IVec2::ZERO).map(|p| p.temperature);

        let status = r.tick(
            0.5,
            GasPorts::disconnected(),
            &mut NoopEffects,
            &mut NoopStats,
        );

        assert_eq!(status, TickStatus::Skipped(SkipReason::MissingInlet));
        assert_eq!(r.ticks(), 0);
        assert_eq!(r.grid().part(IVec2::ZERO).map(|p| p.temperature), before);

        let mut inlet = GasMixture::new(100.0, 300.0);
        let ports = GasPorts {
            inlet: Some(&mut inlet),
            outlet: None,
            ambient: None,
        };
        let status = r.tick(0.5, ports, &mut NoopEffects, &mut NoopStats);
        assert_eq!(status, TickStatus::Skipped(SkipReason::MissingOutlet));
        assert_eq!(inlet.volume(), 100.0);
    }

    #[test]
    fn test_zero_timestep_is_skipped() {
        let mut r = reactor(1, 1);
        let (mut inlet, mut outlet) = pipes();
        let status = r.tick(
            0.0,
            GasPorts::new(&mut inlet, &mut outlet),
            &mut NoopEffects,
            &mut NoopStats,
        );
        assert_eq!(status, TickStatus::Skipped(SkipReason::InvalidTimestep));
    }

    #[test]
    fn test_gas_flows_inlet_to_outlet() {
        let mut r = reactor(1, 1);
        build(&mut r, Layout::new(1, 1).with(0, 0, PartId::GAS_CHANNEL));
        let (mut inlet, mut outlet) = pipes();

        let status = r.tick(
            0.5,
            GasPorts::new(&mut inlet, &mut outlet),
            &mut NoopEffects,
            &mut NoopStats,
        );

        assert!(matches!(status, TickStatus::Processed(_)));
        // 200 of 2000 liters pulled
        assert!((inlet.moles(Gas::Nitrogen) - 90.0).abs() < 1e-3);
        // Channel share plus a casing vent made it through
        assert!(outlet.moles(Gas::Nitrogen) > 0.0);
        let total = inlet.moles(Gas::Nitrogen)
            + outlet.moles(Gas::Nitrogen)
            + r.air_contents().moles(Gas::Nitrogen);
        assert!((total - 100.0).abs() < 1e-3);
        // Channels never hold gas between ticks
        let channel = r.grid().part(IVec2::ZERO).expect("channel in place");
        assert!(channel.gas_contents.is_none());
    }

    #[test]
    fn test_neutrons_leaving_grid_raise_radiation() {
        let mut r = reactor(2, 1);
        let eastward = Neutron::new(Compass::EAST, 3);
        assert!(r.inject_neutron(IVec2::new(1, 0), eastward));
        assert!(r.inject_neutron(IVec2::new(0, 0), eastward));
        let casing_before = r.casing_temperature();
        let (mut inlet, mut outlet) = pipes();

        let status = r.tick(
            0.5,
            GasPorts::new(&mut inlet, &mut outlet),
            &mut NoopEffects,
            &mut NoopStats,
        );

        let TickStatus::Processed(summary) = status else {
            panic!("expected a processed tick, got {status:?}");
        };
        assert_eq!(summary.leaked, 1);
        assert_eq!(summary.neutrons, 1);
        assert_eq!(r.grid().neutrons_at(IVec2::new(1, 0)).len(), 1);
        assert_eq!(r.radiation_level(), 1.0);
        assert!(r.casing_temperature() > casing_before);
    }

    #[test]
    fn test_rod_target_commands() {
        let mut r = reactor(3, 1);
        build(
            &mut r,
            Layout::new(3, 1)
                .with(0, 0, PartId::CONTROL_ROD)
                .with(1, 0, PartId::FUEL_ROD_URANIUM)
                .with(2, 0, PartId::CONTROL_ROD),
        );

        assert_eq!(
            r.set_control_rod_target(RodAdjustment::Absolute(2.0)),
            Ok(2.0)
        );
        assert_eq!(r.set_control_rod_target(RodAdjustment::Delta(0.5)), Ok(2.0));
        assert_eq!(
            r.set_control_rod_target(RodAdjustment::Delta(-0.75)),
            Ok(1.25)
        );
        assert_eq!(
            r.set_control_rod_target(RodAdjustment::Absolute(3.0)),
            Err(CommandError::InsertionOutOfRange(3.0))
        );
        // Rejected command changed nothing
        assert_eq!(r.control_rod_set(), 1.25);
        assert_eq!(
            r.grid()
                .part(IVec2::new(2, 0))
                .map(|p| p.configured_insertion_level),
            Some(1.25)
        );

        assert_eq!(r.set_rod_target_at(IVec2::new(0, 0), 0.0), Ok(()));
        assert_eq!(
            r.set_rod_target_at(IVec2::new(1, 0), 0.0),
            Err(CommandError::NotAControlRod { x: 1, y: 0 })
        );
        assert_eq!(
            r.set_rod_target_at(IVec2::new(5, 0), 0.0),
            Err(CommandError::OutOfBounds { x: 5, y: 0 })
        );
    }

    #[test]
    fn test_swap_and_insert() {
        let mut r = reactor(2, 1);
        let mut factory = PrefabFactory::default();
        let rod: ReactorPart<GasMixture> = factory
            .create(IVec2::ZERO, PartId::CONTROL_ROD)
            .expect("rod prefab");
        r.set_control_rod_target(RodAdjustment::Absolute(0.5))
            .expect("valid target");

        assert_eq!(r.insert_part(IVec2::ZERO, rod.clone()), Ok(()));
        assert_eq!(
            r.grid()
                .part(IVec2::ZERO)
                .map(|p| p.configured_insertion_level),
            Some(0.5)
        );
        assert_eq!(
            r.insert_part(IVec2::ZERO, rod),
            Err(CommandError::SlotOccupied { x: 0, y: 0 })
        );

        let removed = r.swap_part(IVec2::ZERO, None).expect("swap out");
        assert!(removed.is_some());
        assert_eq!(
            r.swap_part(IVec2::ZERO, None).err(),
            Some(CommandError::EmptySlot { x: 0, y: 0 })
        );
    }

    #[test]
    fn test_melted_part_needs_repair() {
        let mut r = reactor(1, 1);
        build(
            &mut r,
            Layout::new(1, 1).with(0, 0, PartId::FUEL_ROD_URANIUM),
        );
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        if let Some(part) = r.grid_mut().part_mut(IVec2::ZERO) {
            part.melt(&mut rng);
        }

        assert_eq!(
            r.swap_part(IVec2::ZERO, None).err(),
            Some(CommandError::PartMelted { x: 0, y: 0 })
        );

        let mut factory = PrefabFactory::default();
        assert_eq!(r.repair_part(IVec2::ZERO, &mut factory), Ok(true));
        let part = r.grid().part(IVec2::ZERO).expect("repaired part");
        assert!(!part.melted);
        assert_eq!(part.icon, "fuel_rod");
        assert_eq!(r.repair_part(IVec2::ZERO, &mut factory), Ok(false));
    }

    #[test]
    fn test_layout_is_all_or_nothing() {
        let mut r = reactor(2, 2);
        let layout = Layout::new(2, 2)
            .with(0, 0, PartId::MODERATOR)
            .with(1, 1, "banana");
        let err = r
            .apply_layout(&layout, &mut PrefabFactory::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownPrefab(ref id) if id == "banana"));
        assert!(r.grid().is_empty());

        let err = r
            .apply_layout(&Layout::new(3, 2), &mut PrefabFactory::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::DimensionMismatch { .. }));

        let err = r
            .apply_layout(
                &Layout::new(2, 2).with(2, 0, PartId::MODERATOR),
                &mut PrefabFactory::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::OutOfBounds { x: 2, y: 0 }));
    }

    #[test]
    fn test_overheat_alarm_hysteresis() {
        let mut r = reactor(1, 1);
        let mut effects = EffectLog::default();
        let warn = r.config().warning_temperature;

        r.set_casing_temperature(warn + 10.0);
        r.update_alarm(&mut effects);
        r.update_alarm(&mut effects);
        assert!(r.is_alarm_raised());
        assert_eq!(effects.announcements().count(), 1);
        assert!(effects
            .requests
            .contains(&EffectRequest::Audio(AudioCue::OverheatAlarm)));

        // Just under the threshold is not enough to re-arm
        r.set_casing_temperature(warn - 1.0);
        r.update_alarm(&mut effects);
        assert!(r.is_alarm_raised());

        r.set_casing_temperature(warn * 0.9);
        r.update_alarm(&mut effects);
        assert!(!r.is_alarm_raised());

        r.set_casing_temperature(warn + 10.0);
        r.update_alarm(&mut effects);
        assert_eq!(effects.announcements().count(), 2);
    }

    #[test]
    fn test_commands_refused_after_meltdown() {
        let mut r = reactor(2, 2);
        build(&mut r, Layout::filled(2, 2, PartId::CONTROL_ROD));

        assert!(r.trigger_meltdown(None, &mut NoopEffects).is_some());
        assert!(r.is_melted());
        assert!(r.trigger_meltdown(None, &mut NoopEffects).is_none());

        assert_eq!(
            r.set_control_rod_target(RodAdjustment::Absolute(1.0)),
            Err(CommandError::ReactorMelted)
        );
        assert_eq!(
            r.swap_part(IVec2::ZERO, None).err(),
            Some(CommandError::ReactorMelted)
        );
        let neutron = Neutron::new(Compass::NORTH, 1);
        assert!(!r.inject_neutron(IVec2::ZERO, neutron));
        assert!(matches!(
            r.apply_layout(&Layout::new(2, 2), &mut PrefabFactory::default()),
            Err(LayoutError::ReactorMelted)
        ));

        let (mut inlet, mut outlet) = pipes();
        let status = r.tick(
            0.5,
            GasPorts::new(&mut inlet, &mut outlet),
            &mut NoopEffects,
            &mut NoopStats,
        );
        assert_eq!(status, TickStatus::Inert);
    }

    #[test]
    fn test_reset_restores_reactor() {
        let mut r = reactor(2, 2);
        let layout = Layout::filled(2, 2, PartId::MODERATOR);
        build(&mut r, layout.clone());
        r.trigger_meltdown(None, &mut NoopEffects);

        let placed = r
            .reset(&layout, &mut PrefabFactory::default())
            .expect("reset applies");

        assert_eq!(placed, 4);
        assert!(!r.is_melted());
        assert_eq!(r.grid().occupied_count(), 4);
        assert_eq!(
            r.casing_temperature(),
            r.config().casing_initial_temperature
        );
    }

    #[test]
    fn test_failed_reset_changes_nothing() {
        let mut r = reactor(2, 1);
        build(&mut r, Layout::filled(2, 1, PartId::MODERATOR));

        let err = r
            .reset(
                &Layout::new(2, 1).with(0, 0, "banana"),
                &mut PrefabFactory::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownPrefab(ref id) if id == "banana"));
        assert_eq!(r.grid().occupied_count(), 2);

        r.trigger_meltdown(None, &mut NoopEffects);
        let err = r
            .reset(&Layout::new(3, 1), &mut PrefabFactory::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::DimensionMismatch { .. }));
        assert!(r.is_melted());
    }

    #[test]
    fn test_snapshot_reports_parts() {
        let mut r = reactor(2, 1);
        build(
            &mut r,
            Layout::new(2, 1).with(1, 0, PartId::FUEL_ROD_PLUTONIUM),
        );
        r.inject_neutron(IVec2::new(1, 0), Neutron::new(Compass::WEST, 2));

        let snapshot = r.snapshot();

        assert_eq!((snapshot.width, snapshot.height), (2, 1));
        assert_eq!(snapshot.parts.len(), 1);
        let part = snapshot.part_at(IVec2::new(1, 0)).expect("part snapshot");
        assert_eq!(part.neutron_count, 1);
        assert_eq!(part.name, "plutonium fuel rod");
        assert!(!snapshot.melted);
    }
}
