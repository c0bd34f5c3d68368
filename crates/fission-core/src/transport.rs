//! Neutron transport - per-part interaction rolls
//!
//! For each resident neutron one interaction roll decides whether the part
//! notices it at all. A hit then tries, in order:
//! 1. low-energy stimulated emission (velocity <= 1, `neutron_radioactivity`)
//! 2. mid-energy stimulated emission (velocity <= 5, `radioactivity`)
//! 3. reflection off hard material, rod absorption or slowing down
//!
//! Movement between cells is not handled here; the coordinator schedules
//! the survivors after every part has been processed.

use fission_simulation::{GasVolume, MaterialProperties};

use crate::config::ReactorConfig;
use crate::control_rod;
use crate::gas_reactions::GasReactions;
use crate::heat::guard_temperature;
use crate::neutron::{Neutron, NeutronList};
use crate::part::ReactorPart;
use crate::rng_trait::ReactorRng;
use crate::stats::ReactorStats;

/// Kelvin added per low-energy stimulated emission (times the heating factor)
pub const LOW_ENERGY_EMISSION_HEAT: f32 = 50.0;
/// Kelvin added per mid-energy stimulated emission
pub const MID_ENERGY_EMISSION_HEAT: f32 = 25.0;
/// Kelvin added per spontaneous `neutron_radioactivity` emission
pub const SPONTANEOUS_NEUTRON_HEAT: f32 = 20.0;
/// Kelvin added per spontaneous `radioactivity` emission
pub const SPONTANEOUS_DECAY_HEAT: f32 = 10.0;
/// Kelvin added whenever a neutron scatters or is absorbed
pub const SCATTER_HEAT: f32 = 1.0;

pub const LOW_ENERGY_MAX_VELOCITY: u32 = 1;
pub const MID_ENERGY_MAX_VELOCITY: u32 = 5;
/// Slowest neutron that can drive gas reactions
pub const GAS_COUPLING_MIN_VELOCITY: u32 = 3;

/// What happened inside one part this tick
#[derive(Clone, Debug, Default)]
pub struct TransportOutcome {
    /// Neutrons leaving the part, ready to be moved
    pub neutrons: NeutronList,
    /// Energy the part gained during transport, `ΔT × thermal_mass`
    pub energy_delta: f32,
}

/// Which property pair an emission converts
#[derive(Clone, Copy)]
enum Conversion {
    /// `neutron_radioactivity` -> `radioactivity`
    NeutronToRadioactivity,
    /// `radioactivity` -> `fissile_isotopes`
    RadioactivityToFissile,
}

impl Conversion {
    /// Consume up to `reactant`, produce `product` in proportion
    fn apply(self, props: &mut MaterialProperties, reactant: f32, product: f32) {
        let (source, target) = match self {
            Conversion::NeutronToRadioactivity => {
                (&mut props.neutron_radioactivity, &mut props.radioactivity)
            }
            Conversion::RadioactivityToFissile => {
                (&mut props.radioactivity, &mut props.fissile_isotopes)
            }
        };

        if reactant <= 0.0 {
            return;
        }
        let consumed = reactant.min(*source).max(0.0);
        *source -= consumed;
        *target += product * consumed / reactant;
    }
}

/// Neutron interaction within single parts
pub struct NeutronTransport;

impl NeutronTransport {
    /// Run every neutron interaction for one part, then its spontaneous
    /// emission, gas reactions and rod relaxation.
    pub fn process_part<G: GasVolume, R: ReactorRng>(
        part: &mut ReactorPart<G>,
        incoming: &[Neutron],
        config: &ReactorConfig,
        rng: &mut R,
        stats: &mut dyn ReactorStats,
    ) -> TransportOutcome {
        let initial_temperature = part.temperature;
        let mut survivors = NeutronList::new();
        let mut heat = 0.0;

        let interaction_chance =
            config.interaction_chance(part.properties.density, part.neutron_cross_section);

        for &source in incoming {
            if !rng.prob(interaction_chance) {
                survivors.push(source);
                continue;
            }
            heat += Self::interact(part, source, &mut survivors, config, rng, stats);
        }

        heat += Self::spontaneous_emission(part, &mut survivors, config, rng, stats);
        heat += Self::gas_coupling(part, &mut survivors, rng, stats);

        control_rod::relax(part);

        if heat != 0.0 {
            part.temperature = guard_temperature(part.temperature + heat, "neutron transport");
        }

        TransportOutcome {
            neutrons: survivors,
            energy_delta: (part.temperature - initial_temperature) * part.thermal_mass,
        }
    }

    /// One neutron that the part caught. Returns the heat released.
    fn interact<G, R: ReactorRng>(
        part: &mut ReactorPart<G>,
        mut neutron: Neutron,
        out: &mut NeutronList,
        config: &ReactorConfig,
        rng: &mut R,
        stats: &mut dyn ReactorStats,
    ) -> f32 {
        let scale = config.stimulated_chance_scale;

        if neutron.velocity <= LOW_ENERGY_MAX_VELOCITY
            && rng.prob(part.properties.neutron_radioactivity * scale)
        {
            Conversion::NeutronToRadioactivity.apply(
                &mut part.properties,
                config.neutron_reactant,
                config.neutron_product,
            );
            stats.record_neutron_absorbed();
            let spawned = Self::emit(out, rng, 1, 5, 2, 3);
            stats.record_neutrons_spawned(spawned);
            return LOW_ENERGY_EMISSION_HEAT * config.stimulated_heating_factor;
        }

        if neutron.velocity <= MID_ENERGY_MAX_VELOCITY
            && rng.prob(part.properties.radioactivity * scale)
        {
            Conversion::RadioactivityToFissile.apply(
                &mut part.properties,
                config.radioactivity_reactant,
                config.radioactivity_product,
            );
            stats.record_neutron_absorbed();
            let spawned = Self::emit(out, rng, 1, 5, 1, 3);
            stats.record_neutrons_spawned(spawned);
            return MID_ENERGY_EMISSION_HEAT * config.stimulated_heating_factor;
        }

        let reflect_chance = part.properties.hardness * config.reflection_chance_per_hardness;
        if rng.prob(reflect_chance) {
            neutron.reflect(rng);
        } else if part.is_active_control_rod() {
            neutron.velocity = 0;
        } else {
            neutron.velocity = neutron.velocity.saturating_sub(1);
        }

        if neutron.is_spent() {
            stats.record_neutron_absorbed();
        } else {
            out.push(neutron);
        }
        SCATTER_HEAT
    }

    /// Background decay, independent of the flux. Returns the heat released.
    fn spontaneous_emission<G, R: ReactorRng>(
        part: &mut ReactorPart<G>,
        out: &mut NeutronList,
        config: &ReactorConfig,
        rng: &mut R,
        stats: &mut dyn ReactorStats,
    ) -> f32 {
        let mut heat = 0.0;

        let cross_section = part.neutron_cross_section;
        if rng.prob(part.properties.neutron_radioactivity * cross_section) {
            Conversion::NeutronToRadioactivity.apply(
                &mut part.properties,
                config.neutron_reactant,
                config.neutron_product,
            );
            stats.record_neutrons_spawned(Self::emit(out, rng, 1, 3, 2, 3));
            heat += SPONTANEOUS_NEUTRON_HEAT * config.spontaneous_heating_factor;
        }

        if rng.prob(part.properties.radioactivity * cross_section) {
            Conversion::RadioactivityToFissile.apply(
                &mut part.properties,
                config.radioactivity_reactant,
                config.radioactivity_product,
            );
            stats.record_neutrons_spawned(Self::emit(out, rng, 1, 3, 1, 3));
            heat += SPONTANEOUS_DECAY_HEAT * config.spontaneous_heating_factor;
        }

        heat
    }

    /// Fast neutrons passing a gas channel drive its reactions
    fn gas_coupling<G: GasVolume, R: ReactorRng>(
        part: &mut ReactorPart<G>,
        out: &mut NeutronList,
        rng: &mut R,
        stats: &mut dyn ReactorStats,
    ) -> f32 {
        let Some(gas) = part.gas_contents.as_mut() else {
            return 0.0;
        };
        if !out.iter().any(|n| n.velocity >= GAS_COUPLING_MIN_VELOCITY) {
            return 0.0;
        }

        let outcome = GasReactions::react(gas, rng, stats);
        if outcome.neutrons > 0 {
            stats.record_neutrons_spawned(Self::emit(
                out,
                rng,
                outcome.neutrons,
                outcome.neutrons,
                2,
                3,
            ));
        }
        outcome.heat
    }

    /// Push between `min` and `max` fresh neutrons. Returns how many.
    fn emit<R: ReactorRng>(
        out: &mut NeutronList,
        rng: &mut R,
        min: u32,
        max: u32,
        min_velocity: u32,
        max_velocity: u32,
    ) -> u32 {
        let count = rng.gen_range_u32(min, max);
        for _ in 0..count {
            out.push(Neutron::random(rng, min_velocity, max_velocity));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neutron::Compass;
    use crate::stats::{CountingStats, NoopStats};
    use fission_simulation::{Gas, GasMixture, Materials, PartDefs, PartId};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn part(id: &str) -> ReactorPart<GasMixture> {
        let defs = PartDefs::new();
        let def = defs.get(id).expect("prefab exists");
        ReactorPart::from_def(def, &Materials::new(), 500.0)
    }

    /// A part that never emits on its own
    fn inert(id: &str) -> ReactorPart<GasMixture> {
        let mut p = part(id);
        p.properties.radioactivity = 0.0;
        p.properties.neutron_radioactivity = 0.0;
        p.properties.hardness = 0.0;
        p
    }

    fn process<R: ReactorRng>(
        part: &mut ReactorPart<GasMixture>,
        incoming: &[Neutron],
        rng: &mut R,
        stats: &mut dyn ReactorStats,
    ) -> TransportOutcome {
        NeutronTransport::process_part(part, incoming, &ReactorConfig::default(), rng, stats)
    }

    #[test]
    fn test_missed_roll_passes_neutron_unchanged() {
        let mut rng = StepRng::new(0, 0);
        let mut p = inert(PartId::MODERATOR);
        p.neutron_cross_section = 0.0;
        let incoming = [Neutron::new(Compass::EAST, 4)];

        let out = process(&mut p, &incoming, &mut rng, &mut NoopStats);

        assert_eq!(out.neutrons.as_slice(), &incoming);
        assert_eq!(p.temperature, 500.0);
        assert_eq!(out.energy_delta, 0.0);
    }

    #[test]
    fn test_slowing_down_costs_one_velocity() {
        let mut rng = StepRng::new(0, 0);
        let mut p = inert(PartId::MODERATOR);
        let incoming = [Neutron::new(Compass::NORTH, 4)];

        let out = process(&mut p, &incoming, &mut rng, &mut NoopStats);

        assert_eq!(out.neutrons.as_slice(), &[Neutron::new(Compass::NORTH, 3)]);
        assert_eq!(p.temperature, 500.0 + SCATTER_HEAT);
        assert_eq!(out.energy_delta, SCATTER_HEAT * p.thermal_mass);
    }

    #[test]
    fn test_active_rod_absorbs() {
        let mut rng = StepRng::new(0, 0);
        let mut stats = CountingStats::default();
        let mut rod = inert(PartId::CONTROL_ROD);
        let incoming = [
            Neutron::new(Compass::NORTH, 3),
            Neutron::new(Compass::WEST, 2),
        ];

        let out = process(&mut rod, &incoming, &mut rng, &mut stats);

        assert!(out.neutrons.is_empty());
        assert_eq!(stats.absorbed, 2);
        assert_eq!(rod.temperature, 500.0 + 2.0 * SCATTER_HEAT);
    }

    #[test]
    fn test_melted_rod_only_slows() {
        let mut rng = StepRng::new(0, 0);
        let mut rod = inert(PartId::CONTROL_ROD);
        rod.melt(&mut rng);
        let incoming = [Neutron::new(Compass::NORTH, 3)];

        let out = process(&mut rod, &incoming, &mut rng, &mut NoopStats);

        assert_eq!(out.neutrons.as_slice(), &[Neutron::new(Compass::NORTH, 2)]);
    }

    #[test]
    fn test_hard_part_reflects() {
        let mut rng = StepRng::new(0, 0);
        let mut p = inert(PartId::CONTROL_ROD);
        p.properties.hardness = 9.5;
        let incoming = [Neutron::new(Compass::NORTH, 3)];

        let out = process(&mut p, &incoming, &mut rng, &mut NoopStats);

        // Zero stream: jitter picks -1, so opposite of north rotated counter-clockwise
        assert_eq!(out.neutrons.len(), 1);
        assert_eq!(out.neutrons[0].velocity, 3);
        assert_eq!(out.neutrons[0].direction, Compass::SOUTH | Compass::EAST);
    }

    #[test]
    fn test_slow_neutron_stimulates_emission() {
        let mut rng = StepRng::new(0, 0);
        let mut stats = CountingStats::default();
        let mut fuel = part(PartId::FUEL_ROD_URANIUM);
        let config = ReactorConfig::default();
        let nrad_before = fuel.properties.neutron_radioactivity;
        let rad_before = fuel.properties.radioactivity;
        let incoming = [Neutron::new(Compass::SOUTH, 1)];

        let out =
            NeutronTransport::process_part(&mut fuel, &incoming, &config, &mut rng, &mut stats);

        // Zero stream: one stimulated burst of 1, plus one spontaneous of each kind
        assert!(!out.neutrons.contains(&incoming[0]));
        assert_eq!(stats.spawned, out.neutrons.len() as u64);
        assert!(out.neutrons.iter().all(|n| (1..=3).contains(&n.velocity)));
        assert!(fuel.properties.neutron_radioactivity < nrad_before);
        let rad_floor = rad_before - config.radioactivity_reactant;
        assert!(fuel.properties.radioactivity > rad_floor);
        let expected_heat =
            LOW_ENERGY_EMISSION_HEAT + SPONTANEOUS_NEUTRON_HEAT + SPONTANEOUS_DECAY_HEAT;
        assert!((fuel.temperature - (500.0 + expected_heat)).abs() < 1e-3);
    }

    #[test]
    fn test_stimulated_emission_neutron_count_in_range() {
        let config = ReactorConfig::default();
        for seed in 0..50 {
            let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
            let mut stats = CountingStats::default();
            let mut fuel = part(PartId::FUEL_ROD_URANIUM);
            let mut out = NeutronList::new();

            NeutronTransport::interact(
                &mut fuel,
                Neutron::new(Compass::EAST, 1),
                &mut out,
                &config,
                &mut rng,
                &mut stats,
            );

            // Either an emission (source captured, 1-5 new) or a scatter
            if stats.spawned > 0 {
                assert!((1..=5).contains(&out.len()));
                assert_eq!(stats.spawned, out.len() as u64);
                assert_eq!(stats.absorbed, 1);
            } else {
                assert!(out.len() <= 1);
                assert_eq!(out.len() as u64 + stats.absorbed, 1);
            }
        }
    }

    #[test]
    fn test_conversion_never_goes_negative() {
        let mut props = MaterialProperties {
            neutron_radioactivity: 0.004,
            ..Default::default()
        };
        Conversion::NeutronToRadioactivity.apply(&mut props, 0.01, 0.005);
        assert_eq!(props.neutron_radioactivity, 0.0);
        assert!((props.radioactivity - 0.002).abs() < 1e-6);
    }

    #[test]
    fn test_gas_coupling_needs_fast_neutron() {
        let mut rng = StepRng::new(0, 0);
        let mut channel = inert(PartId::GAS_CHANNEL);
        channel.neutron_cross_section = 0.0;
        channel.gas_contents = Some(GasMixture::new(100.0, 300.0).with_moles(Gas::Tritium, 10.0));

        let slow = [Neutron::new(Compass::EAST, 2)];
        process(&mut channel, &slow, &mut rng, &mut NoopStats);
        assert_eq!(
            channel.gas_contents.as_ref().map(|g| g.moles(Gas::Tritium)),
            Some(10.0)
        );
    }

    #[test]
    fn test_plasma_channel_breeds_neutrons() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(8);
        let mut stats = CountingStats::default();
        let mut channel = inert(PartId::GAS_CHANNEL);
        channel.neutron_cross_section = 0.0;
        channel.gas_contents = Some(GasMixture::new(100.0, 300.0).with_moles(Gas::Plasma, 80.0));

        let fast = [Neutron::new(Compass::EAST, 3)];
        let out = process(&mut channel, &fast, &mut rng, &mut stats);

        assert!(out.neutrons.contains(&fast[0]));
        assert_eq!(out.neutrons.len() as u64, 1 + stats.spawned);
        assert!(stats.gas_reactions >= 1);
    }
}
