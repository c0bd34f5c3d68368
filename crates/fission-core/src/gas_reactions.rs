//! Gas-phase nuclear reactions inside a part's gas channel

use fission_simulation::{Gas, GasVolume};

use crate::rng_trait::ReactorRng;
use crate::stats::ReactorStats;

/// Moles a species needs before it reacts at all
pub const REACTION_THRESHOLD: f32 = 1.0;
/// Upper bound on moles reacted per tick, per liter of channel volume
pub const MAX_REACTED_PER_LITER: f32 = 0.25;

/// What decaying tritium turns into, and how much per mole consumed
const TRITIUM_PRODUCTS: [(Gas, f32); 5] = [
    (Gas::Oxygen, 0.3),
    (Gas::Nitrogen, 0.3),
    (Gas::Ammonia, 0.2),
    (Gas::NitrousOxide, 0.1),
    (Gas::Frezon, 0.05),
];

/// Result of one reaction step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GasReactionOutcome {
    /// Neutrons to add to the cell, after CO2 absorption
    pub neutrons: u32,
    /// Kelvin to add to the part
    pub heat: f32,
}

/// Plasma breeds neutrons, CO2 eats them, tritium decays into heat
pub struct GasReactions;

impl GasReactions {
    /// Run plasma, then CO2, then tritium against one gas volume.
    ///
    /// Plasma fills a neutron budget that CO2 can only draw down, so the
    /// net output is never negative.
    pub fn react<G: GasVolume, R: ReactorRng>(
        gas: &mut G,
        rng: &mut R,
        stats: &mut dyn ReactorStats,
    ) -> GasReactionOutcome {
        let cap = MAX_REACTED_PER_LITER * gas.volume();
        let mut outcome = GasReactionOutcome::default();

        // Plasma -> tritium at 2:1, one neutron per whole mole
        if let Some(reacted) = Self::consume(gas, Gas::Plasma, cap, rng) {
            gas.adjust_moles(Gas::Tritium, reacted / 2.0);
            outcome.neutrons += reacted.floor() as u32;
            stats.record_gas_reaction();
        }

        // CO2 absorbs neutrons from this tick's plasma budget
        if let Some(reacted) = Self::consume(gas, Gas::CarbonDioxide, cap, rng) {
            let units = reacted.floor() as u32;
            outcome.neutrons -= units.min(outcome.neutrons);
            outcome.heat += units as f32;
            stats.record_gas_reaction();
        }

        if let Some(reacted) = Self::consume(gas, Gas::Tritium, cap, rng) {
            outcome.heat += reacted.floor();
            let (product, fraction) =
                TRITIUM_PRODUCTS[rng.gen_range_u32(0, TRITIUM_PRODUCTS.len() as u32 - 1) as usize];
            gas.adjust_moles(product, reacted * fraction);
            stats.record_gas_reaction();
        }

        outcome
    }

    /// Remove a random amount of `species` if it is above threshold
    fn consume<G: GasVolume, R: ReactorRng>(
        gas: &mut G,
        species: Gas,
        cap: f32,
        rng: &mut R,
    ) -> Option<f32> {
        let available = gas.moles(species);
        if available <= REACTION_THRESHOLD {
            return None;
        }

        let reacted = rng.gen_f32() * available.min(cap);
        if reacted <= 0.0 {
            return None;
        }
        gas.adjust_moles(species, -reacted);
        Some(reacted)
    }
}
