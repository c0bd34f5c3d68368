//! Gas capability interface
//!
//! The reactor never looks inside a gas volume. Everything it needs from the
//! surrounding atmospherics goes through [`GasVolume`]. [`GasMixture`] is a
//! small self-contained implementation used by the headless runner and tests.

use serde::{Deserialize, Serialize};

/// Heat capacity floor for volumes exposed to the outside
pub const MINIMUM_HEAT_CAPACITY: f32 = 0.0003;

/// Cosmic background temperature, the coldest a mixture can get
pub const TCMB: f32 = 2.7;

/// Gas species the reactor reacts with or produces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gas {
    Oxygen,
    Nitrogen,
    CarbonDioxide,
    Plasma,
    Tritium,
    WaterVapor,
    Ammonia,
    NitrousOxide,
    Frezon,
}

impl Gas {
    pub const COUNT: usize = 9;

    pub const ALL: [Gas; Gas::COUNT] = [
        Gas::Oxygen,
        Gas::Nitrogen,
        Gas::CarbonDioxide,
        Gas::Plasma,
        Gas::Tritium,
        Gas::WaterVapor,
        Gas::Ammonia,
        Gas::NitrousOxide,
        Gas::Frezon,
    ];

    /// Molar heat capacity (J/mol·K)
    pub fn specific_heat(self) -> f32 {
        match self {
            Gas::Oxygen => 20.0,
            Gas::Nitrogen => 30.0,
            Gas::CarbonDioxide => 30.0,
            Gas::Plasma => 200.0,
            Gas::Tritium => 10.0,
            Gas::WaterVapor => 40.0,
            Gas::Ammonia => 20.0,
            Gas::NitrousOxide => 40.0,
            Gas::Frezon => 600.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Narrow view of an atmospherics gas volume
pub trait GasVolume: Sized {
    /// Container volume in liters
    fn volume(&self) -> f32;

    fn temperature(&self) -> f32;

    fn set_temperature(&mut self, temperature: f32);

    fn moles(&self, gas: Gas) -> f32;

    /// Add (or with a negative delta, remove) moles of one species
    fn adjust_moles(&mut self, gas: Gas, delta: f32);

    fn total_moles(&self) -> f32;

    /// Heat capacity in J/K. `open` applies the floor used for exposed volumes.
    fn heat_capacity(&self, open: bool) -> f32;

    /// Stored thermal energy in J
    fn thermal_energy(&self) -> f32 {
        self.temperature() * self.heat_capacity(false)
    }

    /// Split off `amount` liters worth of gas, leaving the rest behind
    fn remove_volume(&mut self, amount: f32) -> Self;

    /// Pour `other` into this volume, equalizing temperature by energy
    fn merge(&mut self, other: Self);
}

/// Plain in-memory gas mixture
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasMixture {
    volume: f32,
    temperature: f32,
    moles: [f32; Gas::COUNT],
}

impl GasMixture {
    pub fn new(volume: f32, temperature: f32) -> Self {
        Self {
            volume: volume.max(0.0),
            temperature: temperature.max(TCMB),
            moles: [0.0; Gas::COUNT],
        }
    }

    /// Builder-style helper for tests and scenario setup
    pub fn with_moles(mut self, gas: Gas, moles: f32) -> Self {
        self.adjust_moles(gas, moles);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.total_moles() <= 0.0
    }
}

impl GasVolume for GasMixture {
    fn volume(&self) -> f32 {
        self.volume
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.max(TCMB);
    }

    fn moles(&self, gas: Gas) -> f32 {
        self.moles[gas.index()]
    }

    fn adjust_moles(&mut self, gas: Gas, delta: f32) {
        let slot = &mut self.moles[gas.index()];
        *slot = (*slot + delta).max(0.0);
    }

    fn total_moles(&self) -> f32 {
        self.moles.iter().sum()
    }

    fn heat_capacity(&self, open: bool) -> f32 {
        let capacity: f32 = Gas::ALL
            .iter()
            .map(|gas| self.moles(*gas) * gas.specific_heat())
            .sum();
        if open {
            capacity.max(MINIMUM_HEAT_CAPACITY)
        } else {
            capacity
        }
    }

    fn remove_volume(&mut self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, self.volume);
        let fraction = if self.volume > 0.0 {
            amount / self.volume
        } else {
            0.0
        };

        let mut removed = GasMixture::new(amount, self.temperature);
        for (taken, left) in removed.moles.iter_mut().zip(self.moles.iter_mut()) {
            *taken = *left * fraction;
            *left -= *taken;
        }
        removed
    }

    fn merge(&mut self, other: Self) {
        let own_capacity = self.heat_capacity(false);
        let other_capacity = other.heat_capacity(false);
        let combined = own_capacity + other_capacity;

        if combined > MINIMUM_HEAT_CAPACITY {
            let energy = self.thermal_energy() + other.thermal_energy();
            self.temperature = (energy / combined).max(TCMB);
        }

        for (own, incoming) in self.moles.iter_mut().zip(other.moles.iter()) {
            *own += *incoming;
        }
    }
}
