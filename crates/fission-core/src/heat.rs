//! Heat transfer between two thermal bodies
//!
//! Every exchange in the reactor (part to part, part to casing, casing to
//! air, part to gas) goes through [`exchange`]. One call moves conductive
//! plus radiative energy and never lets the two temperatures cross.

use fission_simulation::GasVolume;

/// Stefan–Boltzmann constant (W/m²·K⁴)
pub const STEFAN_BOLTZMANN: f32 = 5.670_374e-8;

/// Anything that holds heat
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalBody {
    /// Kelvin
    pub temperature: f32,
    /// Energy to raise by one Kelvin
    pub thermal_mass: f32,
    /// Material conductivity; `None` for bodies with no solid surface (gas, vacuum)
    pub conductivity: Option<f32>,
}

impl ThermalBody {
    pub fn new(temperature: f32, thermal_mass: f32, conductivity: Option<f32>) -> Self {
        Self {
            temperature,
            thermal_mass,
            conductivity,
        }
    }

    pub fn energy(&self) -> f32 {
        self.temperature * self.thermal_mass
    }
}

/// Conductivity across the interface of two materials.
///
/// Two solids combine harmonically; if only one side has a surface its
/// own coefficient is used; two bare sides do not conduct.
pub fn combined_conductivity(a: Option<f32>, b: Option<f32>) -> f32 {
    match (a, b) {
        (Some(ka), Some(kb)) if ka + kb > 0.0 => 2.0 * ka * kb / (ka + kb),
        (Some(_), Some(_)) => 0.0,
        (Some(k), None) | (None, Some(k)) => k.max(0.0),
        (None, None) => 0.0,
    }
}

/// Energy that flows from `a` to `b` in one tick (negative when `b` is hotter).
///
/// The result is capped at the amount that brings both bodies to their
/// shared equilibrium temperature.
pub fn transfer_energy(a: &ThermalBody, b: &ThermalBody, area: f32) -> f32 {
    if a.thermal_mass <= 0.0 || b.thermal_mass <= 0.0 || area <= 0.0 {
        return 0.0;
    }

    let delta = a.temperature - b.temperature;
    if delta == 0.0 {
        return 0.0;
    }

    let k = combined_conductivity(a.conductivity, b.conductivity);
    let delta_fourth = a.temperature.powi(4) - b.temperature.powi(4);
    let raw = k * area * delta + STEFAN_BOLTZMANN * area * delta_fourth;

    let limit = delta.abs() * a.thermal_mass * b.thermal_mass / (a.thermal_mass + b.thermal_mass);
    raw.clamp(-limit, limit)
}

/// Exchange heat between two bodies in place. Returns the energy moved from `a` to `b`.
pub fn exchange(a: &mut ThermalBody, b: &mut ThermalBody, area: f32) -> f32 {
    let energy = transfer_energy(a, b, area);
    if energy == 0.0 {
        return 0.0;
    }

    let low = a.temperature.min(b.temperature);
    let high = a.temperature.max(b.temperature);

    // Clamp absorbs float rounding at the equilibrium limit
    a.temperature = (a.temperature - energy / a.thermal_mass).clamp(low, high);
    b.temperature = (b.temperature + energy / b.thermal_mass).clamp(low, high);

    a.temperature = guard_temperature(a.temperature, "heat exchange");
    b.temperature = guard_temperature(b.temperature, "heat exchange");
    energy
}

/// Exchange heat between a solid body and a gas volume
pub fn exchange_with_gas<G: GasVolume>(body: &mut ThermalBody, gas: &mut G, area: f32) -> f32 {
    let mut gas_body = ThermalBody::new(gas.temperature(), gas.heat_capacity(false), None);
    let energy = exchange(body, &mut gas_body, area);
    if energy != 0.0 {
        gas.set_temperature(gas_body.temperature);
    }
    energy
}

/// Check a freshly computed temperature.
///
/// A negative (or NaN) result means a tuning constant is broken. Debug builds
/// stop right there; release builds log it and clamp to absolute zero so a
/// running session survives.
pub fn guard_temperature(temperature: f32, context: &str) -> f32 {
    if temperature >= 0.0 {
        return temperature;
    }

    if cfg!(debug_assertions) {
        panic!("{context} produced {temperature} K; check tuning constants");
    }

    log::error!(
        "{} produced temperature {} K, clamping to 0 K",
        context,
        temperature
    );
    0.0
}
