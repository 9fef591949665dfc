use super::config::ThermalConfig;
use super::state::AtomDynamics;
use nalgebra::Vector3;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

/// Half-width `σ = sqrt(kT/m)` of the initial velocity range, for unit mass.
#[inline]
pub fn velocity_half_width(temperature: f64, gas_constant: f64) -> f64 {
    (gas_constant * temperature).sqrt()
}

/// Seeds initial velocities for atoms the dynamics has not seen yet.
#[derive(Debug, Clone, Copy)]
pub struct ThermalInitializer {
    half_width: f64,
}

impl ThermalInitializer {
    pub fn new(config: &ThermalConfig, temperature: f64) -> Self {
        let half_width = velocity_half_width(temperature, config.gas_constant / config.atom_mass);
        Self { half_width }
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Velocity components uniform in `[-σ, σ)`, force accumulator zeroed.
    ///
    /// Draws three samples per call.
    pub fn seed<R: Rng + ?Sized>(&self, rng: &mut R) -> AtomDynamics {
        let unit = Uniform::new(-0.5_f64, 0.5);
        let width = 2.0 * self.half_width;
        let x = unit.sample(rng);
        let y = unit.sample(rng);
        let z = unit.sample(rng);
        AtomDynamics::with_velocity(Vector3::new(x, y, z) * width)
    }
}
