use serde::{Deserialize, Serialize};

/// Constants of the simplified dynamics force field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForceFieldParams {
    /// Harmonic constant applied to every bond.
    pub spring_constant: f64,
    pub lj_sigma: f64,
    pub lj_epsilon: f64,
    /// Non-bonded pairs at or beyond this separation contribute nothing.
    pub nonbonded_cutoff: f64,
    /// Temperature (K) at which the jitter has amplitude `jitter_scale`.
    pub jitter_reference_temperature: f64,
    pub jitter_scale: f64,
}

impl Default for ForceFieldParams {
    fn default() -> Self {
        Self {
            spring_constant: 100.0,
            lj_sigma: 3.4,
            lj_epsilon: 0.1,
            nonbonded_cutoff: 5.0,
            jitter_reference_temperature: 298.15,
            jitter_scale: 0.1,
        }
    }
}

impl ForceFieldParams {
    /// Full width of the per-component thermal jitter at `temperature`.
    ///
    /// Components are drawn from `±0.5 × amplitude`.
    pub fn jitter_amplitude(&self, temperature: f64) -> f64 {
        (temperature / self.jitter_reference_temperature).sqrt() * self.jitter_scale
    }
}
