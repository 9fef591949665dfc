use crate::core::forcefield::params::ForceFieldParams;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ThermalConfig {
    /// Gas constant in kJ/(mol·K).
    pub gas_constant: f64,
    pub atom_mass: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            gas_constant: 8.314e-3,
            atom_mass: 1.0,
        }
    }
}

/// Closed interval for one coordinate.
///
/// Reversed endpoints are treated as the interval between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn ordered(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    /// Snaps `value` into the interval. NaN passes through unchanged.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        let (lo, hi) = self.ordered();
        value.max(lo).min(hi)
    }

    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.ordered();
        (lo..=hi).contains(&value)
    }
}

/// Axis-aligned box that atom positions are snapped into after every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            x: Interval::new(-10.0, 10.0),
            y: Interval::new(-5.0, 10.0),
            z: Interval::new(-10.0, 10.0),
        }
    }
}

impl BoundingBox {
    pub fn clamp(&self, position: Point3<f64>) -> Point3<f64> {
        Point3::new(
            self.x.clamp(position.x),
            self.y.clamp(position.y),
            self.z.clamp(position.z),
        )
    }

    pub fn contains(&self, position: &Point3<f64>) -> bool {
        self.x.contains(position.x) && self.y.contains(position.y) && self.z.contains(position.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IntegratorConfig {
    /// Upper bound on the time step, in seconds of host time.
    pub max_time_step: f64,
    /// Velocity multiplier applied once per step.
    pub damping: f64,
    pub bounds: BoundingBox,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            max_time_step: 0.016,
            damping: 0.99,
            bounds: BoundingBox::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DynamicsConfig {
    pub force_field: ForceFieldParams,
    pub thermal: ThermalConfig,
    pub integrator: IntegratorConfig,
    /// Re-seed every present atom's velocity when the temperature differs from
    /// the one seen on the previous running tick.
    pub reseed_on_temperature_change: bool,
}

impl DynamicsConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ff = &self.force_field;
        non_negative("force-field.spring-constant", ff.spring_constant)?;
        positive("force-field.lj-sigma", ff.lj_sigma)?;
        non_negative("force-field.lj-epsilon", ff.lj_epsilon)?;
        non_negative("force-field.nonbonded-cutoff", ff.nonbonded_cutoff)?;
        positive(
            "force-field.jitter-reference-temperature",
            ff.jitter_reference_temperature,
        )?;
        non_negative("force-field.jitter-scale", ff.jitter_scale)?;

        non_negative("thermal.gas-constant", self.thermal.gas_constant)?;
        positive("thermal.atom-mass", self.thermal.atom_mass)?;

        let integrator = &self.integrator;
        positive("integrator.max-time-step", integrator.max_time_step)?;
        if !(integrator.damping > 0.0 && integrator.damping <= 1.0) {
            return Err(ConfigError::Invalid {
                parameter: "integrator.damping",
                reason: format!("must lie in (0, 1], got {}", integrator.damping),
            });
        }
        for (parameter, interval) in [
            ("integrator.bounds.x", integrator.bounds.x),
            ("integrator.bounds.y", integrator.bounds.y),
            ("integrator.bounds.z", integrator.bounds.z),
        ] {
            if !(interval.min.is_finite() && interval.max.is_finite() && interval.min <= interval.max)
            {
                return Err(ConfigError::Invalid {
                    parameter,
                    reason: format!(
                        "expected finite min <= max, got [{}, {}]",
                        interval.min, interval.max
                    ),
                });
            }
        }
        Ok(())
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            parameter,
            reason: format!("must be a finite non-negative number, got {value}"),
        })
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            parameter,
            reason: format!("must be a finite positive number, got {value}"),
        })
    }
}

/// Builds a [`DynamicsConfig`] from defaults, overriding selected values.
#[derive(Default)]
pub struct DynamicsConfigBuilder {
    config: DynamicsConfig,
}

impl DynamicsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DynamicsConfig) -> Self {
        Self { config }
    }

    pub fn force_field(mut self, params: ForceFieldParams) -> Self {
        self.config.force_field = params;
        self
    }
    pub fn spring_constant(mut self, k: f64) -> Self {
        self.config.force_field.spring_constant = k;
        self
    }
    pub fn lennard_jones(mut self, sigma: f64, epsilon: f64) -> Self {
        self.config.force_field.lj_sigma = sigma;
        self.config.force_field.lj_epsilon = epsilon;
        self
    }
    pub fn nonbonded_cutoff(mut self, cutoff: f64) -> Self {
        self.config.force_field.nonbonded_cutoff = cutoff;
        self
    }
    pub fn jitter_scale(mut self, scale: f64) -> Self {
        self.config.force_field.jitter_scale = scale;
        self
    }
    pub fn thermal(mut self, thermal: ThermalConfig) -> Self {
        self.config.thermal = thermal;
        self
    }
    pub fn max_time_step(mut self, dt: f64) -> Self {
        self.config.integrator.max_time_step = dt;
        self
    }
    pub fn damping(mut self, damping: f64) -> Self {
        self.config.integrator.damping = damping;
        self
    }
    pub fn bounds(mut self, bounds: BoundingBox) -> Self {
        self.config.integrator.bounds = bounds;
        self
    }
    pub fn reseed_on_temperature_change(mut self, enabled: bool) -> Self {
        self.config.reseed_on_temperature_change = enabled;
        self
    }

    pub fn build(self) -> Result<DynamicsConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
