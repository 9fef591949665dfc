use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use molab::engine::config::{DynamicsConfig, DynamicsConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_TICKS: u64 = 600;
const DEFAULT_FRAME_TIME: f64 = 1.0 / 60.0;
const DEFAULT_TEMPERATURE: f64 = 298.15;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSimulationConfig {
    ticks: Option<u64>,
    #[serde(rename = "frame-time")]
    frame_time: Option<f64>,
    temperature: Option<f64>,
    seed: Option<u64>,
    #[serde(rename = "bonding-rules")]
    bonding_rules: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PresetMolecule {
    pub preset: String,
    #[serde(default)]
    pub origin: [f64; 3],
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtomEntry {
    pub element: String,
    pub position: [f64; 3],
    #[serde(default)]
    pub charge: f64,
    pub hybridization: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BondEntry {
    /// Indices into the molecule's `atoms` list.
    pub atoms: [usize; 2],
    pub order: Option<String>,
    /// Equilibrium length; looked up in the bonding rules when absent.
    pub length: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CustomMolecule {
    pub name: String,
    pub formula: Option<String>,
    pub charge: Option<i32>,
    pub multiplicity: Option<u32>,
    pub atoms: Vec<AtomEntry>,
    #[serde(default)]
    pub bonds: Vec<BondEntry>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MoleculeEntry {
    Preset(PresetMolecule),
    Custom(CustomMolecule),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlacementEntry {
    pub element: String,
    pub position: [f64; 3],
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialScenario {
    simulation: Option<PartialSimulationConfig>,
    dynamics: Option<DynamicsConfig>,
    #[serde(default)]
    molecules: Vec<MoleculeEntry>,
    #[serde(default)]
    placements: Vec<PlacementEntry>,
}

/// A scenario with every layer (file, `--set`, flags) resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub ticks: u64,
    pub frame_time: f64,
    pub temperature: f64,
    pub seed: Option<u64>,
    pub bonding_rules: Option<PathBuf>,
    pub dynamics: DynamicsConfig,
    pub molecules: Vec<MoleculeEntry>,
    pub placements: Vec<PlacementEntry>,
}

impl PartialScenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading scenario from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<Scenario> {
        self.apply_set_values(&args.set_values)?;

        let simulation = self.simulation.take().unwrap_or_default();
        let dynamics = self.dynamics.take().unwrap_or_default();

        let mut builder = DynamicsConfigBuilder::from_config(dynamics);
        if args.reseed_on_temperature_change {
            builder = builder.reseed_on_temperature_change(true);
        }
        let dynamics = builder.build()?;

        let ticks = args.ticks.or(simulation.ticks).unwrap_or(DEFAULT_TICKS);
        let frame_time = args
            .frame_time
            .or(simulation.frame_time)
            .unwrap_or(DEFAULT_FRAME_TIME);
        if !(frame_time.is_finite() && frame_time >= 0.0) {
            return Err(CliError::Argument(format!(
                "frame time must be a non-negative number of seconds, got {frame_time}"
            )));
        }
        let temperature = args
            .temperature
            .or(simulation.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(CliError::Argument(format!(
                "temperature must be a positive number of Kelvin, got {temperature}"
            )));
        }

        if self.molecules.is_empty() && self.placements.is_empty() {
            return Err(CliError::Config(
                "The scenario defines no `molecules` or `placements`.".to_string(),
            ));
        }

        Ok(Scenario {
            ticks,
            frame_time,
            temperature,
            seed: args.seed.or(simulation.seed),
            bonding_rules: args.rules.clone().or(simulation.bonding_rules),
            dynamics,
            molecules: self.molecules,
            placements: self.placements,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            if let Some(sim_key) = key.strip_prefix("simulation.") {
                let simulation = self.simulation.get_or_insert_with(Default::default);
                match sim_key {
                    "ticks" => simulation.ticks = Some(parse_value(key, value_str)?),
                    "frame-time" => simulation.frame_time = Some(parse_value(key, value_str)?),
                    "temperature" => simulation.temperature = Some(parse_value(key, value_str)?),
                    "seed" => simulation.seed = Some(parse_value(key, value_str)?),
                    "bonding-rules" => simulation.bonding_rules = Some(PathBuf::from(value_str)),
                    _ => return Err(unsupported_key(key)),
                }
                continue;
            }

            let dynamics = self.dynamics.get_or_insert_with(Default::default);
            let ff = &mut dynamics.force_field;
            let integrator = &mut dynamics.integrator;
            match key {
                "dynamics.reseed-on-temperature-change" => {
                    dynamics.reseed_on_temperature_change = parse_value(key, value_str)?
                }
                "dynamics.force-field.spring-constant" => {
                    ff.spring_constant = parse_value(key, value_str)?
                }
                "dynamics.force-field.lj-sigma" => ff.lj_sigma = parse_value(key, value_str)?,
                "dynamics.force-field.lj-epsilon" => ff.lj_epsilon = parse_value(key, value_str)?,
                "dynamics.force-field.nonbonded-cutoff" => {
                    ff.nonbonded_cutoff = parse_value(key, value_str)?
                }
                "dynamics.force-field.jitter-reference-temperature" => {
                    ff.jitter_reference_temperature = parse_value(key, value_str)?
                }
                "dynamics.force-field.jitter-scale" => {
                    ff.jitter_scale = parse_value(key, value_str)?
                }
                "dynamics.thermal.gas-constant" => {
                    dynamics.thermal.gas_constant = parse_value(key, value_str)?
                }
                "dynamics.thermal.atom-mass" => {
                    dynamics.thermal.atom_mass = parse_value(key, value_str)?
                }
                "dynamics.integrator.max-time-step" => {
                    integrator.max_time_step = parse_value(key, value_str)?
                }
                "dynamics.integrator.damping" => integrator.damping = parse_value(key, value_str)?,
                _ => return Err(unsupported_key(key)),
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value_str
        ))
    })
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!(
        "Unsupported configuration key for --set: '{}'",
        key
    ))
}
