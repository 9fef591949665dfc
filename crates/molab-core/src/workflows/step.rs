use crate::core::forcefield::evaluator::ForceEvaluator;
use crate::core::models::ids::{AtomId, MoleculeId};
use crate::core::models::molecule::{Molecule, MoleculeUpdate, TopologyError};
use crate::engine::config::DynamicsConfig;
use crate::engine::integrator::Integrator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{AtomDynamics, DynamicsState};
use crate::engine::thermal::ThermalInitializer;
use rand::Rng;
use tracing::{debug, instrument, trace, warn};

/// Inputs owned by the host: the thermostat setting and the play/pause flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationControls {
    /// Kelvin. Must be positive; this is not checked beyond a warning.
    pub temperature: f64,
    pub running: bool,
}

impl Default for SimulationControls {
    fn default() -> Self {
        Self {
            temperature: 298.15,
            running: false,
        }
    }
}

impl SimulationControls {
    pub fn running(temperature: f64) -> Self {
        Self {
            temperature,
            running: true,
        }
    }

    pub fn paused(temperature: f64) -> Self {
        Self {
            temperature,
            running: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    Idle,
    Stepping,
}

impl SimulationPhase {
    pub fn from_running(running: bool) -> Self {
        if running { Self::Stepping } else { Self::Idle }
    }
}

#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub config: &'a DynamicsConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> StepContext<'a> {
    pub fn new(config: &'a DynamicsConfig, reporter: &'a ProgressReporter<'a>) -> Self {
        Self { config, reporter }
    }
}

/// A molecule left untouched by a tick, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMolecule {
    pub molecule_id: MoleculeId,
    pub reason: TopologyError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub phase: SimulationPhase,
    /// One full replacement atom list per molecule that was stepped.
    pub updates: Vec<MoleculeUpdate>,
    pub skipped: Vec<SkippedMolecule>,
}

impl StepOutcome {
    fn idle() -> Self {
        Self {
            phase: SimulationPhase::Idle,
            updates: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SimulationPhase::Idle
    }
}

struct Steppers<'a> {
    thermal: ThermalInitializer,
    evaluator: ForceEvaluator<'a>,
    integrator: Integrator,
    temperature: f64,
    dt: f64,
    reseed_all: bool,
}

/// Advances every molecule by one tick.
///
/// Nothing is written to `molecules`; the caller applies the returned updates.
/// When `controls.running` is false the call is a no-op and returns an idle
/// outcome without touching `state` or drawing from `rng`.
///
/// Each molecule is stepped as a unit. Validation, seeding, force evaluation
/// and integration all happen on local copies, and `state` is only updated for
/// a molecule once all of its atoms have integrated to finite values. A
/// molecule that fails is reported in [`StepOutcome::skipped`] and keeps its
/// previous positions and dynamical state.
#[instrument(skip_all, name = "dynamics_step", fields(temperature = controls.temperature, elapsed = elapsed))]
pub fn step<'m, I, R>(
    state: &mut DynamicsState,
    molecules: I,
    controls: &SimulationControls,
    elapsed: f64,
    context: &StepContext<'_>,
    rng: &mut R,
) -> StepOutcome
where
    I: IntoIterator<Item = &'m Molecule>,
    R: Rng + ?Sized,
{
    if !controls.running {
        trace!("Simulation idle; tick skipped.");
        return StepOutcome::idle();
    }

    let temperature = controls.temperature;
    if temperature.is_nan() || temperature <= 0.0 {
        warn!(
            temperature,
            "Non-positive temperature supplied; dynamics results are unspecified."
        );
    }

    let config = context.config;
    let reseed_all = config.reseed_on_temperature_change
        && state
            .last_temperature
            .is_some_and(|previous| previous != temperature);
    if reseed_all {
        debug!(
            previous = ?state.last_temperature,
            temperature, "Temperature changed; re-seeding all velocities."
        );
    }

    let integrator = Integrator::new(&config.integrator);
    let steppers = Steppers {
        thermal: ThermalInitializer::new(&config.thermal, temperature),
        evaluator: ForceEvaluator::new(&config.force_field),
        dt: integrator.time_step(elapsed),
        integrator,
        temperature,
        reseed_all,
    };

    let molecules: Vec<&Molecule> = molecules.into_iter().collect();
    context.reporter.report(Progress::TickStart {
        molecules: molecules.len() as u64,
    });

    let mut updates = Vec::with_capacity(molecules.len());
    let mut skipped = Vec::new();
    for molecule in molecules {
        match step_molecule(molecule, state, &steppers, rng) {
            Ok((update, dynamics)) => {
                for (atom_id, atom_dynamics) in dynamics {
                    state.insert(atom_id, atom_dynamics);
                }
                updates.push(update);
                context.reporter.report(Progress::MoleculeStepped {
                    molecule_id: molecule.id,
                });
            }
            Err(reason) => {
                debug!(
                    molecule = %molecule.name,
                    error = %reason,
                    "Molecule skipped for this tick."
                );
                skipped.push(SkippedMolecule {
                    molecule_id: molecule.id,
                    reason,
                });
                context.reporter.report(Progress::MoleculeSkipped {
                    molecule_id: molecule.id,
                });
            }
        }
    }
    state.last_temperature = Some(temperature);

    context.reporter.report(Progress::TickFinish);
    trace!(
        stepped = updates.len(),
        skipped = skipped.len(),
        dt = steppers.dt,
        "Tick complete."
    );

    StepOutcome {
        phase: SimulationPhase::Stepping,
        updates,
        skipped,
    }
}

type MoleculeStep = (MoleculeUpdate, Vec<(AtomId, AtomDynamics)>);

fn step_molecule<R: Rng + ?Sized>(
    molecule: &Molecule,
    state: &DynamicsState,
    steppers: &Steppers<'_>,
    rng: &mut R,
) -> Result<MoleculeStep, TopologyError> {
    let index = molecule.index()?;

    let current: Vec<AtomDynamics> = molecule
        .atoms
        .iter()
        .map(|atom| match state.get(atom.id) {
            Some(dynamics) if !steppers.reseed_all => *dynamics,
            _ => steppers.thermal.seed(rng),
        })
        .collect();

    let forces = steppers
        .evaluator
        .net_forces(&index, steppers.temperature, rng);

    let mut atoms = Vec::with_capacity(molecule.atoms.len());
    let mut dynamics = Vec::with_capacity(molecule.atoms.len());
    for ((atom, previous), force) in molecule.atoms.iter().zip(&current).zip(forces) {
        let (position, next) = steppers
            .integrator
            .advance(atom.position, previous, force, steppers.dt);
        if !next.is_finite() || !position.iter().all(|c| c.is_finite()) {
            return Err(TopologyError::Diverged(atom.id));
        }
        atoms.push(atom.with_position(position));
        dynamics.push((atom.id, next));
    }

    Ok((
        MoleculeUpdate {
            molecule_id: molecule.id,
            atoms,
        },
        dynamics,
    ))
}
