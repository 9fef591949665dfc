use super::step::{SimulationControls, SimulationPhase, SkippedMolecule, StepContext, step};
use crate::core::forcefield::evaluator::ForceEvaluator;
use crate::core::models::ids::MoleculeId;
use crate::core::models::molecule::{Molecule, TopologyError};
use crate::core::models::system::{MolecularSystem, SystemError};
use crate::engine::config::DynamicsConfig;
use crate::engine::progress::ProgressReporter;
use crate::engine::state::DynamicsState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub phase: SimulationPhase,
    /// Number of molecules whose atoms were replaced.
    pub stepped: usize,
    pub skipped: Vec<SkippedMolecule>,
}

/// Owns everything that persists between ticks: configuration, dynamical
/// state and the random generator.
///
/// The host drives it by calling [`Simulation::tick`] once per frame.
#[derive(Debug, Clone)]
pub struct Simulation<R = StdRng> {
    config: DynamicsConfig,
    state: DynamicsState,
    rng: R,
}

impl Simulation<StdRng> {
    pub fn seeded(config: DynamicsConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: DynamicsConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(config: DynamicsConfig, rng: R) -> Self {
        Self {
            config,
            state: DynamicsState::new(),
            rng,
        }
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    pub fn state(&self) -> &DynamicsState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DynamicsState {
        &mut self.state
    }

    pub fn tick(
        &mut self,
        system: &mut MolecularSystem,
        controls: &SimulationControls,
        elapsed: f64,
    ) -> Result<TickReport, SystemError> {
        self.tick_with_progress(system, controls, elapsed, &ProgressReporter::new())
    }

    /// Runs one step over every molecule of `system` and writes the results back.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] only if `system` no longer matches the atom lists
    /// the step computed, which cannot happen through this method alone.
    #[instrument(skip_all, name = "simulation_tick")]
    pub fn tick_with_progress(
        &mut self,
        system: &mut MolecularSystem,
        controls: &SimulationControls,
        elapsed: f64,
        reporter: &ProgressReporter,
    ) -> Result<TickReport, SystemError> {
        let context = StepContext::new(&self.config, reporter);
        let outcome = step(
            &mut self.state,
            system.molecules_iter(),
            controls,
            elapsed,
            &context,
            &mut self.rng,
        );

        let phase = outcome.phase;
        let stepped = system.apply_updates(outcome.updates)?;
        let skipped = outcome.skipped;
        Ok(TickReport {
            phase,
            stepped,
            skipped,
        })
    }

    /// Removes a molecule from `system` and forgets the dynamics of its atoms.
    pub fn remove_molecule(
        &mut self,
        system: &mut MolecularSystem,
        id: MoleculeId,
    ) -> Option<Molecule> {
        let molecule = system.remove_molecule(id)?;
        let evicted = self.state.evict(molecule.atom_ids());
        debug!(
            molecule = %molecule.name,
            evicted, "Removed molecule and its dynamical state."
        );
        Some(molecule)
    }

    /// Drops dynamical state for atoms that are no longer in `system`.
    pub fn prune(&mut self, system: &MolecularSystem) -> usize {
        self.state.retain_present(system)
    }

    /// Bonded plus non-bonded potential energy of one molecule under this
    /// simulation's force field.
    pub fn potential_energy(&self, molecule: &Molecule) -> Result<f64, TopologyError> {
        let index = molecule.index()?;
        Ok(ForceEvaluator::new(&self.config.force_field).potential_energy(&index))
    }
}
