//! # Workflows Module
//!
//! The public entry points for running dynamics.
//!
//! - **Single step** ([`step`]) - A scheduler-agnostic function that advances a
//!   set of molecules by one tick and returns replacement atom lists
//! - **Simulation** ([`simulation`]) - An owner of dynamical state, configuration
//!   and randomness that applies each step to a [`MolecularSystem`](crate::core::models::system::MolecularSystem)

pub mod simulation;
pub mod step;

pub use simulation::{Simulation, TickReport};
pub use step::{SimulationControls, SimulationPhase, StepOutcome};
