//! # MoLab Core Library
//!
//! The per-frame molecular dynamics behind an interactive molecule lab: a
//! simplified force field integrated with a damped explicit step, advancing
//! the atoms of every molecule one tick at a time.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`,
//!   `Molecule`), bonding rules, and pure force laws (`potentials`, `evaluator`).
//!
//! - **[`engine`]: The Logic Core.** The state carried between ticks
//!   (`DynamicsState`), velocity seeding, the integrator and validated
//!   configuration (`DynamicsConfig`).
//!
//! - **[`workflows`]: The Public API.** The explicit `step` function and the
//!   `Simulation` owner that a host scheduler invokes once per frame.
//!
//! ## Example
//!
//! ```ignore
//! use molab::core::builders;
//! use molab::core::models::system::MolecularSystem;
//! use molab::engine::config::DynamicsConfig;
//! use molab::workflows::{Simulation, SimulationControls};
//! use nalgebra::Point3;
//!
//! let mut system = MolecularSystem::new();
//! system.add_molecule(builders::water(Point3::origin()))?;
//!
//! let mut simulation = Simulation::seeded(DynamicsConfig::default(), 42);
//! let controls = SimulationControls::running(298.15);
//! for _ in 0..60 {
//!     simulation.tick(&mut system, &controls, 1.0 / 60.0)?;
//! }
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
