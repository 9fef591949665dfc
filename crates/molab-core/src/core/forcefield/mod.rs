//! # Force Field Module
//!
//! The simplified intramolecular force field that drives the dynamics: a
//! harmonic spring per bond, a truncated 12-6 Lennard-Jones term for every
//! non-bonded pair, and a temperature-scaled random kick per atom.
//!
//! ## Key Components
//!
//! - [`params`] - Force field constants, deserialisable from TOML
//! - [`potentials`] - Scalar force and energy laws
//! - [`evaluator`] - Per-molecule net force and potential energy
//!
//! There are no intermolecular forces; each molecule is evaluated in isolation.

pub mod evaluator;
pub mod params;
pub mod potentials;
