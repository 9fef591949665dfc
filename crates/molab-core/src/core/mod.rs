//! # Core Module
//!
//! The stateless foundation of the library: molecular data models, bonding
//! rules, the force field, and the construction helpers that build molecules
//! before any dynamics runs.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, molecules and the system that owns them
//! - **Bonding Knowledge** ([`bonding`]) - Ideal lengths and bonding distances for element pairs
//! - **Force Field** ([`forcefield`]) - Spring, Lennard-Jones and thermal-jitter forces
//! - **Construction** ([`builders`], [`placement`]) - Preset molecules and single-atom placement
//!
//! Nothing in this module holds state between simulation ticks; that lives in
//! [`crate::engine`].

pub mod bonding;
pub mod builders;
pub mod forcefield;
pub mod models;
pub mod placement;
