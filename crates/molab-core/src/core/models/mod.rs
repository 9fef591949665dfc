//! # Core Models Module
//!
//! Data structures describing the molecules of a lab session: atoms, bonds,
//! molecules and the [`system::MolecularSystem`] container that allocates their
//! identities.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom with element, position, charge and display flags
//! - [`topology`] - Bonds, bond orders and canonical atom-pair keys
//! - [`molecule`] - Molecules, validated lookup indices and construction blueprints
//! - [`system`] - Identity allocation and whole-list atom replacement
//! - [`ids`] - Slot-map keys for atoms, bonds and molecules
//!
//! ## Usage
//!
//! ```ignore
//! use molab::core::models::{molecule::MoleculeBlueprint, system::MolecularSystem};
//! use molab::core::models::topology::BondOrder;
//! use nalgebra::Point3;
//!
//! let mut system = MolecularSystem::new();
//! let id = system.add_molecule(
//!     MoleculeBlueprint::new("Hydrogen", "H2")
//!         .atom("H", Point3::new(0.0, 0.0, 0.0), 0.0)
//!         .atom("H", Point3::new(0.74, 0.0, 0.0), 0.0)
//!         .bond(0, 1, BondOrder::Single, 0.74),
//! )?;
//! ```

pub mod atom;
pub mod ids;
pub mod molecule;
pub mod system;
pub mod topology;
