//! Ready-made blueprints for the molecules a lab session commonly starts from.
//!
//! Geometries are placed relative to `origin` and are deliberately simple;
//! they are starting points for the dynamics, not optimised structures.

use crate::core::models::atom::Hybridization;
use crate::core::models::molecule::MoleculeBlueprint;
use crate::core::models::topology::BondOrder;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Water,
    Methane,
    Ammonia,
    CarbonDioxide,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Water,
        Preset::Methane,
        Preset::Ammonia,
        Preset::CarbonDioxide,
    ];

    pub fn blueprint(self, origin: Point3<f64>) -> MoleculeBlueprint {
        match self {
            Preset::Water => water(origin),
            Preset::Methane => methane(origin),
            Preset::Ammonia => ammonia(origin),
            Preset::CarbonDioxide => carbon_dioxide(origin),
        }
    }
}

impl FromStr for Preset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "water" | "h2o" => Ok(Preset::Water),
            "methane" | "ch4" => Ok(Preset::Methane),
            "ammonia" | "nh3" => Ok(Preset::Ammonia),
            "carbon-dioxide" | "carbon_dioxide" | "co2" => Ok(Preset::CarbonDioxide),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Water => "water",
            Preset::Methane => "methane",
            Preset::Ammonia => "ammonia",
            Preset::CarbonDioxide => "carbon-dioxide",
        };
        f.write_str(name)
    }
}

fn at(origin: Point3<f64>, dx: f64, dy: f64, dz: f64) -> Point3<f64> {
    origin + Vector3::new(dx, dy, dz)
}

/// H₂O: bent, O–H 0.96 Å.
pub fn water(origin: Point3<f64>) -> MoleculeBlueprint {
    MoleculeBlueprint::new("Water", "H₂O")
        .hybridized_atom("O", origin, -0.8, Hybridization::Sp3)
        .atom("H", at(origin, -0.96, 0.61, 0.0), 0.4)
        .atom("H", at(origin, 0.96, 0.61, 0.0), 0.4)
        .bond(0, 1, BondOrder::Single, 0.96)
        .bond(0, 2, BondOrder::Single, 0.96)
        .with_energy(-76.4)
}

/// CH₄: hydrogens on alternating cube corners, C–H 1.09 Å.
pub fn methane(origin: Point3<f64>) -> MoleculeBlueprint {
    const D: f64 = 1.09;
    MoleculeBlueprint::new("Methane", "CH₄")
        .hybridized_atom("C", origin, -0.4, Hybridization::Sp3)
        .atom("H", at(origin, D, D, D), 0.1)
        .atom("H", at(origin, -D, -D, D), 0.1)
        .atom("H", at(origin, -D, D, -D), 0.1)
        .atom("H", at(origin, D, -D, -D), 0.1)
        .bond(0, 1, BondOrder::Single, D)
        .bond(0, 2, BondOrder::Single, D)
        .bond(0, 3, BondOrder::Single, D)
        .bond(0, 4, BondOrder::Single, D)
        .with_energy(-40.5)
}

/// NH₃: trigonal pyramid, N–H 1.01 Å.
pub fn ammonia(origin: Point3<f64>) -> MoleculeBlueprint {
    MoleculeBlueprint::new("Ammonia", "NH₃")
        .hybridized_atom("N", origin, -0.9, Hybridization::Sp3)
        .atom("H", at(origin, 0.94, -0.38, 0.0), 0.3)
        .atom("H", at(origin, -0.47, -0.38, 0.82), 0.3)
        .atom("H", at(origin, -0.47, -0.38, -0.82), 0.3)
        .bond(0, 1, BondOrder::Single, 1.01)
        .bond(0, 2, BondOrder::Single, 1.01)
        .bond(0, 3, BondOrder::Single, 1.01)
        .with_energy(-56.6)
}

/// CO₂: linear, C=O 1.16 Å.
pub fn carbon_dioxide(origin: Point3<f64>) -> MoleculeBlueprint {
    MoleculeBlueprint::new("Carbon Dioxide", "CO₂")
        .hybridized_atom("C", origin, 0.4, Hybridization::Sp)
        .atom("O", at(origin, -1.16, 0.0, 0.0), -0.2)
        .atom("O", at(origin, 1.16, 0.0, 0.0), -0.2)
        .bond(0, 1, BondOrder::Double, 1.16)
        .bond(0, 2, BondOrder::Double, 1.16)
        .with_energy(-188.6)
}
