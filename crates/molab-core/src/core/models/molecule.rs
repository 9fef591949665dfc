use super::atom::{Atom, Hybridization};
use super::ids::{AtomId, BondId, MoleculeId};
use super::topology::{Bond, BondOrder, pair_key};
use crate::core::bonding::BondingRules;
use nalgebra::Point3;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use thiserror::Error;

/// Integrity violations found in a molecule's topology or state.
///
/// These never abort a simulation tick. A molecule exhibiting one is skipped
/// for that tick and keeps its previous positions and dynamical state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("Atom {0:?} appears more than once in the molecule")]
    DuplicateAtom(AtomId),

    #[error("Atom {0:?} has a non-finite position")]
    NonFinitePosition(AtomId),

    #[error("Bond {bond_id:?} references atom {atom_id:?}, which is not part of the molecule")]
    DanglingBond { bond_id: BondId, atom_id: AtomId },

    #[error("Bond {0:?} joins an atom to itself")]
    SelfBond(BondId),

    #[error("Bond {bond_id:?} has an invalid equilibrium length: {length}")]
    InvalidBondLength { bond_id: BondId, length: f64 },

    #[error("Integration diverged for atom {0:?} (non-finite velocity or position)")]
    Diverged(AtomId),
}

/// A molecule: the unit of atomic update in a simulation tick.
///
/// The dynamics core reads `atoms` and `bonds` and replaces the `atoms` list
/// as a whole; no other field is ever written by it.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub id: MoleculeId,
    pub name: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub formula: String,
    /// Net charge in elementary charge units.
    pub charge: i32,
    /// Spin multiplicity (2S + 1).
    pub multiplicity: u32,
    /// Optional reference energy supplied by the constructing code.
    pub energy: Option<f64>,
}

impl Molecule {
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.iter().find(|atom| atom.id == id)
    }

    pub fn atom_ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms.iter().map(|atom| atom.id)
    }

    /// Finds the first bond joining `a` and `b`, in either order.
    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.connects(a, b))
    }

    /// Geometric center of the atom positions, or `None` for an empty molecule.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.atoms.is_empty() {
            return None;
        }
        let sum = self
            .atoms
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, atom| {
                acc + atom.position.coords
            });
        Some(Point3::from(sum / self.atoms.len() as f64))
    }

    /// Validates the topology and builds lookup tables for it.
    pub fn index(&self) -> Result<MoleculeIndex<'_>, TopologyError> {
        MoleculeIndex::build(self)
    }
}

/// A validated view of a molecule with constant-time atom and bond lookups.
#[derive(Debug)]
pub struct MoleculeIndex<'a> {
    molecule: &'a Molecule,
    slots: HashMap<AtomId, usize>,
    bonds: HashMap<(AtomId, AtomId), &'a Bond>,
}

impl<'a> MoleculeIndex<'a> {
    /// Builds the index, rejecting molecules that violate the topology invariants.
    ///
    /// When several bonds join the same pair the first one wins, matching
    /// [`Molecule::bond_between`].
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] for duplicate atom identities, non-finite
    /// positions, self-bonds, bonds referencing atoms outside the molecule, or
    /// negative / non-finite equilibrium lengths.
    pub fn build(molecule: &'a Molecule) -> Result<Self, TopologyError> {
        let mut slots = HashMap::with_capacity(molecule.atoms.len());
        for (slot, atom) in molecule.atoms.iter().enumerate() {
            if slots.insert(atom.id, slot).is_some() {
                return Err(TopologyError::DuplicateAtom(atom.id));
            }
            if !atom.has_finite_position() {
                return Err(TopologyError::NonFinitePosition(atom.id));
            }
        }

        let mut bonds = HashMap::with_capacity(molecule.bonds.len());
        for bond in &molecule.bonds {
            if bond.atom1_id == bond.atom2_id {
                return Err(TopologyError::SelfBond(bond.id));
            }
            for atom_id in [bond.atom1_id, bond.atom2_id] {
                if !slots.contains_key(&atom_id) {
                    return Err(TopologyError::DanglingBond {
                        bond_id: bond.id,
                        atom_id,
                    });
                }
            }
            if !bond.length().is_finite() || bond.length() < 0.0 {
                return Err(TopologyError::InvalidBondLength {
                    bond_id: bond.id,
                    length: bond.length(),
                });
            }
            if let Entry::Vacant(entry) = bonds.entry(bond.key()) {
                entry.insert(bond);
            }
        }

        Ok(Self {
            molecule,
            slots,
            bonds,
        })
    }

    pub fn molecule(&self) -> &'a Molecule {
        self.molecule
    }

    /// Position of the atom within the molecule's atom list.
    pub fn slot_of(&self, atom_id: AtomId) -> Option<usize> {
        self.slots.get(&atom_id).copied()
    }

    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<&'a Bond> {
        self.bonds.get(&pair_key(a, b)).copied()
    }
}

/// A full replacement atom list for one molecule, produced by a simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeUpdate {
    pub molecule_id: MoleculeId,
    pub atoms: Vec<Atom>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomSpec {
    pub element: String,
    pub position: Point3<f64>,
    pub charge: f64,
    pub hybridization: Option<Hybridization>,
}

/// A bond between two atoms of a blueprint, addressed by their insertion index.
#[derive(Debug, Clone, PartialEq)]
pub struct BondSpec {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
    pub length: f64,
}

/// Construction-time description of a molecule, before identities are allocated.
///
/// Blueprints are turned into [`Molecule`]s by
/// [`MolecularSystem::add_molecule`](super::system::MolecularSystem::add_molecule),
/// which allocates globally unique atom and bond identities.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeBlueprint {
    pub name: String,
    pub formula: String,
    pub charge: i32,
    pub multiplicity: u32,
    pub energy: Option<f64>,
    pub atoms: Vec<AtomSpec>,
    pub bonds: Vec<BondSpec>,
}

impl MoleculeBlueprint {
    pub fn new(name: &str, formula: &str) -> Self {
        Self {
            name: name.to_string(),
            formula: formula.to_string(),
            charge: 0,
            multiplicity: 1,
            energy: None,
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    pub fn atom(mut self, element: &str, position: Point3<f64>, charge: f64) -> Self {
        self.atoms.push(AtomSpec {
            element: element.to_string(),
            position,
            charge,
            hybridization: None,
        });
        self
    }

    pub fn hybridized_atom(
        mut self,
        element: &str,
        position: Point3<f64>,
        charge: f64,
        hybridization: Hybridization,
    ) -> Self {
        self.atoms.push(AtomSpec {
            element: element.to_string(),
            position,
            charge,
            hybridization: Some(hybridization),
        });
        self
    }

    pub fn bond(mut self, atom1: usize, atom2: usize, order: BondOrder, length: f64) -> Self {
        self.bonds.push(BondSpec {
            atom1,
            atom2,
            order,
            length,
        });
        self
    }

    /// Adds a bond whose equilibrium length comes from a bonding-rule lookup.
    ///
    /// An index without a matching atom yields the rule table's fallback length;
    /// the bond itself is then rejected when the blueprint is added to a system.
    pub fn bond_with_rules<B>(self, atom1: usize, atom2: usize, order: BondOrder, rules: &B) -> Self
    where
        B: BondingRules + ?Sized,
    {
        let element_of = |i: usize| self.atoms.get(i).map_or("", |a| a.element.as_str());
        let length = rules.ideal_length(element_of(atom1), element_of(atom2));
        self.bond(atom1, atom2, order, length)
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: u32) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = Some(energy);
        self
    }
}
