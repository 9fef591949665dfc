use super::ids::{AtomId, BondId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// A covalent bond between two atoms of the same molecule.
///
/// The equilibrium length is fixed when the bond is created (usually from a
/// bonding-rule lookup) and can only be read afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub id: BondId,
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub order: BondOrder,
    length: f64, // Equilibrium length in Angstroms
}

impl Bond {
    pub fn new(
        id: BondId,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
        length: f64,
    ) -> Self {
        Self {
            id,
            atom1_id,
            atom2_id,
            order,
            length,
        }
    }

    /// Equilibrium length of the bond in Angstroms.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// Returns `true` if this bond joins `a` and `b`, in either order.
    pub fn connects(&self, a: AtomId, b: AtomId) -> bool {
        (self.atom1_id == a && self.atom2_id == b) || (self.atom1_id == b && self.atom2_id == a)
    }

    /// Returns the atom on the other end of the bond from `atom_id`.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }

    /// The atom pair in a canonical (sorted) order, suitable as a lookup key.
    pub fn key(&self) -> (AtomId, AtomId) {
        pair_key(self.atom1_id, self.atom2_id)
    }
}

#[inline]
pub fn pair_key(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}
