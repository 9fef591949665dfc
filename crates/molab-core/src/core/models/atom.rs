use super::ids::AtomId;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Orbital hybridization tag carried by some atoms for display and bookkeeping.
///
/// The dynamics core never reads this value; it is copied through unchanged
/// whenever an atom list is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hybridization {
    Sp,
    Sp2,
    Sp3,
    Sp3d,
    Sp3d2,
}

impl FromStr for Hybridization {
    type Err = ();

    /// Parses a hybridization label such as `"sp3"`.
    ///
    /// Parsing is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `()` if the label is not a recognised hybridization.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sp" => Ok(Self::Sp),
            "sp2" => Ok(Self::Sp2),
            "sp3" => Ok(Self::Sp3),
            "sp3d" => Ok(Self::Sp3d),
            "sp3d2" => Ok(Self::Sp3d2),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sp => "sp",
            Self::Sp2 => "sp2",
            Self::Sp3 => "sp3",
            Self::Sp3d => "sp3d",
            Self::Sp3d2 => "sp3d2",
        };
        f.write_str(label)
    }
}

/// Represents a single atom owned by a molecule.
///
/// The identity is allocated by [`MolecularSystem`](super::system::MolecularSystem)
/// and is unique across the whole system. Position is the only field the
/// dynamics step ever changes; every other field is carried through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Globally unique identity of this atom.
    pub id: AtomId,
    /// Element symbol (e.g., "O", "H", "Cl").
    pub element: String,
    /// Cartesian position in Angstroms.
    pub position: Point3<f64>,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Whether the atom is currently selected by the host application.
    pub selected: bool,
    /// Optional hybridization tag.
    pub hybridization: Option<Hybridization>,
}

impl Atom {
    /// Creates a new, unselected, neutral `Atom` without a hybridization tag.
    ///
    /// # Arguments
    ///
    /// * `id` - The identity allocated for this atom.
    /// * `element` - The element symbol.
    /// * `position` - The Cartesian position of the atom.
    pub fn new(id: AtomId, element: &str, position: Point3<f64>) -> Self {
        Self {
            id,
            element: element.to_string(),
            position,
            charge: 0.0,
            selected: false,
            hybridization: None,
        }
    }

    /// Returns a copy of this atom moved to `position`, with every other field intact.
    pub fn with_position(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    pub fn has_finite_position(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}
