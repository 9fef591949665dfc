//! Interactive atom placement: dropping a single atom into a lab session.

use crate::core::bonding::BondingRules;
use crate::core::models::ids::{AtomId, BondId, MoleculeId};
use crate::core::models::molecule::{AtomSpec, MoleculeBlueprint};
use crate::core::models::system::{MolecularSystem, SystemError};
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use tracing::debug;

/// Atoms farther than this from a new atom are never considered as partners.
pub const BOND_SEARCH_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub molecule_id: MoleculeId,
    pub atom_id: AtomId,
    /// Bond joining the new atom to its partner, if it joined a molecule.
    pub bond_id: Option<BondId>,
    pub created_molecule: bool,
}

/// Places a new atom of `element` at `position`.
///
/// The first molecule (in system order) holding an atom within
/// [`BOND_SEARCH_RADIUS`] that `rules` allows bonding to at that distance is
/// extended: the atom is appended, singly bonded to the first such atom at the
/// rule's ideal length, and `"+<element>"` is appended to the formula.
/// Otherwise the atom becomes a new molecule of its own.
///
/// # Errors
///
/// Returns [`SystemError::NonFinitePosition`] for a non-finite position.
pub fn place_atom<B>(
    system: &mut MolecularSystem,
    element: &str,
    position: Point3<f64>,
    rules: &B,
) -> Result<Placement, SystemError>
where
    B: BondingRules + ?Sized,
{
    if !position.iter().all(|c| c.is_finite()) {
        return Err(SystemError::NonFinitePosition);
    }

    let partner = system.molecules_iter().find_map(|molecule| {
        molecule
            .atoms
            .iter()
            .find(|atom| {
                let dist = (atom.position - position).norm();
                dist <= BOND_SEARCH_RADIUS && rules.can_bond(element, &atom.element, dist)
            })
            .map(|atom| {
                (
                    molecule.id,
                    atom.id,
                    rules.ideal_length(element, &atom.element),
                    format!("{}+{}", molecule.formula, element),
                )
            })
    });

    let spec = AtomSpec {
        element: element.to_string(),
        position,
        charge: 0.0,
        hybridization: None,
    };

    match partner {
        Some((molecule_id, partner_id, length, formula)) => {
            let atom_id = system.add_atom(molecule_id, spec)?;
            let bond_id =
                system.add_bond(molecule_id, partner_id, atom_id, BondOrder::Single, length)?;
            system.set_formula(molecule_id, formula)?;
            debug!(element, length, "Bonded new atom to an existing molecule.");
            Ok(Placement {
                molecule_id,
                atom_id,
                bond_id: Some(bond_id),
                created_molecule: false,
            })
        }
        None => {
            let blueprint = MoleculeBlueprint::new(&format!("{element} atom"), element).atom(
                element,
                position,
                0.0,
            );
            let molecule_id = system.add_molecule(blueprint)?;
            let atom_id = system
                .molecule(molecule_id)
                .and_then(|m| m.atoms.first())
                .map(|a| a.id)
                .ok_or(SystemError::MoleculeNotFound(molecule_id))?;
            debug!(element, "Placed atom as a new molecule.");
            Ok(Placement {
                molecule_id,
                atom_id,
                bond_id: None,
                created_molecule: true,
            })
        }
    }
}
