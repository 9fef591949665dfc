use super::atom::Atom;
use super::ids::{AtomId, BondId, MoleculeId};
use super::molecule::{AtomSpec, Molecule, MoleculeBlueprint, MoleculeUpdate};
use super::topology::{Bond, BondOrder};
use slotmap::SlotMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SystemError {
    #[error("Molecule not found in system: {0:?}")]
    MoleculeNotFound(MoleculeId),

    #[error("Atom {atom_id:?} does not belong to molecule {molecule_id:?}")]
    AtomNotInMolecule {
        atom_id: AtomId,
        molecule_id: MoleculeId,
    },

    #[error("Bond references atom index {index}, but the blueprint has {atom_count} atoms")]
    BondAtomOutOfRange { index: usize, atom_count: usize },

    #[error("Bond cannot join an atom to itself")]
    SelfBond,

    #[error("Invalid equilibrium bond length: {0}")]
    InvalidBondLength(f64),

    #[error("Atom position must be finite")]
    NonFinitePosition,

    #[error("Replacement atom list for molecule {0:?} does not match its atom identities")]
    AtomListMismatch(MoleculeId),
}

/// The set of molecules present in a lab session.
///
/// The system is the sole allocator of atom, bond and molecule identities,
/// which keeps atom identities unique across every molecule it holds.
/// Molecules are iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for molecules.
    molecules: SlotMap<MoleculeId, Molecule>,
    /// Insertion order of live molecules.
    order: Vec<MoleculeId>,
    /// Registry of allocated atom identities and their owning molecule.
    atom_owners: SlotMap<AtomId, MoleculeId>,
    /// Registry of allocated bond identities and their owning molecule.
    bond_owners: SlotMap<BondId, MoleculeId>,
}

impl MolecularSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of molecules in the system.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of atoms over all molecules.
    pub fn atom_count(&self) -> usize {
        self.atom_owners.len()
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    /// Returns an iterator over all molecules in insertion order.
    pub fn molecules_iter(&self) -> impl Iterator<Item = &Molecule> {
        self.order.iter().filter_map(|id| self.molecules.get(*id))
    }

    pub fn molecule_ids(&self) -> &[MoleculeId] {
        &self.order
    }

    /// Finds the molecule that owns an atom.
    pub fn owner_of(&self, atom_id: AtomId) -> Option<MoleculeId> {
        self.atom_owners.get(atom_id).copied()
    }

    pub fn contains_atom(&self, atom_id: AtomId) -> bool {
        self.atom_owners.contains_key(atom_id)
    }

    /// Adds a molecule built from a blueprint, allocating fresh identities.
    ///
    /// The blueprint is validated completely before anything is inserted, so a
    /// rejected blueprint leaves the system untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if an atom position is not finite, a bond index is
    /// out of range, a bond joins an atom to itself, or a bond length is negative
    /// or not finite.
    pub fn add_molecule(&mut self, blueprint: MoleculeBlueprint) -> Result<MoleculeId, SystemError> {
        if blueprint
            .atoms
            .iter()
            .any(|spec| !spec.position.iter().all(|c| c.is_finite()))
        {
            return Err(SystemError::NonFinitePosition);
        }
        let atom_count = blueprint.atoms.len();
        for spec in &blueprint.bonds {
            for index in [spec.atom1, spec.atom2] {
                if index >= atom_count {
                    return Err(SystemError::BondAtomOutOfRange { index, atom_count });
                }
            }
            if spec.atom1 == spec.atom2 {
                return Err(SystemError::SelfBond);
            }
            validate_bond_length(spec.length)?;
        }

        let MoleculeBlueprint {
            name,
            formula,
            charge,
            multiplicity,
            energy,
            atoms: atom_specs,
            bonds: bond_specs,
        } = blueprint;

        let atom_owners = &mut self.atom_owners;
        let bond_owners = &mut self.bond_owners;
        let id = self.molecules.insert_with_key(|molecule_id| {
            let atoms: Vec<Atom> = atom_specs
                .into_iter()
                .map(|spec| atom_from_spec(atom_owners.insert(molecule_id), spec))
                .collect();
            let bonds = bond_specs
                .into_iter()
                .map(|spec| {
                    Bond::new(
                        bond_owners.insert(molecule_id),
                        atoms[spec.atom1].id,
                        atoms[spec.atom2].id,
                        spec.order,
                        spec.length,
                    )
                })
                .collect();
            Molecule {
                id: molecule_id,
                name,
                atoms,
                bonds,
                formula,
                charge,
                multiplicity,
                energy,
            }
        });
        self.order.push(id);
        Ok(id)
    }

    /// Appends a new atom to an existing molecule.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::MoleculeNotFound`] if the molecule does not exist, or
    /// [`SystemError::NonFinitePosition`] for a non-finite position.
    pub fn add_atom(&mut self, molecule_id: MoleculeId, spec: AtomSpec) -> Result<AtomId, SystemError> {
        if !spec.position.iter().all(|c| c.is_finite()) {
            return Err(SystemError::NonFinitePosition);
        }
        let molecule = self
            .molecules
            .get_mut(molecule_id)
            .ok_or(SystemError::MoleculeNotFound(molecule_id))?;
        let atom_id = self.atom_owners.insert(molecule_id);
        molecule.atoms.push(atom_from_spec(atom_id, spec));
        Ok(atom_id)
    }

    /// Adds a bond between two atoms of the same molecule.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if the molecule does not exist, either atom belongs to
    /// another molecule, the atoms are the same, or the length is invalid.
    pub fn add_bond(
        &mut self,
        molecule_id: MoleculeId,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
        length: f64,
    ) -> Result<BondId, SystemError> {
        if !self.molecules.contains_key(molecule_id) {
            return Err(SystemError::MoleculeNotFound(molecule_id));
        }
        for atom_id in [atom1_id, atom2_id] {
            if self.owner_of(atom_id) != Some(molecule_id) {
                return Err(SystemError::AtomNotInMolecule {
                    atom_id,
                    molecule_id,
                });
            }
        }
        if atom1_id == atom2_id {
            return Err(SystemError::SelfBond);
        }
        validate_bond_length(length)?;

        let bond_id = self.bond_owners.insert(molecule_id);
        if let Some(molecule) = self.molecules.get_mut(molecule_id) {
            molecule
                .bonds
                .push(Bond::new(bond_id, atom1_id, atom2_id, order, length));
        }
        Ok(bond_id)
    }

    /// Updates the displayed formula of a molecule.
    pub fn set_formula(&mut self, molecule_id: MoleculeId, formula: String) -> Result<(), SystemError> {
        let molecule = self
            .molecules
            .get_mut(molecule_id)
            .ok_or(SystemError::MoleculeNotFound(molecule_id))?;
        molecule.formula = formula;
        Ok(())
    }

    /// Removes a molecule and releases its atom and bond identities.
    ///
    /// Any per-atom simulation state keyed by the released identities is not
    /// touched here; see `Simulation::remove_molecule` for the variant that also
    /// evicts it.
    pub fn remove_molecule(&mut self, id: MoleculeId) -> Option<Molecule> {
        let molecule = self.molecules.remove(id)?;
        self.order.retain(|&other| other != id);
        for atom in &molecule.atoms {
            self.atom_owners.remove(atom.id);
        }
        for bond in &molecule.bonds {
            self.bond_owners.remove(bond.id);
        }
        Some(molecule)
    }

    /// Replaces the entire atom list of a molecule in a single write.
    ///
    /// The replacement must carry exactly the same atom identities, in the same
    /// order, as the current list; only per-atom fields may differ.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::MoleculeNotFound`] or [`SystemError::AtomListMismatch`].
    pub fn replace_atoms(&mut self, id: MoleculeId, atoms: Vec<Atom>) -> Result<(), SystemError> {
        let molecule = self
            .molecules
            .get_mut(id)
            .ok_or(SystemError::MoleculeNotFound(id))?;
        if !same_identities(&molecule.atoms, &atoms) {
            return Err(SystemError::AtomListMismatch(id));
        }
        molecule.atoms = atoms;
        Ok(())
    }

    /// Applies a batch of per-molecule updates.
    ///
    /// Every update is checked before any is written; on error the system is
    /// left unchanged. Returns the number of molecules written.
    pub fn apply_updates(&mut self, updates: Vec<MoleculeUpdate>) -> Result<usize, SystemError> {
        for update in &updates {
            let molecule = self
                .molecules
                .get(update.molecule_id)
                .ok_or(SystemError::MoleculeNotFound(update.molecule_id))?;
            if !same_identities(&molecule.atoms, &update.atoms) {
                return Err(SystemError::AtomListMismatch(update.molecule_id));
            }
        }
        let written = updates.len();
        for update in updates {
            self.replace_atoms(update.molecule_id, update.atoms)?;
        }
        Ok(written)
    }
}

fn atom_from_spec(id: AtomId, spec: AtomSpec) -> Atom {
    Atom {
        id,
        element: spec.element,
        position: spec.position,
        charge: spec.charge,
        selected: false,
        hybridization: spec.hybridization,
    }
}

fn validate_bond_length(length: f64) -> Result<(), SystemError> {
    if length.is_finite() && length >= 0.0 {
        Ok(())
    } else {
        Err(SystemError::InvalidBondLength(length))
    }
}

fn same_identities(current: &[Atom], replacement: &[Atom]) -> bool {
    current.len() == replacement.len()
        && current
            .iter()
            .zip(replacement)
            .all(|(old, new)| old.id == new.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn water_like() -> MoleculeBlueprint {
        MoleculeBlueprint::new("Water", "H2O")
            .atom("O", Point3::origin(), -0.8)
            .atom("H", Point3::new(-0.96, 0.61, 0.0), 0.4)
            .atom("H", Point3::new(0.96, 0.61, 0.0), 0.4)
            .bond(0, 1, BondOrder::Single, 0.96)
            .bond(0, 2, BondOrder::Single, 0.96)
    }

    #[test]
    fn add_molecule_allocates_unique_identities() {
        let mut system = MolecularSystem::new();
        let first = system.add_molecule(water_like()).unwrap();
        let second = system.add_molecule(water_like()).unwrap();

        assert_eq!(system.len(), 2);
        assert_eq!(system.atom_count(), 6);

        let a = system.molecule(first).unwrap();
        let b = system.molecule(second).unwrap();
        for atom in &a.atoms {
            assert!(b.atom(atom.id).is_none());
            assert_eq!(system.owner_of(atom.id), Some(first));
        }
        assert_eq!(a.bonds[0].atom1_id, a.atoms[0].id);
        assert_eq!(a.bonds[1].atom2_id, a.atoms[2].id);
        assert_eq!(a.bonds[0].length(), 0.96);
    }

    #[test]
    fn add_molecule_rejects_out_of_range_bond_without_side_effects() {
        let mut system = MolecularSystem::new();
        let blueprint = water_like().bond(0, 7, BondOrder::Single, 1.0);

        let result = system.add_molecule(blueprint);

        assert_eq!(
            result,
            Err(SystemError::BondAtomOutOfRange {
                index: 7,
                atom_count: 3
            })
        );
        assert!(system.is_empty());
        assert_eq!(system.atom_count(), 0);
    }

    #[test]
    fn add_molecule_rejects_invalid_lengths_and_positions() {
        let mut system = MolecularSystem::new();
        assert_eq!(
            system.add_molecule(water_like().bond(1, 2, BondOrder::Single, -1.0)),
            Err(SystemError::InvalidBondLength(-1.0))
        );
        assert_eq!(
            system.add_molecule(water_like().bond(1, 1, BondOrder::Single, 1.0)),
            Err(SystemError::SelfBond)
        );
        assert_eq!(
            system.add_molecule(
                MoleculeBlueprint::new("Bad", "X").atom("C", Point3::new(f64::NAN, 0.0, 0.0), 0.0)
            ),
            Err(SystemError::NonFinitePosition)
        );
    }

    #[test]
    fn molecules_iter_preserves_insertion_order_after_removal() {
        let mut system = MolecularSystem::new();
        let a = system.add_molecule(water_like()).unwrap();
        let b = system.add_molecule(water_like()).unwrap();
        system.remove_molecule(a);
        let c = system.add_molecule(water_like()).unwrap();

        let ids: Vec<_> = system.molecules_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![b, c]);
        assert_eq!(system.molecule_ids(), &[b, c]);
    }

    #[test]
    fn remove_molecule_releases_atom_identities() {
        let mut system = MolecularSystem::new();
        let id = system.add_molecule(water_like()).unwrap();
        let atom_ids: Vec<_> = system.molecule(id).unwrap().atom_ids().collect();

        let removed = system.remove_molecule(id).unwrap();

        assert_eq!(removed.atoms.len(), 3);
        assert!(system.molecule(id).is_none());
        assert_eq!(system.atom_count(), 0);
        for atom_id in atom_ids {
            assert!(!system.contains_atom(atom_id));
        }
        assert!(system.remove_molecule(id).is_none());
    }

    #[test]
    fn replace_atoms_swaps_whole_list() {
        let mut system = MolecularSystem::new();
        let id = system.add_molecule(water_like()).unwrap();
        let moved: Vec<Atom> = system
            .molecule(id)
            .unwrap()
            .atoms
            .iter()
            .map(|a| a.with_position(a.position + nalgebra::Vector3::new(1.0, 0.0, 0.0)))
            .collect();

        system.replace_atoms(id, moved.clone()).unwrap();

        assert_eq!(system.molecule(id).unwrap().atoms, moved);
    }

    #[test]
    fn replace_atoms_rejects_mismatched_identities() {
        let mut system = MolecularSystem::new();
        let id = system.add_molecule(water_like()).unwrap();
        let mut atoms = system.molecule(id).unwrap().atoms.clone();
        atoms.swap(0, 1);

        assert_eq!(
            system.replace_atoms(id, atoms),
            Err(SystemError::AtomListMismatch(id))
        );

        let truncated = system.molecule(id).unwrap().atoms[..2].to_vec();
        assert_eq!(
            system.replace_atoms(id, truncated),
            Err(SystemError::AtomListMismatch(id))
        );
    }

    #[test]
    fn apply_updates_is_all_or_nothing() {
        let mut system = MolecularSystem::new();
        let a = system.add_molecule(water_like()).unwrap();
        let b = system.add_molecule(water_like()).unwrap();
        let original_a = system.molecule(a).unwrap().clone();

        let moved_a = MoleculeUpdate {
            molecule_id: a,
            atoms: original_a
                .atoms
                .iter()
                .map(|atom| atom.with_position(Point3::new(5.0, 5.0, 5.0)))
                .collect(),
        };
        let broken_b = MoleculeUpdate {
            molecule_id: b,
            atoms: Vec::new(),
        };

        let result = system.apply_updates(vec![moved_a.clone(), broken_b]);
        assert_eq!(result, Err(SystemError::AtomListMismatch(b)));
        assert_eq!(system.molecule(a).unwrap(), &original_a);

        assert_eq!(system.apply_updates(vec![moved_a]), Ok(1));
        assert_eq!(
            system.molecule(a).unwrap().atoms[0].position,
            Point3::new(5.0, 5.0, 5.0)
        );
    }

    #[test]
    fn add_atom_and_bond_extend_existing_molecule() {
        let mut system = MolecularSystem::new();
        let id = system.add_molecule(water_like()).unwrap();
        let oxygen = system.molecule(id).unwrap().atoms[0].id;

        let new_atom = system
            .add_atom(
                id,
                AtomSpec {
                    element: "H".to_string(),
                    position: Point3::new(0.0, -0.96, 0.0),
                    charge: 0.0,
                    hybridization: None,
                },
            )
            .unwrap();
        let bond = system
            .add_bond(id, oxygen, new_atom, BondOrder::Single, 0.96)
            .unwrap();

        let molecule = system.molecule(id).unwrap();
        assert_eq!(molecule.atoms.len(), 4);
        assert_eq!(molecule.bonds.last().unwrap().id, bond);
        assert_eq!(system.owner_of(new_atom), Some(id));
    }

    #[test]
    fn add_bond_rejects_atoms_from_other_molecules() {
        let mut system = MolecularSystem::new();
        let a = system.add_molecule(water_like()).unwrap();
        let b = system.add_molecule(water_like()).unwrap();
        let atom_a = system.molecule(a).unwrap().atoms[0].id;
        let atom_b = system.molecule(b).unwrap().atoms[0].id;

        assert_eq!(
            system.add_bond(a, atom_a, atom_b, BondOrder::Single, 1.0),
            Err(SystemError::AtomNotInMolecule {
                atom_id: atom_b,
                molecule_id: a
            })
        );
    }
}
