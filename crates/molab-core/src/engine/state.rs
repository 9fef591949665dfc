use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use nalgebra::Vector3;
use slotmap::SecondaryMap;

/// Velocity and last net force of one atom.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AtomDynamics {
    pub velocity: Vector3<f64>,
    pub force: Vector3<f64>,
}

impl AtomDynamics {
    pub fn at_rest() -> Self {
        Self::default()
    }

    pub fn with_velocity(velocity: Vector3<f64>) -> Self {
        Self {
            velocity,
            force: Vector3::zeros(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.velocity.iter().chain(self.force.iter()).all(|c| c.is_finite())
    }
}

/// Per-atom dynamical state carried between ticks.
///
/// Keyed by atom identity; an atom with no entry is "untracked" and is seeded
/// on the next running tick that sees it.
#[derive(Debug, Clone, Default)]
pub struct DynamicsState {
    atoms: SecondaryMap<AtomId, AtomDynamics>,
    /// Temperature seen on the most recent running tick.
    pub(crate) last_temperature: Option<f64>,
}

impl DynamicsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, atom_id: AtomId) -> Option<&AtomDynamics> {
        self.atoms.get(atom_id)
    }

    pub fn insert(&mut self, atom_id: AtomId, dynamics: AtomDynamics) -> Option<AtomDynamics> {
        self.atoms.insert(atom_id, dynamics)
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms.contains_key(atom_id)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn last_temperature(&self) -> Option<f64> {
        self.last_temperature
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &AtomDynamics)> {
        self.atoms.iter()
    }

    /// Drops the state of the given atoms. Returns how many entries were removed.
    pub fn evict<I>(&mut self, atom_ids: I) -> usize
    where
        I: IntoIterator<Item = AtomId>,
    {
        atom_ids
            .into_iter()
            .filter(|&id| self.atoms.remove(id).is_some())
            .count()
    }

    /// Drops state for every atom no longer present in `system`.
    pub fn retain_present(&mut self, system: &MolecularSystem) -> usize {
        let before = self.atoms.len();
        self.atoms.retain(|id, _| system.contains_atom(id));
        before - self.atoms.len()
    }

    pub fn clear(&mut self) {
        self.atoms.clear();
        self.last_temperature = None;
    }
}
