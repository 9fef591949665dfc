use super::params::ForceFieldParams;
use super::potentials::{
    harmonic_spring_energy, harmonic_spring_force, lennard_jones_energy, lennard_jones_force,
};
use crate::core::models::molecule::MoleculeIndex;
use nalgebra::Vector3;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

/// Evaluates intramolecular forces for one molecule at a time.
///
/// Every unordered pair of distinct atoms is visited once: bonded pairs feel
/// the harmonic spring, other pairs inside the cutoff feel Lennard-Jones. Pairs
/// at zero separation are skipped. Forces returned are indexed by atom slot.
#[derive(Debug, Clone, Copy)]
pub struct ForceEvaluator<'a> {
    params: &'a ForceFieldParams,
}

impl<'a> ForceEvaluator<'a> {
    pub fn new(params: &'a ForceFieldParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForceFieldParams {
        self.params
    }

    /// Deterministic pair forces (springs and Lennard-Jones).
    pub fn pair_forces(&self, index: &MoleculeIndex<'_>) -> Vec<Vector3<f64>> {
        let atoms = &index.molecule().atoms;
        let mut forces = vec![Vector3::zeros(); atoms.len()];

        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                let separation = atoms[i].position - atoms[j].position;
                let dist = separation.norm();
                if dist == 0.0 {
                    continue;
                }

                let magnitude = match index.bond_between(atoms[i].id, atoms[j].id) {
                    Some(bond) => {
                        harmonic_spring_force(dist, bond.length(), self.params.spring_constant)
                    }
                    None if dist < self.params.nonbonded_cutoff => {
                        lennard_jones_force(dist, self.params.lj_sigma, self.params.lj_epsilon)
                    }
                    None => continue,
                };

                let force = separation * (magnitude / dist);
                forces[i] += force;
                forces[j] -= force;
            }
        }
        forces
    }

    /// One random kick per atom, each component uniform in `±0.5 × amplitude`.
    ///
    /// Draws exactly three samples per atom, in slot order.
    pub fn thermal_jitter<R: Rng + ?Sized>(
        &self,
        atom_count: usize,
        temperature: f64,
        rng: &mut R,
    ) -> Vec<Vector3<f64>> {
        let amplitude = self.params.jitter_amplitude(temperature);
        let unit = Uniform::new(-0.5_f64, 0.5);
        let mut kicks = Vec::with_capacity(atom_count);
        for _ in 0..atom_count {
            let x = unit.sample(rng);
            let y = unit.sample(rng);
            let z = unit.sample(rng);
            kicks.push(Vector3::new(x, y, z) * amplitude);
        }
        kicks
    }

    /// Net force on every atom: pair forces plus thermal jitter.
    pub fn net_forces<R: Rng + ?Sized>(
        &self,
        index: &MoleculeIndex<'_>,
        temperature: f64,
        rng: &mut R,
    ) -> Vec<Vector3<f64>> {
        let mut forces = self.pair_forces(index);
        let jitter = self.thermal_jitter(forces.len(), temperature, rng);
        for (force, kick) in forces.iter_mut().zip(jitter) {
            *force += kick;
        }
        forces
    }

    /// Total bonded plus non-bonded potential energy of the molecule.
    pub fn potential_energy(&self, index: &MoleculeIndex<'_>) -> f64 {
        let atoms = &index.molecule().atoms;
        let mut energy = 0.0;
        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                let dist = (atoms[i].position - atoms[j].position).norm();
                if dist == 0.0 {
                    continue;
                }
                energy += match index.bond_between(atoms[i].id, atoms[j].id) {
                    Some(bond) => {
                        harmonic_spring_energy(dist, bond.length(), self.params.spring_constant)
                    }
                    None if dist < self.params.nonbonded_cutoff => {
                        lennard_jones_energy(dist, self.params.lj_sigma, self.params.lj_epsilon)
                    }
                    None => 0.0,
                };
            }
        }
        energy
    }
}
