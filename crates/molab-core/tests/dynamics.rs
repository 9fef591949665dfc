use molab::core::builders;
use molab::core::forcefield::evaluator::ForceEvaluator;
use molab::core::forcefield::params::ForceFieldParams;
use molab::core::models::atom::Atom;
use molab::core::models::ids::AtomId;
use molab::core::models::molecule::{Molecule, MoleculeBlueprint, TopologyError};
use molab::core::models::system::MolecularSystem;
use molab::core::models::topology::{Bond, BondOrder};
use molab::engine::config::{DynamicsConfig, DynamicsConfigBuilder, Interval, ThermalConfig};
use molab::engine::progress::ProgressReporter;
use molab::engine::state::{AtomDynamics, DynamicsState};
use molab::engine::thermal::{ThermalInitializer, velocity_half_width};
use molab::workflows::step::{StepContext, step};
use molab::workflows::{Simulation, SimulationControls, SimulationPhase};
use nalgebra::{Point3, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::rngs::mock::StepRng;
use std::collections::HashMap;

const FRAME: f64 = 1.0 / 60.0;

fn lab_system() -> MolecularSystem {
    let mut system = MolecularSystem::new();
    system
        .add_molecule(builders::water(Point3::new(-3.0, 2.0, 0.0)))
        .unwrap();
    system
        .add_molecule(builders::methane(Point3::new(3.0, 2.0, 0.0)))
        .unwrap();
    system
        .add_molecule(builders::carbon_dioxide(Point3::new(0.0, 5.0, 2.0)))
        .unwrap();
    system
}

fn lone_atom() -> (MolecularSystem, AtomId) {
    let mut system = MolecularSystem::new();
    let id = system
        .add_molecule(MoleculeBlueprint::new("Argon", "Ar").atom("Ar", Point3::origin(), 0.0))
        .unwrap();
    let atom_id = system.molecule(id).unwrap().atoms[0].id;
    (system, atom_id)
}

fn quiet_config() -> DynamicsConfig {
    DynamicsConfigBuilder::new().jitter_scale(0.0).build().unwrap()
}

fn positions(system: &MolecularSystem) -> Vec<Point3<f64>> {
    system
        .molecules_iter()
        .flat_map(|m| m.atoms.iter().map(|a| a.position))
        .collect()
}

#[test]
fn paused_simulation_never_changes_anything() {
    let mut system = lab_system();
    let before = positions(&system);
    let mut simulation = Simulation::seeded(DynamicsConfig::default(), 5);
    let paused = SimulationControls::paused(298.15);

    for _ in 0..100 {
        let report = simulation.tick(&mut system, &paused, FRAME).unwrap();
        assert_eq!(report.phase, SimulationPhase::Idle);
        assert_eq!(report.stepped, 0);
    }

    assert_eq!(positions(&system), before);
    assert!(simulation.state().is_empty());
}

#[test]
fn pausing_preserves_velocities() {
    let mut system = lab_system();
    let mut simulation = Simulation::seeded(DynamicsConfig::default(), 5);
    simulation
        .tick(&mut system, &SimulationControls::running(298.15), FRAME)
        .unwrap();
    let velocities: Vec<_> = simulation.state().iter().map(|(id, d)| (id, *d)).collect();
    let frozen = positions(&system);

    for _ in 0..10 {
        simulation
            .tick(&mut system, &SimulationControls::paused(600.0), FRAME)
            .unwrap();
    }

    for (id, dynamics) in velocities {
        assert_eq!(simulation.state().get(id), Some(&dynamics));
    }
    assert_eq!(positions(&system), frozen);
}

#[test]
fn constant_randomness_gives_bit_identical_trajectories() {
    let run = || {
        let mut system = lab_system();
        let mut simulation =
            Simulation::with_rng(DynamicsConfig::default(), StepRng::new(0, 0x9E37_79B9_7F4A_7C15));
        for _ in 0..200 {
            simulation
                .tick(&mut system, &SimulationControls::running(298.15), FRAME)
                .unwrap();
        }
        positions(&system)
    };

    let first = run();
    let second = run();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.coords.map(f64::to_bits), b.coords.map(f64::to_bits));
    }
}

#[test]
fn identical_molecules_follow_identical_relative_trajectories() {
    let offset = Vector3::new(8.0, 0.0, 0.0);
    let mut system = MolecularSystem::new();
    let left = system
        .add_molecule(builders::water(Point3::new(-4.0, 4.0, 0.0)))
        .unwrap();
    let right = system
        .add_molecule(builders::water(Point3::new(-4.0, 4.0, 0.0) + offset))
        .unwrap();
    let mut simulation = Simulation::with_rng(DynamicsConfig::default(), StepRng::new(0, 0));

    for _ in 0..150 {
        simulation
            .tick(&mut system, &SimulationControls::running(298.15), FRAME)
            .unwrap();
        let a = &system.molecule(left).unwrap().atoms;
        let b = &system.molecule(right).unwrap().atoms;
        for (atom_a, atom_b) in a.iter().zip(b) {
            let drift = (atom_b.position - atom_a.position) - offset;
            assert!(drift.norm() < 1e-9, "relative drift {drift:?}");
        }
    }

    let moved = &system.molecule(left).unwrap().atoms[0].position;
    assert_ne!(*moved, Point3::new(-4.0, 4.0, 0.0));
}

#[test]
fn velocity_width_scales_with_square_root_of_temperature() {
    let thermal = ThermalConfig::default();
    let ratio = velocity_half_width(600.0, thermal.gas_constant)
        / velocity_half_width(300.0, thermal.gas_constant);
    assert!((ratio - 2f64.sqrt()).abs() < 1e-12);

    let cold = ThermalInitializer::new(&thermal, 300.0).seed(&mut StepRng::new(0, 0));
    let hot = ThermalInitializer::new(&thermal, 600.0).seed(&mut StepRng::new(0, 0));
    for axis in 0..3 {
        assert!((hot.velocity[axis] / cold.velocity[axis] - 2f64.sqrt()).abs() < 1e-12);
    }
}

#[test]
fn empirical_velocity_variance_is_linear_in_temperature() {
    let thermal = ThermalConfig::default();
    let variance = |temperature: f64| {
        let initializer = ThermalInitializer::new(&thermal, temperature);
        let mut rng = StdRng::seed_from_u64(11);
        let samples = 20_000;
        let sum: f64 = (0..samples)
            .map(|_| initializer.seed(&mut rng).velocity.x.powi(2))
            .sum();
        sum / samples as f64
    };

    let ratio = variance(600.0) / variance(300.0);
    assert!((ratio - 2.0).abs() < 0.1, "variance ratio was {ratio}");
}

#[test]
fn lone_atom_velocity_decays_geometrically() {
    let (mut system, atom_id) = lone_atom();
    let mut simulation = Simulation::seeded(quiet_config(), 0);
    simulation
        .state_mut()
        .insert(atom_id, AtomDynamics::with_velocity(Vector3::new(1.0, 0.0, 0.0)));

    let mut previous = 1.0;
    for _ in 0..1500 {
        simulation
            .tick(&mut system, &SimulationControls::running(298.15), FRAME)
            .unwrap();
        let speed = simulation.state().get(atom_id).unwrap().velocity.x;
        assert_eq!(speed, previous * 0.99);
        assert!(speed < previous);
        assert!(speed > 0.0);
        previous = speed;
    }
}

#[test]
fn positions_stay_inside_bounding_box() {
    let mut system = lab_system();
    let mut simulation = Simulation::seeded(DynamicsConfig::default(), 17);
    let atom_ids: Vec<_> = system
        .molecules_iter()
        .flat_map(|m| m.atom_ids().collect::<Vec<_>>())
        .collect();
    for (i, id) in atom_ids.into_iter().enumerate() {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        simulation.state_mut().insert(
            id,
            AtomDynamics::with_velocity(Vector3::new(500.0 * sign, -800.0, 300.0 * sign)),
        );
    }
    let bounds = simulation.config().integrator.bounds;

    for _ in 0..300 {
        simulation
            .tick(&mut system, &SimulationControls::running(2000.0), FRAME)
            .unwrap();
        for position in positions(&system) {
            assert!(bounds.contains(&position), "{position:?} escaped the box");
        }
    }
}

#[test]
fn reversed_bounds_snap_without_panicking() {
    let mut config = DynamicsConfig::default();
    config.integrator.bounds.x = Interval::new(5.0, -5.0);
    let bounds = config.integrator.bounds;
    let mut system = lab_system();
    let mut simulation = Simulation::seeded(config, 1);

    for _ in 0..60 {
        simulation
            .tick(&mut system, &SimulationControls::running(298.15), FRAME)
            .unwrap();
    }
    for position in positions(&system) {
        assert!((-5.0..=5.0).contains(&position.x), "{position:?}");
        assert!(bounds.contains(&position));
    }
}

fn bonded_pair(separation: f64) -> Molecule {
    let mut system = MolecularSystem::new();
    let id = system
        .add_molecule(
            MoleculeBlueprint::new("Hydroxyl", "OH")
                .atom("O", Point3::origin(), 0.0)
                .atom("H", Point3::new(0.0, 0.0, separation), 0.0)
                .bond(0, 1, BondOrder::Single, 0.96),
        )
        .unwrap();
    system.molecule(id).unwrap().clone()
}

#[test]
fn stretched_spring_restores_with_expected_magnitude() {
    let params = ForceFieldParams::default();
    let evaluator = ForceEvaluator::new(&params);

    let stretched = bonded_pair(2.0);
    let forces = evaluator.pair_forces(&stretched.index().unwrap());
    assert!((forces[0].norm() - 104.0).abs() < 1e-9);
    assert!(forces[0].z > 0.0, "oxygen should be pulled toward hydrogen");
    assert!(forces[1].z < 0.0, "hydrogen should be pulled toward oxygen");

    let compressed = bonded_pair(0.5);
    let forces = evaluator.pair_forces(&compressed.index().unwrap());
    assert!(forces[0].z < 0.0);
    assert!(forces[1].z > 0.0);
}

#[test]
fn net_forces_do_not_depend_on_atom_order() {
    let params = ForceFieldParams::default();
    let evaluator = ForceEvaluator::new(&params);
    let mut system = MolecularSystem::new();
    let id = system
        .add_molecule(builders::methane(Point3::origin()))
        .unwrap();
    let mut molecule = system.molecule(id).unwrap().clone();
    // Distort so that every pair contributes.
    for (i, atom) in molecule.atoms.iter_mut().enumerate() {
        atom.position += Vector3::new(0.05 * i as f64, -0.03 * i as f64, 0.02);
    }

    let by_id = |molecule: &Molecule| -> HashMap<AtomId, Vector3<f64>> {
        let forces = evaluator.pair_forces(&molecule.index().unwrap());
        molecule.atom_ids().zip(forces).collect()
    };

    let forward = by_id(&molecule);
    let mut permuted = molecule.clone();
    permuted.atoms.reverse();
    permuted.atoms.swap(0, 2);
    permuted.bonds.reverse();
    let shuffled = by_id(&permuted);

    for (id, force) in &forward {
        let tolerance = 1e-12 * (1.0 + force.norm());
        assert!((force - shuffled[id]).norm() < tolerance);
    }
}

#[test]
fn invalid_molecule_is_skipped_with_state_retained() {
    let system = lab_system();
    let mut molecules: Vec<Molecule> = system.molecules_iter().cloned().collect();
    let foreign_atom = molecules[1].atoms[0].id;
    let broken_bond = Bond::new(
        molecules[0].bonds[0].id,
        molecules[0].atoms[0].id,
        foreign_atom,
        BondOrder::Single,
        1.0,
    );
    molecules[0].bonds.push(broken_bond);

    let mut state = DynamicsState::new();
    let tracked = molecules[0].atoms[1].id;
    let remembered = AtomDynamics::with_velocity(Vector3::new(0.3, -0.2, 0.1));
    state.insert(tracked, remembered);

    let config = DynamicsConfig::default();
    let reporter = ProgressReporter::new();
    let outcome = step(
        &mut state,
        &molecules,
        &SimulationControls::running(298.15),
        FRAME,
        &StepContext::new(&config, &reporter),
        &mut StdRng::seed_from_u64(2),
    );

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].molecule_id, molecules[0].id);
    assert!(matches!(
        outcome.skipped[0].reason,
        TopologyError::DanglingBond { atom_id, .. } if atom_id == foreign_atom
    ));
    assert_eq!(outcome.updates.len(), 2);
    assert!(outcome.updates.iter().all(|u| u.molecule_id != molecules[0].id));

    assert_eq!(state.get(tracked), Some(&remembered));
    assert!(!state.contains(molecules[0].atoms[0].id));
    assert!(!state.contains(molecules[0].atoms[2].id));
    assert!(molecules[1].atom_ids().all(|id| state.contains(id)));
}

#[test]
fn step_accepts_plain_molecule_slices() {
    let system = lab_system();
    let molecules: Vec<Molecule> = system.molecules_iter().cloned().collect();
    let config = DynamicsConfig::default();
    let reporter = ProgressReporter::new();
    let mut state = DynamicsState::new();

    let outcome = step(
        &mut state,
        &molecules,
        &SimulationControls::running(298.15),
        FRAME,
        &StepContext::new(&config, &reporter),
        &mut StdRng::seed_from_u64(2),
    );

    assert_eq!(outcome.updates.len(), molecules.len());
    for (update, molecule) in outcome.updates.iter().zip(&molecules) {
        assert_eq!(update.molecule_id, molecule.id);
        let ids: Vec<_> = update.atoms.iter().map(|a| a.id).collect();
        assert_eq!(ids, molecule.atom_ids().collect::<Vec<_>>());
        for (new, old) in update.atoms.iter().zip(&molecule.atoms) {
            assert_eq!(new.element, old.element);
            assert_eq!(new.charge, old.charge);
        }
    }
    // The inputs themselves are never written.
    assert_eq!(
        molecules,
        system.molecules_iter().cloned().collect::<Vec<_>>()
    );
}

#[test]
fn removing_a_molecule_evicts_its_dynamics() {
    let mut system = lab_system();
    let mut simulation = Simulation::seeded(DynamicsConfig::default(), 8);
    simulation
        .tick(&mut system, &SimulationControls::running(298.15), FRAME)
        .unwrap();
    assert_eq!(simulation.state().len(), system.atom_count());

    let doomed = system.molecule_ids()[1];
    let removed = simulation.remove_molecule(&mut system, doomed).unwrap();

    assert_eq!(simulation.state().len(), system.atom_count());
    assert!(removed.atom_ids().all(|id| !simulation.state().contains(id)));

    // New molecules reuse slot storage but never inherit stale velocities.
    system
        .add_molecule(builders::ammonia(Point3::new(0.0, -2.0, 0.0)))
        .unwrap();
    let newcomer = system.molecules_iter().last().unwrap();
    assert!(newcomer.atom_ids().all(|id| !simulation.state().contains(id)));
}

fn lone_atom_velocity_after(temperatures: &[f64], reseed: bool) -> f64 {
    let (mut system, atom_id) = lone_atom();
    let config = DynamicsConfigBuilder::from_config(quiet_config())
        .reseed_on_temperature_change(reseed)
        .build()
        .unwrap();
    let mut simulation = Simulation::with_rng(config, StepRng::new(0, 0));
    for &temperature in temperatures {
        simulation
            .tick(&mut system, &SimulationControls::running(temperature), FRAME)
            .unwrap();
    }
    simulation.state().get(atom_id).unwrap().velocity.x
}

#[test]
fn temperature_change_reseeds_when_enabled() {
    let k = ThermalConfig::default().gas_constant;
    let v = lone_atom_velocity_after(&[300.0, 600.0], true);
    let expected = -velocity_half_width(600.0, k) * 0.99;
    assert!((v - expected).abs() < 1e-12, "{v} vs {expected}");
}

#[test]
fn temperature_change_keeps_velocities_when_disabled() {
    let k = ThermalConfig::default().gas_constant;
    let v = lone_atom_velocity_after(&[300.0, 600.0], false);
    let expected = -velocity_half_width(300.0, k) * 0.99 * 0.99;
    assert!((v - expected).abs() < 1e-12, "{v} vs {expected}");
}

#[test]
fn unchanged_temperature_never_reseeds() {
    let k = ThermalConfig::default().gas_constant;
    let v = lone_atom_velocity_after(&[300.0, 300.0, 300.0], true);
    let expected = -velocity_half_width(300.0, k) * 0.99f64.powi(3);
    assert!((v - expected).abs() < 1e-12, "{v} vs {expected}");
}
