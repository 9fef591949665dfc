use crate::cli::RunArgs;
use crate::config::{CustomMolecule, MoleculeEntry, PartialScenario, Scenario};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use molab::core::bonding::{BondingRuleTable, BondingRules, StandardBondingRules};
use molab::core::builders::Preset;
use molab::core::models::atom::Hybridization;
use molab::core::models::molecule::MoleculeBlueprint;
use molab::core::models::system::MolecularSystem;
use molab::core::models::topology::BondOrder;
use molab::core::placement::place_atom;
use molab::engine::progress::ProgressReporter;
use molab::workflows::{Simulation, SimulationControls};
use nalgebra::Point3;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct RunSnapshot {
    ticks: u64,
    temperature: f64,
    seed: Option<u64>,
    skipped_steps: usize,
    molecules: Vec<MoleculeSnapshot>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct MoleculeSnapshot {
    name: String,
    formula: String,
    potential_energy: Option<f64>,
    atoms: Vec<AtomSnapshot>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct AtomSnapshot {
    element: String,
    position: [f64; 3],
    speed: f64,
}

pub fn run(args: RunArgs) -> Result<()> {
    let scenario = PartialScenario::from_file(&args.scenario)?.merge_with_cli(&args)?;
    debug!("Resolved scenario: {:?}", scenario);

    let snapshot = simulate(&scenario, Some(&CliProgressHandler::new()))?;

    match &args.output {
        Some(path) => {
            let content = toml::to_string_pretty(&snapshot)
                .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to serialize results: {e}")))?;
            std::fs::write(path, content)?;
            info!("Final state written to {:?}", path);
        }
        None => print!("{}", render(&snapshot)),
    }
    Ok(())
}

fn load_rules(scenario: &Scenario) -> Result<Box<dyn BondingRules>> {
    Ok(match &scenario.bonding_rules {
        Some(path) => {
            info!("Loading bonding rules from {:?}", path);
            Box::new(BondingRuleTable::from_csv(path)?)
        }
        None => Box::new(StandardBondingRules),
    })
}

fn custom_blueprint(custom: &CustomMolecule, rules: &dyn BondingRules) -> Result<MoleculeBlueprint> {
    let formula = custom.formula.as_deref().unwrap_or(&custom.name);
    let mut blueprint = MoleculeBlueprint::new(&custom.name, formula);
    if let Some(charge) = custom.charge {
        blueprint = blueprint.with_charge(charge);
    }
    if let Some(multiplicity) = custom.multiplicity {
        blueprint = blueprint.with_multiplicity(multiplicity);
    }

    for atom in &custom.atoms {
        let position = Point3::from(atom.position);
        blueprint = match &atom.hybridization {
            Some(label) => {
                let hybridization: Hybridization = label.parse().map_err(|_| {
                    CliError::Config(format!(
                        "Unknown hybridization '{}' in molecule '{}'",
                        label, custom.name
                    ))
                })?;
                blueprint.hybridized_atom(&atom.element, position, atom.charge, hybridization)
            }
            None => blueprint.atom(&atom.element, position, atom.charge),
        };
    }

    for bond in &custom.bonds {
        let [a, b] = bond.atoms;
        let order = match &bond.order {
            Some(label) => label.parse::<BondOrder>().map_err(|_| {
                CliError::Config(format!(
                    "Unknown bond order '{}' in molecule '{}'",
                    label, custom.name
                ))
            })?,
            None => BondOrder::default(),
        };
        blueprint = match bond.length {
            Some(length) => blueprint.bond(a, b, order, length),
            None => blueprint.bond_with_rules(a, b, order, rules),
        };
    }
    Ok(blueprint)
}

fn build_system(scenario: &Scenario, rules: &dyn BondingRules) -> Result<MolecularSystem> {
    let mut system = MolecularSystem::new();

    for entry in &scenario.molecules {
        let blueprint = match entry {
            MoleculeEntry::Preset(preset) => {
                let kind: Preset = preset.preset.parse().map_err(|_| {
                    CliError::Config(format!("Unknown molecule preset '{}'", preset.preset))
                })?;
                kind.blueprint(Point3::from(preset.origin))
            }
            MoleculeEntry::Custom(custom) => custom_blueprint(custom, rules)?,
        };
        let name = blueprint.name.clone();
        let id = system.add_molecule(blueprint)?;
        debug!(molecule = %name, ?id, "Added molecule.");
    }

    for placement in &scenario.placements {
        let placed = place_atom(
            &mut system,
            &placement.element,
            Point3::from(placement.position),
            rules,
        )?;
        if placed.created_molecule {
            debug!(element = %placement.element, "Placed atom as a new molecule.");
        } else {
            debug!(element = %placement.element, "Placed atom into an existing molecule.");
        }
    }

    Ok(system)
}

fn simulate(scenario: &Scenario, progress: Option<&CliProgressHandler>) -> Result<RunSnapshot> {
    let rules = load_rules(scenario)?;
    let mut system = build_system(scenario, rules.as_ref())?;
    info!(
        "Built {} molecule(s) with {} atom(s).",
        system.len(),
        system.atom_count()
    );

    let mut simulation = match scenario.seed {
        Some(seed) => Simulation::seeded(scenario.dynamics, seed),
        None => Simulation::from_entropy(scenario.dynamics),
    };
    let controls = SimulationControls::running(scenario.temperature);
    let reporter = match progress {
        Some(handler) => {
            handler.begin(scenario.ticks, "Simulating");
            ProgressReporter::with_callback(handler.get_callback())
        }
        None => ProgressReporter::new(),
    };

    let start = Instant::now();
    let mut skipped_steps = 0;
    for _ in 0..scenario.ticks {
        let report =
            simulation.tick_with_progress(&mut system, &controls, scenario.frame_time, &reporter)?;
        skipped_steps += report.skipped.len();
    }
    if let Some(handler) = progress {
        handler.finish();
    }

    info!(
        "Simulated {} frame(s) in {:.2?} ({} skipped molecule step(s)).",
        scenario.ticks,
        start.elapsed(),
        skipped_steps
    );
    if skipped_steps > 0 {
        warn!(
            "{} molecule step(s) were skipped; run with -vv for details.",
            skipped_steps
        );
    }

    let molecules = system
        .molecules_iter()
        .map(|molecule| {
            let potential_energy = match simulation.potential_energy(molecule) {
                Ok(energy) => Some(energy),
                Err(e) => {
                    warn!(molecule = %molecule.name, "Cannot evaluate energy: {e}");
                    None
                }
            };
            let atoms = molecule
                .atoms
                .iter()
                .map(|atom| AtomSnapshot {
                    element: atom.element.clone(),
                    position: [atom.position.x, atom.position.y, atom.position.z],
                    speed: simulation
                        .state()
                        .get(atom.id)
                        .map_or(0.0, |dynamics| dynamics.velocity.norm()),
                })
                .collect();
            MoleculeSnapshot {
                name: molecule.name.clone(),
                formula: molecule.formula.clone(),
                potential_energy,
                atoms,
            }
        })
        .collect();

    Ok(RunSnapshot {
        ticks: scenario.ticks,
        temperature: scenario.temperature,
        seed: scenario.seed,
        skipped_steps,
        molecules,
    })
}

fn render(snapshot: &RunSnapshot) -> String {
    let mut out = String::new();
    for molecule in &snapshot.molecules {
        let energy = molecule
            .potential_energy
            .map_or_else(|| "n/a".to_string(), |e| format!("{e:.4}"));
        out.push_str(&format!(
            "{} ({}) potential energy: {}\n",
            molecule.name, molecule.formula, energy
        ));
        for atom in &molecule.atoms {
            let [x, y, z] = atom.position;
            out.push_str(&format!(
                "  {:<3} {:>10.4} {:>10.4} {:>10.4}   |v| = {:.4}\n",
                atom.element, x, y, z, atom.speed
            ));
        }
    }
    out
}
