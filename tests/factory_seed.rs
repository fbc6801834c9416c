//! The distilled spec's factory seed scenarios (section 8, items 1-3), run
//! against the public `Instance`/`solve` API rather than by spawning the
//! `factory` binary, mirroring the teacher's own top-level `tests/` style.

use std::collections::BTreeMap;

use prodplan::factory::model::{
    Instance, RawInstance, RawLimits, RawMachine, RawModule, RawRecipe, RawTarget,
};
use prodplan::factory::reducer::{solve, SolveOutcome};

fn iron_plate_instance(ore_cap: f64, target_rate: f64, module: Option<RawModule>) -> Instance {
    let mut machines = BTreeMap::new();
    machines.insert(
        "furnace".to_string(),
        RawMachine {
            crafts_per_min: 1.0,
        },
    );

    let mut modules = BTreeMap::new();
    if let Some(m) = module {
        modules.insert("furnace".to_string(), m);
    }

    let mut input = BTreeMap::new();
    input.insert("ore".to_string(), 1.0);
    let mut out = BTreeMap::new();
    out.insert("plate".to_string(), 1.0);
    let mut recipes = BTreeMap::new();
    recipes.insert(
        "iron_plate".to_string(),
        RawRecipe {
            machine: "furnace".to_string(),
            time_s: 3.2,
            input,
            out,
        },
    );

    let mut max_machines = BTreeMap::new();
    max_machines.insert("furnace".to_string(), 100.0);
    let mut raw_supply_per_min = BTreeMap::new();
    raw_supply_per_min.insert("ore".to_string(), ore_cap);

    let raw = RawInstance {
        machines,
        modules,
        recipes,
        limits: RawLimits {
            max_machines,
            raw_supply_per_min,
        },
        target: RawTarget {
            item: "plate".to_string(),
            rate_per_min: target_rate,
        },
    };
    Instance::from_raw(raw).expect("valid instance")
}

#[test]
fn seed_1_factory_trivially_feasible() {
    let instance = iron_plate_instance(100.0, 50.0, None);
    match solve(&instance) {
        SolveOutcome::Ok {
            per_recipe_crafts_per_min,
            per_machine_counts,
            raw_consumption_per_min,
        } => {
            assert!((per_recipe_crafts_per_min["iron_plate"] - 50.0).abs() < 1e-6);
            assert!((per_machine_counts["furnace"] - 50.0 / (60.0 / 3.2)).abs() < 1e-4);
            assert!((raw_consumption_per_min["ore"] - 50.0).abs() < 1e-6);
        }
        other => panic!("expected ok, got {other:?}"),
    }
}

#[test]
fn seed_2_factory_infeasible_by_raw_cap() {
    let instance = iron_plate_instance(10.0, 50.0, None);
    match solve(&instance) {
        SolveOutcome::Infeasible {
            max_feasible_target_per_min,
            bottleneck_hint,
        } => {
            assert!((max_feasible_target_per_min - 10.0).abs() < 1e-4);
            assert!(bottleneck_hint.iter().any(|h| h == "ore supply"));
        }
        other => panic!("expected infeasible, got {other:?}"),
    }
}

#[test]
fn seed_3_factory_productivity_module() {
    let instance = iron_plate_instance(
        100.0,
        55.0,
        Some(RawModule {
            speed: 0.0,
            prod: 0.1,
        }),
    );
    match solve(&instance) {
        SolveOutcome::Ok {
            per_recipe_crafts_per_min,
            ..
        } => {
            assert!((per_recipe_crafts_per_min["iron_plate"] - 50.0).abs() < 1e-4);
        }
        other => panic!("expected ok, got {other:?}"),
    }
}
