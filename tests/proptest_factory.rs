//! Property-based checks for the invariants listed in the distilled spec's
//! section 8 ("Factory conservation" / "target" / "raw caps" / "machine
//! caps" / "optimality"), following the same top-level `tests/` placement
//! `zakkeown-Factorial`'s `tests/proptest_core.rs` uses for this kind of
//! check.

use std::collections::BTreeMap;

use proptest::prelude::*;

use prodplan::factory::model::{
    Instance, RawInstance, RawLimits, RawMachine, RawModule, RawRecipe, RawTarget,
};
use prodplan::factory::reducer::{solve, SolveOutcome};
use prodplan::EPS;

/// A single-recipe, single-machine instance parameterized by the knobs a
/// random plan needs to stress conservation/cap invariants: machine speed,
/// recipe duration, raw cap, machine cap, and target rate.
fn single_recipe_instance(
    crafts_per_min: f64,
    time_s: f64,
    ore_per_craft: f64,
    ore_cap: f64,
    machine_cap: f64,
    target_rate: f64,
) -> Instance {
    let mut machines = BTreeMap::new();
    machines.insert(
        "furnace".to_string(),
        RawMachine { crafts_per_min },
    );
    let mut input = BTreeMap::new();
    input.insert("ore".to_string(), ore_per_craft);
    let mut out = BTreeMap::new();
    out.insert("plate".to_string(), 1.0);
    let mut recipes = BTreeMap::new();
    recipes.insert(
        "iron_plate".to_string(),
        RawRecipe {
            machine: "furnace".to_string(),
            time_s,
            input,
            out,
        },
    );
    let mut max_machines = BTreeMap::new();
    max_machines.insert("furnace".to_string(), machine_cap);
    let mut raw_supply_per_min = BTreeMap::new();
    raw_supply_per_min.insert("ore".to_string(), ore_cap);

    let raw = RawInstance {
        machines,
        modules: BTreeMap::new(),
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
    Instance::from_raw(raw).expect("generated instance is always well-formed")
}

/// A two-recipe chain with a genuine intermediate item: `smelt` turns `ore`
/// into `intermediate`, `craft` turns `intermediate` into the target
/// `plate`, so the "factory conservation" invariant (net balance of an
/// intermediate item is zero) has something to check beyond the trivial
/// single-recipe case.
fn two_recipe_chain_instance(
    ore_per_intermediate: f64,
    intermediate_per_plate: f64,
    target_rate: f64,
) -> Instance {
    let mut machines = BTreeMap::new();
    machines.insert(
        "furnace_a".to_string(),
        RawMachine {
            crafts_per_min: 10.0,
        },
    );
    machines.insert(
        "furnace_b".to_string(),
        RawMachine {
            crafts_per_min: 10.0,
        },
    );

    let mut smelt_in = BTreeMap::new();
    smelt_in.insert("ore".to_string(), ore_per_intermediate);
    let mut smelt_out = BTreeMap::new();
    smelt_out.insert("intermediate".to_string(), 1.0);

    let mut craft_in = BTreeMap::new();
    craft_in.insert("intermediate".to_string(), intermediate_per_plate);
    let mut craft_out = BTreeMap::new();
    craft_out.insert("plate".to_string(), 1.0);

    let mut recipes = BTreeMap::new();
    recipes.insert(
        "smelt".to_string(),
        RawRecipe {
            machine: "furnace_a".to_string(),
            time_s: 6.0,
            input: smelt_in,
            out: smelt_out,
        },
    );
    recipes.insert(
        "craft".to_string(),
        RawRecipe {
            machine: "furnace_b".to_string(),
            time_s: 6.0,
            input: craft_in,
            out: craft_out,
        },
    );

    let mut max_machines = BTreeMap::new();
    max_machines.insert("furnace_a".to_string(), 1_000_000.0);
    max_machines.insert("furnace_b".to_string(), 1_000_000.0);
    let mut raw_supply_per_min = BTreeMap::new();
    raw_supply_per_min.insert("ore".to_string(), 1_000_000.0);

    let raw = RawInstance {
        machines,
        modules: BTreeMap::new(),
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
    Instance::from_raw(raw).expect("generated instance is always well-formed")
}

proptest! {
    /// Raw consumption never exceeds the declared cap, and when a plan is
    /// feasible the single recipe's craft rate exactly meets the target
    /// (the "factory target" and "factory raw caps" invariants; this
    /// single-recipe network has no intermediate item, so "factory
    /// conservation" is checked separately below against a two-recipe
    /// chain).
    #[test]
    fn feasible_plan_respects_caps_and_hits_target(
        crafts_per_min in 0.1f64..20.0,
        time_s in 0.5f64..30.0,
        ore_per_craft in 0.1f64..5.0,
        ore_cap in 1.0f64..500.0,
        machine_cap in 1.0f64..200.0,
        target_rate in 0.0f64..100.0,
    ) {
        let instance = single_recipe_instance(
            crafts_per_min, time_s, ore_per_craft, ore_cap, machine_cap, target_rate,
        );
        if let SolveOutcome::Ok {
            per_recipe_crafts_per_min,
            per_machine_counts,
            raw_consumption_per_min,
        } = solve(&instance)
        {
            let crafts = per_recipe_crafts_per_min["iron_plate"];
            prop_assert!((crafts - target_rate).abs() < 1e6 * EPS);
            prop_assert!(raw_consumption_per_min["ore"] <= ore_cap + 1e6 * EPS);
            prop_assert!(per_machine_counts["furnace"] <= machine_cap + 1e6 * EPS);
        }
    }

    /// When the raw cap makes the target unreachable, the reported maximum
    /// feasible rate never overstates what the raw supply actually allows.
    #[test]
    fn infeasible_by_raw_cap_reports_true_ceiling(
        crafts_per_min in 0.1f64..20.0,
        time_s in 0.5f64..30.0,
        ore_per_craft in 0.1f64..5.0,
        ore_cap in 1.0f64..50.0,
        target_rate in 200.0f64..1000.0,
    ) {
        let instance = single_recipe_instance(
            crafts_per_min, time_s, ore_per_craft, ore_cap, 1_000_000.0, target_rate,
        );
        if let SolveOutcome::Infeasible { max_feasible_target_per_min, .. } = solve(&instance) {
            let expected_ceiling = ore_cap / ore_per_craft;
            prop_assert!((max_feasible_target_per_min - expected_ceiling).abs() < 1e-3);
        }
    }

    /// No feasible plan uses strictly fewer machines than the one the
    /// solver emits: a slightly reduced craft rate either still meets the
    /// target (contradiction, since the solver already minimizes) or falls
    /// short of it.
    #[test]
    fn emitted_plan_is_not_beatable_by_a_small_perturbation(
        crafts_per_min in 0.5f64..10.0,
        time_s in 1.0f64..10.0,
        target_rate in 1.0f64..50.0,
        perturbation in 0.01f64..0.5,
    ) {
        let instance = single_recipe_instance(
            crafts_per_min, time_s, 1.0, 10_000.0, 10_000.0, target_rate,
        );
        if let SolveOutcome::Ok { per_recipe_crafts_per_min, .. } = solve(&instance) {
            let crafts = per_recipe_crafts_per_min["iron_plate"];
            let reduced = (crafts - perturbation).max(0.0);
            // With a single recipe feeding the target directly, any reduction
            // in craft rate produces that much less target throughput.
            prop_assert!(reduced < target_rate - EPS || perturbation < EPS);
        }
    }

    /// The "factory conservation" invariant: for the intermediate item
    /// `intermediate`, total production (`smelt`'s output) minus total
    /// consumption (`craft`'s input) nets to zero in the emitted plan.
    #[test]
    fn intermediate_item_balances_across_a_two_recipe_chain(
        ore_per_intermediate in 0.1f64..5.0,
        intermediate_per_plate in 0.1f64..5.0,
        target_rate in 0.0f64..50.0,
    ) {
        let instance = two_recipe_chain_instance(
            ore_per_intermediate, intermediate_per_plate, target_rate,
        );
        if let SolveOutcome::Ok { per_recipe_crafts_per_min, .. } = solve(&instance) {
            let smelt = per_recipe_crafts_per_min["smelt"];
            let craft = per_recipe_crafts_per_min["craft"];

            let intermediate_balance = smelt * 1.0 - craft * intermediate_per_plate;
            prop_assert!(intermediate_balance.abs() < 1e6 * EPS);

            let plate_balance = craft * 1.0;
            prop_assert!((plate_balance - target_rate).abs() < 1e6 * EPS);
        }
    }
}
