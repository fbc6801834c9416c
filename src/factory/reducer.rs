//! Builds and solves the two-phase factory LP, then extracts either a
//! machine-minimizing plan or a bottleneck certificate. See spec §4.1.

use std::collections::BTreeMap;

use crate::factory::model::{Instance, Recipe};
use crate::lp::{LpProblem, RowId, Sense, Status, VarId};
use crate::EPS;

#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Ok {
        per_recipe_crafts_per_min: BTreeMap<String, f64>,
        per_machine_counts: BTreeMap<String, f64>,
        raw_consumption_per_min: BTreeMap<String, f64>,
    },
    Infeasible {
        max_feasible_target_per_min: f64,
        bottleneck_hint: Vec<String>,
    },
}

/// A recipe's contribution to an item's balance row: `out * prod_mult -
/// in`, omitted entirely when the recipe doesn't touch the item.
fn item_coeffs(recipes: &[Recipe], vars: &[VarId], item: &str) -> Vec<(VarId, f64)> {
    recipes
        .iter()
        .zip(vars.iter())
        .filter_map(|(r, &v)| {
            let mut c = 0.0;
            if let Some(q) = r.output.get(item) {
                c += q * r.productivity_mult;
            }
            if let Some(q) = r.input.get(item) {
                c -= q;
            }
            (c.abs() > 0.0).then_some((v, c))
        })
        .collect()
}

struct CommonRows {
    recipe_vars: Vec<VarId>,
    raw_supply_rows: BTreeMap<String, RowId>,
    machine_cap_rows: BTreeMap<String, RowId>,
}

/// Adds the recipe variables, item-balance rows (minus the target, which
/// the caller pins differently in each phase), and machine-capacity rows
/// shared by both phases.
fn build_common(instance: &Instance, lp: &mut LpProblem) -> CommonRows {
    let recipe_vars: Vec<VarId> = instance.recipes.iter().map(|_| lp.add_var()).collect();

    for item in &instance.intermediate_items {
        let coeffs = item_coeffs(&instance.recipes, &recipe_vars, item);
        lp.add_eq_row(&coeffs, 0.0);
    }

    let mut raw_supply_rows = BTreeMap::new();
    for (item, cap) in &instance.raw_supply {
        let coeffs = item_coeffs(&instance.recipes, &recipe_vars, item);
        lp.add_le_row(&coeffs, 0.0);
        let ge_row = lp.add_ge_row(&coeffs, -cap);
        raw_supply_rows.insert(item.clone(), ge_row);
    }

    let mut machine_cap_rows = BTreeMap::new();
    for (name, machine) in &instance.machines {
        let Some(cap) = machine.max_count else {
            continue;
        };
        let coeffs: Vec<(VarId, f64)> = instance
            .recipes
            .iter()
            .zip(recipe_vars.iter())
            .filter(|(r, _)| &r.machine == name)
            .map(|(r, &v)| (v, r.machine_cost_per_craft))
            .collect();
        let row = lp.add_le_row(&coeffs, cap);
        machine_cap_rows.insert(name.clone(), row);
    }

    CommonRows {
        recipe_vars,
        raw_supply_rows,
        machine_cap_rows,
    }
}

fn bottleneck_hint(lp: &LpProblem, rows: &CommonRows, max_t: f64) -> Vec<String> {
    let mut hints = Vec::new();
    for (name, row) in &rows.machine_cap_rows {
        if lp.dual(*row) > EPS {
            hints.push(format!("{name} cap"));
        }
    }
    for (item, row) in &rows.raw_supply_rows {
        if lp.dual(*row) > EPS {
            hints.push(format!("{item} supply"));
        }
    }
    if hints.is_empty() {
        if max_t > EPS {
            hints.push("Target rate conflicts with other constraints".to_string());
        } else {
            hints.push("Unknown bottleneck, possibly no production path".to_string());
        }
    }
    hints
}

pub fn solve(instance: &Instance) -> SolveOutcome {
    // ---- Phase 1: is the target rate reachable at all? ----
    let mut lp1 = LpProblem::new();
    let rows1 = build_common(instance, &mut lp1);
    let t = lp1.add_var();
    let target_coeffs = item_coeffs(&instance.recipes, &rows1.recipe_vars, &instance.target_item);
    let mut phase1_target_coeffs = target_coeffs.clone();
    phase1_target_coeffs.push((t, -1.0));
    lp1.add_eq_row(&phase1_target_coeffs, 0.0);
    lp1.set_objective(Sense::Maximize, &[(t, 1.0)]);

    if lp1.solve() != Status::Optimal {
        return SolveOutcome::Infeasible {
            max_feasible_target_per_min: 0.0,
            bottleneck_hint: vec!["Initial solver failure".to_string()],
        };
    }

    let max_t = lp1.value(t).max(0.0);
    if max_t < instance.target_rate - EPS {
        let hints = bottleneck_hint(&lp1, &rows1, max_t);
        return SolveOutcome::Infeasible {
            max_feasible_target_per_min: max_t,
            bottleneck_hint: hints,
        };
    }

    // ---- Phase 2: minimize total machines at the pinned target rate. ----
    let mut lp2 = LpProblem::new();
    let rows2 = build_common(instance, &mut lp2);
    let target_coeffs2 = item_coeffs(&instance.recipes, &rows2.recipe_vars, &instance.target_item);
    lp2.add_eq_row(&target_coeffs2, instance.target_rate);

    let objective: Vec<(VarId, f64)> = instance
        .recipes
        .iter()
        .zip(rows2.recipe_vars.iter())
        .map(|(r, &v)| (v, r.machine_cost_per_craft))
        .collect();
    lp2.set_objective(Sense::Minimize, &objective);

    if lp2.solve() != Status::Optimal {
        return SolveOutcome::Infeasible {
            max_feasible_target_per_min: max_t,
            bottleneck_hint: vec!["Phase 2 solver failure".to_string()],
        };
    }

    let per_recipe_crafts_per_min: BTreeMap<String, f64> = instance
        .recipes
        .iter()
        .zip(rows2.recipe_vars.iter())
        .map(|(r, &v)| (r.name.clone(), lp2.value(v).max(0.0)))
        .collect();

    let per_machine_counts: BTreeMap<String, f64> = instance
        .machines
        .iter()
        .filter(|(_, m)| m.max_count.is_some())
        .map(|(name, _)| {
            let count = rows2
                .machine_cap_rows
                .get(name)
                .map(|row| lp2.activity(*row).max(0.0))
                .unwrap_or(0.0);
            (name.clone(), count)
        })
        .collect();

    let raw_consumption_per_min: BTreeMap<String, f64> = instance
        .raw_supply
        .keys()
        .map(|item| {
            let net_balance = item_coeffs(&instance.recipes, &rows2.recipe_vars, item)
                .iter()
                .map(|(v, c)| c * lp2.value(*v))
                .sum::<f64>();
            (item.clone(), (-net_balance).max(0.0))
        })
        .collect();

    SolveOutcome::Ok {
        per_recipe_crafts_per_min,
        per_machine_counts,
        raw_consumption_per_min,
    }
}
