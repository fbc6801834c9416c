//! `factory`: reads a factory-steady-state instance on stdin, writes a
//! machine-minimizing plan (or an infeasibility certificate) on stdout.

use std::collections::BTreeMap;

use color_eyre::Result;

use prodplan::error::Error;
use prodplan::factory::model::{Instance, RawInstance};
use prodplan::factory::reducer::{solve, SolveOutcome};
use prodplan::json::{clean, read_stdin};

fn clean_map(map: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    map.into_iter().map(|(k, v)| (k, clean(v))).collect()
}

fn main() -> Result<()> {
    if std::env::var("RUST_BACKTRACE").is_err() {
        std::env::set_var("RUST_BACKTRACE", "FULL");
    }
    color_eyre::install()?;

    let input = read_stdin()?;
    let raw: RawInstance = serde_json::from_str(&input).map_err(Error::Json)?;
    let instance = Instance::from_raw(raw)?;

    let output = match solve(&instance) {
        SolveOutcome::Ok {
            per_recipe_crafts_per_min,
            per_machine_counts,
            raw_consumption_per_min,
        } => serde_json::json!({
            "status": "ok",
            "per_recipe_crafts_per_min": clean_map(per_recipe_crafts_per_min),
            "per_machine_counts": clean_map(per_machine_counts),
            "raw_consumption_per_min": clean_map(raw_consumption_per_min),
        }),
        SolveOutcome::Infeasible {
            max_feasible_target_per_min,
            bottleneck_hint,
        } => serde_json::json!({
            "status": "infeasible",
            "max_feasible_target_per_min": clean(max_feasible_target_per_min),
            "bottleneck_hint": bottleneck_hint,
        }),
    };

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
