//! `belts`: reads a bounded-flow network instance on stdin, writes a
//! feasible flow (or a min-cut certificate) on stdout.

use color_eyre::Result;

use prodplan::belts::model::{Instance, RawInstance};
use prodplan::belts::reducer::{solve, Deficit, FlowEdge, FlowNeeded, SolveOutcome, TightEdge};
use prodplan::error::Error;
use prodplan::json::{clean, read_stdin};

fn clean_flows(flows: Vec<FlowEdge>) -> Vec<FlowEdge> {
    flows
        .into_iter()
        .map(|f| FlowEdge {
            flow: clean(f.flow),
            ..f
        })
        .collect()
}

fn clean_deficit(deficit: Deficit) -> Deficit {
    Deficit {
        demand_balance: clean(deficit.demand_balance),
        tight_edges: deficit
            .tight_edges
            .into_iter()
            .map(|e| TightEdge {
                flow_needed: match e.flow_needed {
                    FlowNeeded::Value(v) => FlowNeeded::Value(clean(v)),
                    FlowNeeded::AtCapacity => FlowNeeded::AtCapacity,
                },
                ..e
            })
            .collect(),
        ..deficit
    }
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
            max_flow_per_min,
            flows,
        } => serde_json::json!({
            "status": "ok",
            "max_flow_per_min": clean(max_flow_per_min),
            "flows": clean_flows(flows),
        }),
        SolveOutcome::Infeasible {
            cut_reachable,
            deficit,
        } => serde_json::json!({
            "status": "infeasible",
            "cut_reachable": cut_reachable,
            "deficit": clean_deficit(deficit),
        }),
    };

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
