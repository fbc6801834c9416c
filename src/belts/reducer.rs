//! Node-split plus circulation-with-lower-bounds reduction to a single
//! max-flow problem, and min-cut certificate extraction. See spec §4.2.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::belts::model::Instance;
use crate::maxflow::{ArcId, MaxFlowOracle};
use crate::EPS;

const SUPER_SOURCE: usize = 0;
const SUPER_SINK: usize = 1;

#[derive(Debug, Clone, Serialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub flow: f64,
}

#[derive(Debug, Clone, Copy)]
pub enum FlowNeeded {
    Value(f64),
    AtCapacity,
}

impl Serialize for FlowNeeded {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            FlowNeeded::Value(v) => s.serialize_f64(*v),
            FlowNeeded::AtCapacity => s.serialize_str("at capacity"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TightEdge {
    pub from: String,
    pub to: String,
    pub flow_needed: FlowNeeded,
}

#[derive(Debug, Clone, Serialize)]
pub struct Deficit {
    pub demand_balance: f64,
    pub tight_nodes: Vec<String>,
    pub tight_edges: Vec<TightEdge>,
}

#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Ok {
        max_flow_per_min: f64,
        flows: Vec<FlowEdge>,
    },
    Infeasible {
        cut_reachable: Vec<String>,
        deficit: Deficit,
    },
}

/// Per-node index assignment: nodes with a throughput cap get a split
/// `(in, out)` pair joined by a capacitated arc; everything else gets one
/// index used for both roles.
struct NodeIndex {
    in_index: BTreeMap<String, usize>,
    out_index: BTreeMap<String, usize>,
    index_name: Vec<String>,
    count: usize,
}

fn assign_indices(instance: &Instance) -> NodeIndex {
    let mut in_index = BTreeMap::new();
    let mut out_index = BTreeMap::new();
    let mut index_name = vec![String::new(), String::new()];
    let mut next = 2usize;
    for node in &instance.nodes {
        if instance.node_cap(node).is_some() {
            let vin = next;
            next += 1;
            let vout = next;
            next += 1;
            in_index.insert(node.clone(), vin);
            out_index.insert(node.clone(), vout);
            index_name.push(node.clone());
            index_name.push(node.clone());
        } else {
            let v = next;
            next += 1;
            in_index.insert(node.clone(), v);
            out_index.insert(node.clone(), v);
            index_name.push(node.clone());
        }
    }
    NodeIndex {
        in_index,
        out_index,
        index_name,
        count: next,
    }
}

/// `B[i] -= lo` at the out-side of `from` and `B[i] += lo` at the in-side
/// of `to`, for every edge's lower bound, plus the source/sink supply
/// shift. This is the "circulation with demands" imbalance vector.
fn lower_bound_shift(instance: &Instance, idx: &NodeIndex) -> (Vec<f64>, f64) {
    let mut balance = vec![0.0f64; idx.count];
    let total_supply: f64 = instance.sources.values().sum();
    for (node, supply) in &instance.sources {
        balance[idx.out_index[node]] -= supply;
    }
    balance[idx.in_index[&instance.sink]] += total_supply;
    for edge in &instance.edges {
        balance[idx.out_index[&edge.from]] -= edge.lower_bound;
        balance[idx.in_index[&edge.to]] += edge.lower_bound;
    }
    (balance, total_supply)
}

fn total_demand(balance: &[f64]) -> f64 {
    balance.iter().filter(|b| **b > EPS).sum()
}

pub fn solve(instance: &Instance) -> SolveOutcome {
    let idx = assign_indices(instance);

    let violating: Vec<&crate::belts::model::Edge> = instance
        .edges
        .iter()
        .filter(|e| e.upper_bound < e.lower_bound - EPS)
        .collect();
    if !violating.is_empty() {
        let (balance, _) = lower_bound_shift(instance, &idx);
        return SolveOutcome::Infeasible {
            cut_reachable: Vec::new(),
            deficit: Deficit {
                demand_balance: total_demand(&balance),
                tight_nodes: Vec::new(),
                tight_edges: violating
                    .iter()
                    .map(|e| TightEdge {
                        from: e.from.clone(),
                        to: e.to.clone(),
                        flow_needed: FlowNeeded::Value(e.upper_bound - e.lower_bound),
                    })
                    .collect(),
            },
        };
    }

    let (balance, total_supply) = lower_bound_shift(instance, &idx);
    let mut net = MaxFlowOracle::new(idx.count);

    let mut split_arcs: Vec<(ArcId, String)> = Vec::new();
    for node in &instance.nodes {
        if let Some(cap) = instance.node_cap(node) {
            let arc = net.add_arc(idx.in_index[node], idx.out_index[node], cap);
            split_arcs.push((arc, node.clone()));
        }
    }

    let mut edge_arcs: Vec<(ArcId, usize)> = Vec::new();
    for (i, edge) in instance.edges.iter().enumerate() {
        let arc = net.add_arc(
            idx.out_index[&edge.from],
            idx.in_index[&edge.to],
            edge.upper_bound - edge.lower_bound,
        );
        edge_arcs.push((arc, i));
    }

    let mut demand = 0.0;
    for i in 2..idx.count {
        if balance[i] > EPS {
            net.add_arc(SUPER_SOURCE, i, balance[i]);
            demand += balance[i];
        } else if balance[i] < -EPS {
            net.add_arc(i, SUPER_SINK, -balance[i]);
        }
    }

    let max_flow = net.max_flow(SUPER_SOURCE, SUPER_SINK);

    if max_flow >= demand - EPS {
        let flows: Vec<FlowEdge> = edge_arcs
            .iter()
            .filter_map(|(arc, i)| {
                let edge = &instance.edges[*i];
                let flow = net.flow_on(*arc) + edge.lower_bound;
                (flow > EPS).then(|| FlowEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    flow,
                })
            })
            .collect();
        return SolveOutcome::Ok {
            max_flow_per_min: total_supply,
            flows,
        };
    }

    let reachable = net.reachable_from_source(SUPER_SOURCE);

    let mut cut_reachable: BTreeSet<String> = BTreeSet::new();
    for &i in &reachable {
        if i != SUPER_SOURCE && i != SUPER_SINK {
            cut_reachable.insert(idx.index_name[i].clone());
        }
    }

    let mut tight_edges = Vec::new();
    for (arc, i) in &edge_arcs {
        let edge = &instance.edges[*i];
        let cap = edge.upper_bound - edge.lower_bound;
        let from_idx = idx.out_index[&edge.from];
        let to_idx = idx.in_index[&edge.to];
        let crosses = reachable.contains(&from_idx) && !reachable.contains(&to_idx);
        let saturated = net.flow_on(*arc) >= cap - EPS;
        if crosses && saturated {
            tight_edges.push(TightEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
                flow_needed: FlowNeeded::AtCapacity,
            });
        }
    }

    let mut tight_nodes = Vec::new();
    for (arc, name) in &split_arcs {
        let cap = instance.node_cap(name).unwrap_or(0.0);
        let vin = idx.in_index[name];
        let vout = idx.out_index[name];
        let crosses = reachable.contains(&vin) && !reachable.contains(&vout);
        let saturated = net.flow_on(*arc) >= cap - EPS;
        if crosses && saturated {
            tight_nodes.push(name.clone());
        }
    }

    SolveOutcome::Infeasible {
        cut_reachable: cut_reachable.into_iter().collect(),
        deficit: Deficit {
            demand_balance: demand - max_flow,
            tight_nodes,
            tight_edges,
        },
    }
}
