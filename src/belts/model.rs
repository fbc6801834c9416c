//! Typed input model for the `belts` solver: parses and validates a
//! bounded-flow network instance.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Deserialize)]
pub struct RawInstance {
    pub sources: BTreeMap<String, f64>,
    pub sink: String,
    #[serde(default)]
    pub node_caps: BTreeMap<String, f64>,
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEdge {
    pub from: String,
    pub to: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub nodes: BTreeSet<String>,
    pub sources: BTreeMap<String, f64>,
    pub sink: String,
    pub node_caps: BTreeMap<String, f64>,
    pub edges: Vec<Edge>,
}

impl Instance {
    pub fn from_raw(raw: RawInstance) -> Result<Self, Error> {
        for (node, supply) in &raw.sources {
            if !supply.is_finite() || *supply < 0.0 {
                return Err(Error::Model(format!(
                    "source {node}: supply must be finite and nonnegative"
                )));
            }
        }
        for (node, cap) in &raw.node_caps {
            if !cap.is_finite() || *cap < 0.0 {
                return Err(Error::Model(format!(
                    "node cap for {node} must be finite and nonnegative"
                )));
            }
        }
        for e in &raw.edges {
            if !e.lower_bound.is_finite() || e.lower_bound < 0.0 {
                return Err(Error::Model(format!(
                    "edge {}->{}: lower_bound must be finite and nonnegative",
                    e.from, e.to
                )));
            }
            if !e.upper_bound.is_finite() {
                return Err(Error::Model(format!(
                    "edge {}->{}: upper_bound must be finite",
                    e.from, e.to
                )));
            }
        }
        if raw.sources.contains_key(&raw.sink) {
            return Err(Error::Model(format!(
                "sink {} cannot also be a source",
                raw.sink
            )));
        }

        let mut nodes: BTreeSet<String> = raw.sources.keys().cloned().collect();
        nodes.insert(raw.sink.clone());
        for e in &raw.edges {
            nodes.insert(e.from.clone());
            nodes.insert(e.to.clone());
        }

        let edges = raw
            .edges
            .iter()
            .map(|e| Edge {
                from: e.from.clone(),
                to: e.to.clone(),
                lower_bound: e.lower_bound,
                upper_bound: e.upper_bound,
            })
            .collect();

        Ok(Instance {
            nodes,
            sources: raw.sources,
            sink: raw.sink,
            node_caps: raw.node_caps,
            edges,
        })
    }

    pub fn is_source(&self, node: &str) -> bool {
        self.sources.contains_key(node)
    }

    pub fn is_sink(&self, node: &str) -> bool {
        self.sink == node
    }

    /// A node carries a throughput cap only if it is neither a source nor
    /// the sink and appears in `node_caps`.
    pub fn node_cap(&self, node: &str) -> Option<f64> {
        if self.is_source(node) || self.is_sink(node) {
            None
        } else {
            self.node_caps.get(node).copied()
        }
    }
}
