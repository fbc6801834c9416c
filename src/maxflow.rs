//! A small Dinic's-algorithm max-flow oracle.
//!
//! No max-flow crate turned up anywhere in the retrieved reference pack, so
//! this is a from-scratch, deterministic implementation of the standard
//! level-graph-plus-blocking-flow method: each phase BFS's a level graph
//! from the source, then repeatedly DFS's blocking-flow paths through it
//! using per-node "current arc" pointers so no arc is rescanned once it is
//! known to be saturated or to lead nowhere at the current level.
//!
//! Arcs are stored in forward/backward pairs at adjacent indices (arc `2k`
//! is the forward arc the caller added, `2k+1` its reverse); pushing flow
//! along one debits the other's residual automatically.

use std::collections::{HashSet, VecDeque};

use crate::EPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcId(usize);

#[derive(Debug, Clone)]
struct Arc {
    to: usize,
    cap: f64,
    flow: f64,
}

#[derive(Debug, Default)]
pub struct MaxFlowOracle {
    n: usize,
    graph: Vec<Vec<usize>>,
    arcs: Vec<Arc>,
}

impl MaxFlowOracle {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            graph: vec![Vec::new(); n],
            arcs: Vec::new(),
        }
    }

    /// Adds a directed arc `from -> to` with the given capacity. Returns an
    /// id for reading back its flow after `max_flow` runs.
    pub fn add_arc(&mut self, from: usize, to: usize, capacity: f64) -> ArcId {
        let fwd = self.arcs.len();
        self.arcs.push(Arc {
            to,
            cap: capacity,
            flow: 0.0,
        });
        self.graph[from].push(fwd);
        let bwd = self.arcs.len();
        self.arcs.push(Arc {
            to: from,
            cap: 0.0,
            flow: 0.0,
        });
        self.graph[to].push(bwd);
        ArcId(fwd)
    }

    pub fn flow_on(&self, arc: ArcId) -> f64 {
        self.arcs[arc.0].flow
    }

    fn residual(&self, arc: usize) -> f64 {
        self.arcs[arc].cap - self.arcs[arc].flow
    }

    fn bfs_levels(&self, source: usize) -> Option<Vec<i32>> {
        let mut level = vec![-1; self.n];
        level[source] = 0;
        let mut q = VecDeque::new();
        q.push_back(source);
        while let Some(u) = q.pop_front() {
            for &a in &self.graph[u] {
                let v = self.arcs[a].to;
                if level[v] < 0 && self.residual(a) > EPS {
                    level[v] = level[u] + 1;
                    q.push_back(v);
                }
            }
        }
        Some(level)
    }

    fn dfs_blocking(
        &mut self,
        u: usize,
        sink: usize,
        pushed: f64,
        level: &[i32],
        iter: &mut [usize],
    ) -> f64 {
        if u == sink || pushed <= EPS {
            return pushed;
        }
        while iter[u] < self.graph[u].len() {
            let a = self.graph[u][iter[u]];
            let v = self.arcs[a].to;
            if level[v] == level[u] + 1 && self.residual(a) > EPS {
                let sent = self.dfs_blocking(v, sink, pushed.min(self.residual(a)), level, iter);
                if sent > EPS {
                    self.arcs[a].flow += sent;
                    self.arcs[a ^ 1].flow -= sent;
                    return sent;
                }
            }
            iter[u] += 1;
        }
        0.0
    }

    /// Runs Dinic's algorithm from `source` to `sink`, returning the total
    /// flow value. Deterministic: arc order is insertion order, BFS/DFS
    /// have no randomness.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> f64 {
        let mut total = 0.0;
        loop {
            let Some(level) = self.bfs_levels(source) else {
                break;
            };
            if level[sink] < 0 {
                break;
            }
            let mut iter = vec![0usize; self.n];
            loop {
                let pushed = self.dfs_blocking(source, sink, f64::INFINITY, &level, &mut iter);
                if pushed <= EPS {
                    break;
                }
                total += pushed;
            }
        }
        total
    }

    /// The set of nodes reachable from `source` over positive-residual arcs
    /// in the current (post max-flow) residual graph — the source side of
    /// a minimum cut.
    pub fn reachable_from_source(&self, source: usize) -> HashSet<usize> {
        let mut seen = HashSet::new();
        seen.insert(source);
        let mut q = VecDeque::new();
        q.push_back(source);
        while let Some(u) = q.pop_front() {
            for &a in &self.graph[u] {
                let v = self.arcs[a].to;
                if self.residual(a) > EPS && !seen.contains(&v) {
                    seen.insert(v);
                    q.push_back(v);
                }
            }
        }
        seen
    }
}
