//! A small, self-contained two-phase simplex solver.
//!
//! The retrieved reference pack's only LP-backed repo wires up `good_lp`
//! against a black-box backend, which is the right call when all you need
//! is a primal optimum. The factory reducer also needs shadow prices (to
//! build the bottleneck certificate) and a pinned-deterministic pivoting
//! rule, neither of which `good_lp`'s solver-agnostic `Solution` trait
//! exposes. A dense-tableau two-phase simplex with Bland's rule gives both
//! for the modest row/column counts a factory instance produces.
//!
//! Internally every row is normalized to a nonnegative right-hand side and
//! given a single "unit column" (a slack for a `<=` row, an artificial for
//! a `>=` or `=` row) whose final reduced cost yields the row's dual via
//! the standard `y_i = -reduced_cost(unit_column_i)` identity. Rows are
//! sign-flipped to reach a nonnegative RHS and the objective is negated
//! when the caller asks to maximize; both transforms are undone when a
//! dual is read back, so `dual()` always answers in the caller's original
//! sense.

use crate::EPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Le,
    Ge,
    Eq,
}

#[derive(Debug, Clone)]
struct RowDef {
    coeffs: Vec<(usize, f64)>,
    kind: Kind,
    rhs: f64,
}

/// A sparse-coefficient linear program solved by a from-scratch two-phase
/// simplex, exposing primal values, row duals, and row activities.
#[derive(Debug, Default)]
pub struct LpProblem {
    n_vars: usize,
    rows: Vec<RowDef>,
    obj: Vec<(usize, f64)>,
    maximize: bool,

    solution: Vec<f64>,
    row_duals: Vec<f64>,
    status: Option<Status>,
}

impl LpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self) -> VarId {
        let id = self.n_vars;
        self.n_vars += 1;
        VarId(id)
    }

    pub fn add_le_row(&mut self, coeffs: &[(VarId, f64)], rhs: f64) -> RowId {
        self.push_row(coeffs, Kind::Le, rhs)
    }

    pub fn add_ge_row(&mut self, coeffs: &[(VarId, f64)], rhs: f64) -> RowId {
        self.push_row(coeffs, Kind::Ge, rhs)
    }

    pub fn add_eq_row(&mut self, coeffs: &[(VarId, f64)], rhs: f64) -> RowId {
        self.push_row(coeffs, Kind::Eq, rhs)
    }

    fn push_row(&mut self, coeffs: &[(VarId, f64)], kind: Kind, rhs: f64) -> RowId {
        let id = self.rows.len();
        self.rows.push(RowDef {
            coeffs: coeffs.iter().map(|(v, c)| (v.0, *c)).collect(),
            kind,
            rhs,
        });
        RowId(id)
    }

    pub fn set_objective(&mut self, sense: Sense, coeffs: &[(VarId, f64)]) {
        self.maximize = matches!(sense, Sense::Maximize);
        let sign = if self.maximize { -1.0 } else { 1.0 };
        self.obj = coeffs.iter().map(|(v, c)| (v.0, sign * *c)).collect();
    }

    pub fn value(&self, v: VarId) -> f64 {
        self.solution.get(v.0).copied().unwrap_or(0.0)
    }

    pub fn dual(&self, r: RowId) -> f64 {
        self.row_duals.get(r.0).copied().unwrap_or(0.0)
    }

    /// Activity `a^T x` of a row's original (un-normalized) coefficients,
    /// evaluated directly against the solved variable values.
    pub fn activity(&self, r: RowId) -> f64 {
        self.rows[r.0]
            .coeffs
            .iter()
            .map(|(j, c)| c * self.solution.get(*j).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Builds the tableau and runs the two-phase simplex to optimality.
    pub fn solve(&mut self) -> Status {
        let n_rows = self.rows.len();
        let n_structural = self.n_vars;

        struct NormRow {
            coeffs: Vec<(usize, f64)>,
            kind: Kind,
            rhs: f64,
            flipped: bool,
        }

        let normalized: Vec<NormRow> = self
            .rows
            .iter()
            .map(|r| {
                if r.rhs < 0.0 {
                    let kind = match r.kind {
                        Kind::Le => Kind::Ge,
                        Kind::Ge => Kind::Le,
                        Kind::Eq => Kind::Eq,
                    };
                    NormRow {
                        coeffs: r.coeffs.iter().map(|(j, c)| (*j, -c)).collect(),
                        kind,
                        rhs: -r.rhs,
                        flipped: true,
                    }
                } else {
                    NormRow {
                        coeffs: r.coeffs.clone(),
                        kind: r.kind,
                        rhs: r.rhs,
                        flipped: false,
                    }
                }
            })
            .collect();

        // Assign extra (slack/surplus/artificial) columns, one "unit column"
        // per row (coefficient +1 in its own row, 0 elsewhere).
        let mut n_cols = n_structural;
        let mut unit_col = vec![0usize; n_rows];
        let mut is_artificial = vec![false; 0];
        let mut extra_cols: Vec<Vec<(usize, f64)>> = Vec::new(); // (row, coeff) per extra column

        for (i, row) in normalized.iter().enumerate() {
            match row.kind {
                Kind::Le => {
                    let col = n_cols;
                    n_cols += 1;
                    extra_cols.push(vec![(i, 1.0)]);
                    is_artificial.push(false);
                    unit_col[i] = col;
                }
                Kind::Ge => {
                    let surplus = n_cols;
                    n_cols += 1;
                    extra_cols.push(vec![(i, -1.0)]);
                    is_artificial.push(false);
                    let artificial = n_cols;
                    n_cols += 1;
                    extra_cols.push(vec![(i, 1.0)]);
                    is_artificial.push(true);
                    let _ = surplus;
                    unit_col[i] = artificial;
                }
                Kind::Eq => {
                    let artificial = n_cols;
                    n_cols += 1;
                    extra_cols.push(vec![(i, 1.0)]);
                    is_artificial.push(true);
                    unit_col[i] = artificial;
                }
            }
        }

        let rhs_col = n_cols;
        let mut tab = vec![vec![0.0f64; n_cols + 1]; n_rows];
        for (i, row) in normalized.iter().enumerate() {
            for &(j, c) in &row.coeffs {
                tab[i][j] += c;
            }
            tab[i][rhs_col] = row.rhs;
        }
        for (col_idx, entries) in extra_cols.iter().enumerate() {
            let col = n_structural + col_idx;
            for &(row, c) in entries {
                tab[row][col] = c;
            }
        }

        let mut basis: Vec<usize> = (0..n_rows).map(|i| unit_col[i]).collect();

        let mut obj_row = vec![0.0f64; n_cols + 1];
        let artificial_cols: Vec<usize> = (0..is_artificial.len())
            .filter(|&k| is_artificial[k])
            .map(|k| n_structural + k)
            .collect();

        // ---- Phase 1: minimize the sum of artificial variables. ----
        for &col in &artificial_cols {
            obj_row[col] = 1.0;
        }
        price_out(&mut obj_row, &tab, &basis);

        let candidates: Vec<usize> = (0..n_cols).collect();
        match run_simplex(&mut tab, &mut obj_row, &mut basis, &candidates, rhs_col) {
            Status::Unbounded => {
                // An unbounded artificial-sum minimization cannot happen
                // (the sum is bounded below by zero); treat defensively as
                // infeasible rather than panic.
                self.status = Some(Status::Infeasible);
                return Status::Infeasible;
            }
            _ => {}
        }

        let phase1_value = -obj_row[rhs_col];
        if phase1_value > 1e6 * EPS {
            self.status = Some(Status::Infeasible);
            return Status::Infeasible;
        }

        // Best-effort: pivot any artificial still basic (at ~0, a redundant
        // row) out of the basis so it cannot interfere with phase 2.
        for i in 0..n_rows {
            let bv = basis[i];
            let bv_is_artificial = bv >= n_structural && is_artificial[bv - n_structural];
            if !bv_is_artificial {
                continue;
            }
            let replacement = (0..n_cols).find(|&j| {
                let j_is_artificial = j >= n_structural && is_artificial[j - n_structural];
                !j_is_artificial && tab[i][j].abs() > 1e-7
            });
            if let Some(j) = replacement {
                pivot(&mut tab, &mut obj_row, &mut basis, i, j);
            }
        }

        // ---- Phase 2: minimize the real (internal) objective. ----
        let mut obj2 = vec![0.0f64; n_cols + 1];
        for &(j, c) in &self.obj {
            obj2[j] += c;
        }
        price_out(&mut obj2, &tab, &basis);

        let candidates: Vec<usize> = (0..n_cols)
            .filter(|j| !artificial_cols.contains(j))
            .collect();
        let status2 = run_simplex(&mut tab, &mut obj2, &mut basis, &candidates, rhs_col);
        if status2 == Status::Unbounded {
            self.status = Some(Status::Unbounded);
            return Status::Unbounded;
        }

        // ---- Extract primal solution. ----
        let mut solution = vec![0.0f64; n_structural];
        for (i, &bv) in basis.iter().enumerate() {
            if bv < n_structural {
                solution[bv] = tab[i][rhs_col].max(0.0);
            }
        }
        self.solution = solution;

        // ---- Extract row duals. ----
        let mut row_duals = vec![0.0f64; n_rows];
        for i in 0..n_rows {
            let raw = -obj2[unit_col[i]];
            let unflipped = if normalized[i].flipped { -raw } else { raw };
            row_duals[i] = if self.maximize { -unflipped } else { unflipped };
        }
        self.row_duals = row_duals;

        self.status = Some(Status::Optimal);
        Status::Optimal
    }
}

/// `obj_row[j] := obj_row[j] - sum_i obj_row[basis[i]] * tab[i][j]` so that
/// the objective row reads as reduced costs relative to `basis`.
fn price_out(obj_row: &mut [f64], tab: &[Vec<f64>], basis: &[usize]) {
    for (i, &bv) in basis.iter().enumerate() {
        let c = obj_row[bv];
        if c.abs() > 0.0 {
            for (j, v) in tab[i].iter().enumerate() {
                obj_row[j] -= c * v;
            }
        }
    }
}

fn pivot(tab: &mut [Vec<f64>], obj_row: &mut [f64], basis: &mut [usize], row: usize, col: usize) {
    let pivot_val = tab[row][col];
    for v in tab[row].iter_mut() {
        *v /= pivot_val;
    }
    let pivot_row = tab[row].clone();
    for (i, r) in tab.iter_mut().enumerate() {
        if i == row {
            continue;
        }
        let factor = r[col];
        if factor.abs() > 0.0 {
            for (j, v) in r.iter_mut().enumerate() {
                *v -= factor * pivot_row[j];
            }
        }
    }
    let factor = obj_row[col];
    if factor.abs() > 0.0 {
        for (j, v) in obj_row.iter_mut().enumerate() {
            *v -= factor * pivot_row[j];
        }
    }
    basis[row] = col;
}

/// Bland's-rule primal simplex: smallest-index entering column with a
/// negative reduced cost, smallest-index basic variable to break ratio
/// ties. Deterministic and cycle-free by construction.
fn run_simplex(
    tab: &mut Vec<Vec<f64>>,
    obj_row: &mut Vec<f64>,
    basis: &mut Vec<usize>,
    candidates: &[usize],
    rhs_col: usize,
) -> Status {
    loop {
        let entering = candidates
            .iter()
            .copied()
            .find(|&j| obj_row[j] < -EPS);
        let Some(col) = entering else {
            return Status::Optimal;
        };

        let mut best_row: Option<usize> = None;
        let mut best_ratio = f64::INFINITY;
        for (i, row) in tab.iter().enumerate() {
            let coeff = row[col];
            if coeff > EPS {
                let ratio = row[rhs_col] / coeff;
                if ratio < best_ratio - EPS
                    || (ratio < best_ratio + EPS
                        && best_row.map_or(true, |r| basis[i] < basis[r]))
                {
                    best_ratio = ratio;
                    best_row = Some(i);
                }
            }
        }
        let Some(row) = best_row else {
            return Status::Unbounded;
        };
        pivot(tab, obj_row, basis, row, col);
    }
}
