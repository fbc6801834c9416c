//! Library surface shared by the `factory` and `belts` binaries.
//!
//! Both solvers parse a JSON instance, build a numerical model, hand it to
//! one of the small oracle implementations in [`lp`] / [`maxflow`], and
//! extract either a plan or an infeasibility certificate. Nothing here is
//! shared at runtime between the two binaries beyond these modules; each
//! binary links the parts it needs.

pub const EPS: f64 = 1e-9;

pub mod belts;
pub mod error;
pub mod factory;
pub mod json;
pub mod lp;
pub mod maxflow;
