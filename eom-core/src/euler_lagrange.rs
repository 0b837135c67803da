//! The Euler–Lagrange operator.
//!
//! For each generalized coordinate `q` with velocity `q̇`, the stationarity
//! condition is `d/dt(∂L/∂q̇) − ∂L/∂q = 0`. Each equation gets one algebraic
//! simplification pass immediately, which bounds expression growth before
//! the solver sees it. Differentiation over this operator set is total, so
//! the stage has no failure path.

use eom_symbolic::Expr;

use crate::engine::CasEngine;
use crate::model::CoordinateModel;

/// Derives one second-order equation of motion per coordinate, each
/// implicitly equated to zero.
pub fn derive_equations(
    engine: &impl CasEngine,
    model: &CoordinateModel,
    lagrangian: &Expr,
) -> Vec<Expr> {
    model
        .coordinates()
        .iter()
        .map(|coordinate| {
            let momentum = engine.diff(lagrangian, coordinate.velocity());
            let equation = engine.diff_time(&momentum) - engine.diff(lagrangian, coordinate.symbol());
            engine.simplify(&equation)
        })
        .collect()
}
