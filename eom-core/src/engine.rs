//! The capability seam between the pipeline and the computer algebra.
//!
//! Pipeline stages never call `eom-symbolic` directly; they go through
//! [`CasEngine`]. That keeps the algebra injectable, so unit tests can drive
//! a stage with a lightweight fake and assert on exactly the calls the
//! stage makes.

use eom_symbolic::{Expr, SolveError};

/// The computer-algebra operations the derivation pipeline consumes.
///
/// Implementations must be deterministic: the same input expression always
/// yields the same output expression.
pub trait CasEngine {
    /// Total derivative with respect to time.
    fn diff_time(&self, expr: &Expr) -> Expr;

    /// Partial derivative with respect to a single target node.
    fn diff(&self, expr: &Expr, target: &Expr) -> Expr;

    /// General algebraic simplification to canonical form.
    fn simplify(&self, expr: &Expr) -> Expr;

    /// Trigonometric identity reduction. Callers apply this after
    /// [`CasEngine::simplify`]; identities hide in unmerged terms otherwise.
    fn trig_simplify(&self, expr: &Expr) -> Expr;

    /// Solves `equations[i] = 0` simultaneously for `unknowns`, returning
    /// one closed-form expression per unknown, in unknown order.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveError`] when the system has no unique closed-form
    /// solution.
    fn solve(&self, equations: &[Expr], unknowns: &[Expr]) -> Result<Vec<Expr>, SolveError>;
}

/// The default engine, backed by `eom-symbolic`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeEngine;

impl CasEngine for NativeEngine {
    fn diff_time(&self, expr: &Expr) -> Expr {
        eom_symbolic::diff_time(expr)
    }

    fn diff(&self, expr: &Expr, target: &Expr) -> Expr {
        eom_symbolic::diff(expr, target)
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        eom_symbolic::simplify(expr)
    }

    fn trig_simplify(&self, expr: &Expr) -> Expr {
        eom_symbolic::trig_simplify(expr)
    }

    fn solve(&self, equations: &[Expr], unknowns: &[Expr]) -> Result<Vec<Expr>, SolveError> {
        eom_symbolic::solve_linear(equations, unknowns)
    }
}
