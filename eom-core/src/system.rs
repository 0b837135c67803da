//! The coupled equation system and its solution stage.
//!
//! An [`EquationSystem`] pairs the Euler–Lagrange equations (each
//! implicitly `= 0`) with the ordered unknowns to solve for — here, the two
//! angular accelerations. [`solve_system`] hands the system to the engine
//! and maps every capability failure into the pipeline's error taxonomy.
//! Both failure modes are fatal: a deterministic symbolic derivation that
//! cannot solve now will not solve on retry.

use eom_symbolic::{Expr, SolveError};
use thiserror::Error;

use crate::engine::CasEngine;

/// Fatal failures of a derivation run.
#[derive(Debug, Error)]
pub enum DeriveError {
    /// The coupled system has no unique closed-form solution for the
    /// requested unknowns.
    #[error("equation system has no unique solution for the requested unknowns")]
    UnsolvableSystem(#[source] SolveError),

    /// The solver returned fewer solutions than requested unknowns.
    #[error("solver returned {got} of {expected} requested solutions")]
    IncompleteSolution { expected: usize, got: usize },
}

/// An ordered set of equations, each implicitly equated to zero, paired
/// with the ordered unknowns to solve for.
///
/// The system must be square; [`solve_system`] fails otherwise.
#[derive(Debug, Clone)]
pub struct EquationSystem {
    equations: Vec<Expr>,
    unknowns: Vec<Expr>,
}

impl EquationSystem {
    pub fn new(equations: Vec<Expr>, unknowns: Vec<Expr>) -> Self {
        Self {
            equations,
            unknowns,
        }
    }

    pub fn equations(&self) -> &[Expr] {
        &self.equations
    }

    pub fn unknowns(&self) -> &[Expr] {
        &self.unknowns
    }
}

/// Solves the system for its unknowns, one closed form per unknown, in
/// unknown order.
///
/// # Errors
///
/// Returns [`DeriveError::UnsolvableSystem`] when the engine reports the
/// system degenerate and [`DeriveError::IncompleteSolution`] when it
/// returns a partial mapping.
pub fn solve_system(
    engine: &impl CasEngine,
    system: &EquationSystem,
) -> Result<Vec<Expr>, DeriveError> {
    let solutions = engine
        .solve(system.equations(), system.unknowns())
        .map_err(DeriveError::UnsolvableSystem)?;
    if solutions.len() != system.unknowns().len() {
        return Err(DeriveError::IncompleteSolution {
            expected: system.unknowns().len(),
            got: solutions.len(),
        });
    }
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NativeEngine;

    /// A fake capability that claims success but loses solutions.
    struct LossyEngine;

    impl CasEngine for LossyEngine {
        fn diff_time(&self, expr: &Expr) -> Expr {
            expr.clone()
        }

        fn diff(&self, expr: &Expr, _target: &Expr) -> Expr {
            expr.clone()
        }

        fn simplify(&self, expr: &Expr) -> Expr {
            expr.clone()
        }

        fn trig_simplify(&self, expr: &Expr) -> Expr {
            expr.clone()
        }

        fn solve(&self, _equations: &[Expr], _unknowns: &[Expr]) -> Result<Vec<Expr>, SolveError> {
            Ok(vec![Expr::int(0)])
        }
    }

    fn accelerations() -> (Expr, Expr) {
        (Expr::deriv("mass_1.angle", 2), Expr::deriv("mass_2.angle", 2))
    }

    #[test]
    fn solves_a_well_posed_system() {
        let (a1, a2) = accelerations();
        let system = EquationSystem::new(
            vec![
                a1.clone() + a2.clone() - Expr::int(3),
                a1.clone() - a2.clone() - Expr::int(1),
            ],
            vec![a1, a2],
        );
        let solutions = solve_system(&NativeEngine, &system).expect("solvable");
        assert_eq!(solutions, vec![Expr::int(2), Expr::int(1)]);
    }

    #[test]
    fn degenerate_systems_are_unsolvable() {
        let (a1, a2) = accelerations();
        let duplicated = a1.clone() + a2.clone() - Expr::int(1);
        let system = EquationSystem::new(vec![duplicated.clone(), duplicated], vec![a1, a2]);
        let err = solve_system(&NativeEngine, &system).unwrap_err();
        assert!(matches!(
            err,
            DeriveError::UnsolvableSystem(SolveError::Singular)
        ));
    }

    #[test]
    fn partial_mappings_are_incomplete() {
        let (a1, a2) = accelerations();
        let system = EquationSystem::new(
            vec![a1.clone(), a2.clone()],
            vec![a1, a2],
        );
        let err = solve_system(&LossyEngine, &system).unwrap_err();
        assert!(matches!(
            err,
            DeriveError::IncompleteSolution {
                expected: 2,
                got: 1
            }
        ));
    }
}
