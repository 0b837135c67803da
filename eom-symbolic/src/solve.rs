//! Symbolic solution of small linear systems.
//!
//! The Euler–Lagrange equations of a fixed-kinematics chain are linear in
//! the highest-order derivatives, so solving for the accelerations reduces
//! to extracting a coefficient matrix and eliminating it in closed form.
//! [`solve_linear`] validates the system shape, checks linearity in every
//! unknown, and applies Cramer elimination for one or two unknowns.
//!
//! A structurally zero determinant means the system has no unique solution;
//! that is a hard error, not something to retry, because the computation is
//! deterministic.

use thiserror::Error;

use crate::diff::diff;
use crate::expr::Expr;
use crate::normalize::simplify;

/// Errors from [`solve_linear`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("system is not square: {equations} equations for {unknowns} unknowns")]
    NotSquare { equations: usize, unknowns: usize },
    #[error("only systems of one or two unknowns are supported, got {0}")]
    UnsupportedSize(usize),
    #[error("equation is not linear in unknown `{unknown}`")]
    Nonlinear { unknown: String },
    #[error("coefficient matrix is singular")]
    Singular,
}

/// Solves `equations[i] = 0` simultaneously for `unknowns`, treating every
/// other symbol as a known constant or function.
///
/// Returns one closed-form expression per unknown, in unknown order.
///
/// # Errors
///
/// Returns [`SolveError::NotSquare`] when the counts disagree,
/// [`SolveError::Nonlinear`] when an unknown appears nonlinearly, and
/// [`SolveError::Singular`] when the coefficient matrix has a structurally
/// zero determinant.
pub fn solve_linear(equations: &[Expr], unknowns: &[Expr]) -> Result<Vec<Expr>, SolveError> {
    if equations.len() != unknowns.len() {
        return Err(SolveError::NotSquare {
            equations: equations.len(),
            unknowns: unknowns.len(),
        });
    }
    match unknowns.len() {
        1 | 2 => {}
        n => return Err(SolveError::UnsupportedSize(n)),
    }

    let n = unknowns.len();
    let mut coeffs = vec![vec![Expr::int(0); n]; n];
    let mut residuals = Vec::with_capacity(n);

    for (i, equation) in equations.iter().enumerate() {
        for (j, unknown) in unknowns.iter().enumerate() {
            let coeff = simplify(&diff(equation, unknown));
            // Linear means no unknown survives into any coefficient.
            if let Some(offender) = unknowns.iter().find(|u| coeff.contains(u)) {
                return Err(SolveError::Nonlinear {
                    unknown: offender.to_string(),
                });
            }
            coeffs[i][j] = coeff;
        }
        let mut residual = equation.clone();
        for unknown in unknowns {
            residual = residual.substitute(unknown, &Expr::int(0));
        }
        residuals.push(simplify(&residual));
    }

    match n {
        1 => {
            let det = coeffs[0][0].clone();
            if det.is_zero() {
                return Err(SolveError::Singular);
            }
            // a·x + b = 0  ⇒  x = -b/a
            let solution = simplify(&(-residuals[0].clone() * det.powi(-1)));
            Ok(vec![solution])
        }
        _ => {
            let det = simplify(
                &(coeffs[0][0].clone() * coeffs[1][1].clone()
                    - coeffs[0][1].clone() * coeffs[1][0].clone()),
            );
            if det.is_zero() {
                return Err(SolveError::Singular);
            }
            let inv_det = det.powi(-1);
            // Cramer elimination of  A·x = -b.
            let x0 = simplify(
                &((coeffs[0][1].clone() * residuals[1].clone()
                    - coeffs[1][1].clone() * residuals[0].clone())
                    * inv_det.clone()),
            );
            let x1 = simplify(
                &((coeffs[1][0].clone() * residuals[0].clone()
                    - coeffs[0][0].clone() * residuals[1].clone())
                    * inv_det),
            );
            Ok(vec![x0, x1])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknowns() -> (Expr, Expr) {
        (Expr::deriv("q1", 2), Expr::deriv("q2", 2))
    }

    #[test]
    fn solves_a_single_equation() {
        // 2x - 6 = 0
        let x = Expr::deriv("q1", 2);
        let eq = Expr::int(2) * x.clone() - Expr::int(6);
        let got = solve_linear(&[eq], &[x]).expect("solvable");
        assert_eq!(got, vec![Expr::int(3)]);
    }

    #[test]
    fn solves_a_coupled_pair() {
        // x + y - 3 = 0,  x - y - 1 = 0  ⇒  x = 2, y = 1
        let (x, y) = unknowns();
        let eq1 = x.clone() + y.clone() - Expr::int(3);
        let eq2 = x.clone() - y.clone() - Expr::int(1);
        let got = solve_linear(&[eq1, eq2], &[x, y]).expect("solvable");
        assert_eq!(got, vec![Expr::int(2), Expr::int(1)]);
    }

    #[test]
    fn symbolic_coefficients_survive() {
        // m·x - g = 0  ⇒  x = g/m
        let x = Expr::deriv("q1", 2);
        let eq = Expr::sym("m") * x.clone() - Expr::sym("g");
        let got = solve_linear(&[eq], &[x]).expect("solvable");
        let want = simplify(&(Expr::sym("g") * Expr::sym("m").powi(-1)));
        assert_eq!(got, vec![want]);
    }

    #[test]
    fn duplicated_equations_are_singular() {
        let (x, y) = unknowns();
        let eq = x.clone() + y.clone() - Expr::int(1);
        let err = solve_linear(&[eq.clone(), eq], &[x, y]).unwrap_err();
        assert_eq!(err, SolveError::Singular);
    }

    #[test]
    fn scaled_copies_are_singular() {
        let (x, y) = unknowns();
        let eq1 = x.clone() + y.clone() - Expr::int(1);
        let eq2 = Expr::int(2) * x.clone() + Expr::int(2) * y.clone() - Expr::int(5);
        let err = solve_linear(&[eq1, eq2], &[x, y]).unwrap_err();
        assert_eq!(err, SolveError::Singular);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let (x, y) = unknowns();
        let eq = x.clone() + y.clone();
        let err = solve_linear(&[eq], &[x, y]).unwrap_err();
        assert_eq!(
            err,
            SolveError::NotSquare {
                equations: 1,
                unknowns: 2
            }
        );
    }

    #[test]
    fn nonlinear_unknowns_are_rejected() {
        let x = Expr::deriv("q1", 2);
        let eq = x.clone().powi(2) - Expr::int(4);
        let err = solve_linear(&[eq], &[x]).unwrap_err();
        assert!(matches!(err, SolveError::Nonlinear { .. }));
    }
}
