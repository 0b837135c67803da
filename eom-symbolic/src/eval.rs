//! Numeric evaluation of expression trees.
//!
//! Evaluation exists for spot checks: assign numbers to every leaf, then
//! confirm that a transformation preserved the value. The caller supplies a
//! resolver closure mapping each [`Atom`] leaf to a number, which keeps
//! binding policy (names, derivative orders) out of this crate.

use thiserror::Error;

use crate::expr::Expr;

/// A leaf that needs a numeric binding during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom<'a> {
    /// A named parameter.
    Sym(&'a str),
    /// A time function `name(t)` at the evaluation instant.
    TimeFn(&'a str),
    /// The `order`-th time derivative of `name(t)` at the instant.
    Deriv(&'a str, u32),
}

/// Errors from [`eval`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("no numeric binding for `{0}`")]
    Unbound(String),
    #[error("evaluation produced a non-finite value")]
    NonFinite,
}

/// Evaluates the expression with leaf values drawn from `resolve`.
///
/// # Errors
///
/// Returns [`EvalError::Unbound`] when the resolver has no value for a leaf
/// and [`EvalError::NonFinite`] when arithmetic overflows or divides by
/// zero (a negative power of a zero-valued base).
pub fn eval(expr: &Expr, resolve: &impl Fn(Atom<'_>) -> Option<f64>) -> Result<f64, EvalError> {
    let value = eval_inner(expr, resolve)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn eval_inner(expr: &Expr, resolve: &impl Fn(Atom<'_>) -> Option<f64>) -> Result<f64, EvalError> {
    match expr {
        Expr::Num(r) => Ok(r.to_f64()),
        Expr::Sym(name) => {
            resolve(Atom::Sym(name)).ok_or_else(|| EvalError::Unbound(name.clone()))
        }
        Expr::TimeFn(name) => {
            resolve(Atom::TimeFn(name)).ok_or_else(|| EvalError::Unbound(format!("{name}(t)")))
        }
        Expr::Deriv(name, order) => resolve(Atom::Deriv(name, *order))
            .ok_or_else(|| EvalError::Unbound(format!("d^{order}/dt^{order} {name}(t)"))),
        Expr::Add(terms) => terms.iter().try_fold(0.0, |acc, term| {
            Ok(acc + eval_inner(term, resolve)?)
        }),
        Expr::Mul(factors) => factors.iter().try_fold(1.0, |acc, factor| {
            Ok(acc * eval_inner(factor, resolve)?)
        }),
        Expr::Pow(base, exp) => Ok(eval_inner(base, resolve)?.powi(*exp)),
        Expr::Sin(arg) => Ok(eval_inner(arg, resolve)?.sin()),
        Expr::Cos(arg) => Ok(eval_inner(arg, resolve)?.cos()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::simplify;
    use crate::trig::trig_simplify;
    use approx::assert_relative_eq;

    fn resolver(atom: Atom<'_>) -> Option<f64> {
        match atom {
            Atom::Sym("m") => Some(2.0),
            Atom::Sym("g") => Some(9.81),
            Atom::TimeFn("q") => Some(0.7),
            Atom::Deriv("q", 1) => Some(-1.3),
            _ => None,
        }
    }

    #[test]
    fn evaluates_arithmetic_and_trig() {
        let q = Expr::time_fn("q");
        let expr = Expr::sym("m") * Expr::sin(q.clone()) + Expr::cos(q).powi(2);
        let got = eval(&expr, &resolver).expect("all leaves bound");
        let want = 2.0 * 0.7_f64.sin() + 0.7_f64.cos().powi(2);
        assert_relative_eq!(got, want, max_relative = 1e-12);
    }

    #[test]
    fn unbound_leaves_are_reported() {
        let expr = Expr::sym("unknown");
        assert_eq!(
            eval(&expr, &resolver),
            Err(EvalError::Unbound("unknown".into()))
        );
    }

    #[test]
    fn division_by_zero_is_non_finite() {
        let expr = Expr::int(0).powi(-1);
        assert_eq!(eval(&expr, &resolver), Err(EvalError::NonFinite));
    }

    #[test]
    fn simplification_preserves_value() {
        let q = Expr::time_fn("q");
        let qdot = Expr::deriv("q", 1);
        let messy = (Expr::sin(q.clone()).powi(2) + Expr::cos(q.clone()).powi(2))
            * Expr::sym("m")
            * qdot.clone()
            + Expr::sym("g") * Expr::sin(q.clone()) * Expr::cos(q.clone())
            + Expr::sym("g") * Expr::cos(q.clone()) * Expr::sin(q);
        let reduced = trig_simplify(&simplify(&messy));
        let before = eval(&messy, &resolver).expect("bound");
        let after = eval(&reduced, &resolver).expect("bound");
        assert_relative_eq!(before, after, max_relative = 1e-12);
    }
}
