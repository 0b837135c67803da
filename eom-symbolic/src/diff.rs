//! Symbolic differentiation.
//!
//! Two operations cover everything Lagrangian mechanics needs:
//!
//! - [`diff_time`], the total time derivative `d/dt`. Time functions become
//!   first derivatives, derivatives gain an order, and plain symbols vanish.
//! - [`diff`], the partial derivative with respect to a single target node.
//!   The target is matched structurally; every other leaf is held constant,
//!   including other derivatives of the same time function. This is exactly
//!   the `∂L/∂q` and `∂L/∂q̇` notion the Euler–Lagrange operator needs.
//!
//! Differentiation of a well-formed tree never fails; both functions are
//! total.

use crate::expr::Expr;

/// The total derivative with respect to time.
pub fn diff_time(expr: &Expr) -> Expr {
    match expr {
        Expr::Num(_) | Expr::Sym(_) => Expr::int(0),
        Expr::TimeFn(name) => Expr::Deriv(name.clone(), 1),
        Expr::Deriv(name, order) => Expr::Deriv(name.clone(), order + 1),
        Expr::Add(terms) => Expr::Add(terms.iter().map(diff_time).collect()),
        Expr::Mul(factors) => product_rule(factors, diff_time),
        Expr::Pow(base, exp) => power_rule(base, *exp, diff_time),
        Expr::Sin(arg) => Expr::Mul(vec![Expr::cos((**arg).clone()), diff_time(arg)]),
        Expr::Cos(arg) => Expr::Mul(vec![
            Expr::int(-1),
            Expr::sin((**arg).clone()),
            diff_time(arg),
        ]),
    }
}

/// The partial derivative with respect to `target`.
///
/// `target` is expected to be a leaf (`Sym`, `TimeFn`, or `Deriv`); any
/// non-matching leaf differentiates to zero.
pub fn diff(expr: &Expr, target: &Expr) -> Expr {
    if expr == target {
        return Expr::int(1);
    }
    let recurse = |e: &Expr| diff(e, target);
    match expr {
        Expr::Num(_) | Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) => Expr::int(0),
        Expr::Add(terms) => Expr::Add(terms.iter().map(recurse).collect()),
        Expr::Mul(factors) => product_rule(factors, recurse),
        Expr::Pow(base, exp) => power_rule(base, *exp, recurse),
        Expr::Sin(arg) => Expr::Mul(vec![Expr::cos((**arg).clone()), recurse(arg)]),
        Expr::Cos(arg) => Expr::Mul(vec![
            Expr::int(-1),
            Expr::sin((**arg).clone()),
            recurse(arg),
        ]),
    }
}

fn product_rule(factors: &[Expr], derive: impl Fn(&Expr) -> Expr) -> Expr {
    let terms = factors
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let product = factors
                .iter()
                .enumerate()
                .map(|(j, factor)| {
                    if i == j {
                        derive(factor)
                    } else {
                        factor.clone()
                    }
                })
                .collect();
            Expr::Mul(product)
        })
        .collect();
    Expr::Add(terms)
}

fn power_rule(base: &Expr, exp: i32, derive: impl Fn(&Expr) -> Expr) -> Expr {
    Expr::Mul(vec![
        Expr::int(i64::from(exp)),
        base.clone().powi(exp - 1),
        derive(base),
    ])
}
