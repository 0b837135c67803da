//! Textual rendering of expression trees.
//!
//! The output follows the conventions downstream text consumers expect from
//! a CAS: time functions render as `name(t)`, first time derivatives as
//! `Derivative(name(t), t)`, powers as `base**exp`, and rational
//! coefficients fold into products (`m*v**2/2`). Parentheses are always
//! balanced; precedence decides where they appear.

use std::fmt;

use crate::expr::Expr;
use crate::rational::Rational;

const PREC_SUM: u8 = 0;
const PREC_PRODUCT: u8 = 1;
const PREC_POWER: u8 = 2;
const PREC_ATOM: u8 = 3;

fn prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(_) => PREC_SUM,
        Expr::Mul(_) => PREC_PRODUCT,
        Expr::Num(r) => {
            if r.is_negative() {
                PREC_SUM
            } else if r.denominator() != 1 {
                PREC_PRODUCT
            } else {
                PREC_ATOM
            }
        }
        Expr::Pow(_, _) => PREC_POWER,
        Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) | Expr::Sin(_) | Expr::Cos(_) => {
            PREC_ATOM
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, PREC_SUM)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, min_prec: u8) -> fmt::Result {
    if prec(expr) < min_prec {
        write!(f, "(")?;
        write_raw(f, expr)?;
        write!(f, ")")
    } else {
        write_raw(f, expr)
    }
}

fn write_raw(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Num(r) => write!(f, "{r}"),
        Expr::Sym(name) => write!(f, "{name}"),
        Expr::TimeFn(name) => write!(f, "{name}(t)"),
        Expr::Deriv(name, 1) => write!(f, "Derivative({name}(t), t)"),
        Expr::Deriv(name, order) => write!(f, "Derivative({name}(t), (t, {order}))"),
        Expr::Sin(arg) => {
            write!(f, "sin(")?;
            write_raw(f, arg)?;
            write!(f, ")")
        }
        Expr::Cos(arg) => {
            write!(f, "cos(")?;
            write_raw(f, arg)?;
            write!(f, ")")
        }
        Expr::Pow(base, exp) => {
            write_expr(f, base, PREC_ATOM)?;
            if *exp < 0 {
                write!(f, "**({exp})")
            } else {
                write!(f, "**{exp}")
            }
        }
        Expr::Mul(factors) => write_product(f, factors, Rational::ONE, false),
        Expr::Add(terms) => write_sum(f, terms),
    }
}

/// Writes a product, folding `extra` into the first numeric factor found.
/// When `strip_sign` is set, the sign of the folded coefficient is dropped
/// (the caller has already emitted it).
fn write_product(
    f: &mut fmt::Formatter<'_>,
    factors: &[Expr],
    extra: Rational,
    strip_sign: bool,
) -> fmt::Result {
    let mut coeff = extra;
    let mut rest: Vec<&Expr> = Vec::with_capacity(factors.len());
    let mut coeff_taken = false;
    for factor in factors {
        match factor {
            Expr::Num(r) if !coeff_taken => {
                coeff = coeff * *r;
                coeff_taken = true;
            }
            other => rest.push(other),
        }
    }
    if strip_sign {
        coeff = coeff.abs();
    }
    if coeff.is_negative() {
        write!(f, "-")?;
        coeff = coeff.abs();
    }

    let mut wrote_factor = false;
    let numerator = coeff.numerator();
    if numerator != 1 || rest.is_empty() {
        write!(f, "{numerator}")?;
        wrote_factor = true;
    }
    for factor in rest {
        if wrote_factor {
            write!(f, "*")?;
        }
        write_expr(f, factor, PREC_POWER)?;
        wrote_factor = true;
    }
    if coeff.denominator() != 1 {
        write!(f, "/{}", coeff.denominator())?;
    }
    Ok(())
}

/// True when the term renders with a leading minus sign.
fn is_negative_term(term: &Expr) -> bool {
    match term {
        Expr::Num(r) => r.is_negative(),
        Expr::Mul(factors) => factors
            .iter()
            .find_map(|factor| match factor {
                Expr::Num(r) => Some(r.is_negative()),
                _ => None,
            })
            .unwrap_or(false),
        _ => false,
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, term: &Expr, strip_sign: bool) -> fmt::Result {
    match term {
        Expr::Num(r) => {
            let r = if strip_sign { r.abs() } else { *r };
            write!(f, "{r}")
        }
        Expr::Mul(factors) => write_product(f, factors, Rational::ONE, strip_sign),
        Expr::Add(_) => {
            write!(f, "(")?;
            write_raw(f, term)?;
            write!(f, ")")
        }
        other => write_raw(f, other),
    }
}

fn write_sum(f: &mut fmt::Formatter<'_>, terms: &[Expr]) -> fmt::Result {
    if terms.is_empty() {
        return write!(f, "0");
    }
    write_term(f, &terms[0], false)?;
    for term in &terms[1..] {
        if is_negative_term(term) {
            write!(f, " - ")?;
            write_term(f, term, true)?;
        } else {
            write!(f, " + ")?;
            write_term(f, term, false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn time_functions_and_derivatives_render_cas_style() {
        assert_eq!(Expr::time_fn("mass_1.angle").to_string(), "mass_1.angle(t)");
        assert_eq!(
            Expr::deriv("mass_1.angle", 1).to_string(),
            "Derivative(mass_1.angle(t), t)"
        );
        assert_eq!(
            Expr::deriv("mass_1.angle", 2).to_string(),
            "Derivative(mass_1.angle(t), (t, 2))"
        );
    }

    #[test]
    fn rational_coefficients_fold_into_products() {
        let half_mv2 = Expr::Mul(vec![
            Expr::rational(1, 2),
            Expr::sym("m"),
            Expr::sym("v").powi(2),
        ]);
        assert_eq!(half_mv2.to_string(), "m*v**2/2");
    }

    #[test]
    fn sums_fold_signs_into_separators() {
        let expr = Expr::Add(vec![
            Expr::sym("a"),
            Expr::Mul(vec![Expr::int(-1), Expr::sym("b")]),
            Expr::int(-3),
        ]);
        assert_eq!(expr.to_string(), "a - b - 3");
    }

    #[test]
    fn nested_sums_are_parenthesized_in_products() {
        let expr = Expr::Mul(vec![
            Expr::sym("l"),
            Expr::Add(vec![Expr::sym("a"), Expr::sym("b")]),
        ]);
        assert_eq!(expr.to_string(), "l*(a + b)");
    }

    #[test]
    fn negative_exponents_stay_balanced() {
        let expr = Expr::sym("d").powi(-1);
        assert_eq!(expr.to_string(), "d**(-1)");
        let text = expr.to_string();
        assert_eq!(
            text.matches('(').count(),
            text.matches(')').count()
        );
    }

    #[test]
    fn trig_arguments_render_unwrapped() {
        let arg = Expr::time_fn("q1") - Expr::time_fn("q2");
        assert_eq!(Expr::sin(arg).to_string(), "sin(q1(t) - q2(t))");
    }
}
