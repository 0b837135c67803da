//! Staged algebraic normalization.
//!
//! [`simplify`] runs a fixed pipeline of rewrite passes to a bounded
//! fixpoint: flatten nested sums/products, fold rational constants, merge
//! repeated factors into powers, expand products of sums, collect like
//! terms, and push signs out of trigonometric arguments. The result is a
//! canonical form: terms and factors are totally ordered, constants sit
//! first, and structurally equal inputs always normalize to byte-identical
//! trees.
//!
//! Every pass is equivalence-preserving, so normalization never changes the
//! value of an expression under numeric substitution.

use std::collections::BTreeMap;

use crate::expr::Expr;
use crate::rational::Rational;

/// Upper bound on pipeline rounds. Each round is a full pass sequence; the
/// loop exits as soon as a round is a no-op.
const MAX_ROUNDS: usize = 24;

/// Normalizes an expression to canonical form.
pub fn simplify(expr: &Expr) -> Expr {
    let mut current = expr.clone();
    for _ in 0..MAX_ROUNDS {
        let next = round(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn round(expr: &Expr) -> Expr {
    let passes: [fn(&Expr) -> Expr; 8] = [
        flatten,
        fold_constants,
        merge_powers,
        expand,
        flatten,
        fold_constants,
        collect_terms,
        canonicalize_trig_sign,
    ];
    passes.iter().fold(expr.clone(), |acc, pass| pass(&acc))
}

/// Applies `rule` to every node, children first.
fn bottom_up(expr: &Expr, rule: &impl Fn(Expr) -> Expr) -> Expr {
    let rebuilt = match expr {
        Expr::Num(_) | Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) => expr.clone(),
        Expr::Add(terms) => Expr::Add(terms.iter().map(|t| bottom_up(t, rule)).collect()),
        Expr::Mul(factors) => Expr::Mul(factors.iter().map(|f| bottom_up(f, rule)).collect()),
        Expr::Pow(base, exp) => Expr::Pow(Box::new(bottom_up(base, rule)), *exp),
        Expr::Sin(arg) => Expr::Sin(Box::new(bottom_up(arg, rule))),
        Expr::Cos(arg) => Expr::Cos(Box::new(bottom_up(arg, rule))),
    };
    rule(rebuilt)
}

fn unwrap_sum(mut terms: Vec<Expr>) -> Expr {
    match terms.len() {
        0 => Expr::int(0),
        1 => terms.pop().unwrap_or_else(|| Expr::int(0)),
        _ => Expr::Add(terms),
    }
}

fn unwrap_product(mut factors: Vec<Expr>) -> Expr {
    match factors.len() {
        0 => Expr::int(1),
        1 => factors.pop().unwrap_or_else(|| Expr::int(1)),
        _ => Expr::Mul(factors),
    }
}

/// Splices nested sums into sums and nested products into products.
fn flatten(expr: &Expr) -> Expr {
    bottom_up(expr, &|node| match node {
        Expr::Add(terms) => {
            let mut out = Vec::with_capacity(terms.len());
            for term in terms {
                match term {
                    Expr::Add(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            unwrap_sum(out)
        }
        Expr::Mul(factors) => {
            let mut out = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    Expr::Mul(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            unwrap_product(out)
        }
        other => other,
    })
}

/// Folds rational constants, removes identities, and evaluates trivial
/// powers and trig values.
fn fold_constants(expr: &Expr) -> Expr {
    bottom_up(expr, &|node| match node {
        Expr::Add(terms) => {
            let mut acc = Rational::ZERO;
            let mut rest = Vec::with_capacity(terms.len());
            for term in terms {
                match term {
                    Expr::Num(r) => acc = acc + r,
                    other => rest.push(other),
                }
            }
            if !acc.is_zero() || rest.is_empty() {
                rest.insert(0, Expr::Num(acc));
            }
            unwrap_sum(rest)
        }
        Expr::Mul(factors) => {
            let mut acc = Rational::ONE;
            let mut rest = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    Expr::Num(r) => acc = acc * r,
                    other => rest.push(other),
                }
            }
            if acc.is_zero() {
                return Expr::int(0);
            }
            if !acc.is_one() || rest.is_empty() {
                rest.insert(0, Expr::Num(acc));
            }
            unwrap_product(rest)
        }
        Expr::Pow(base, exp) => {
            if exp == 0 {
                return Expr::int(1);
            }
            if exp == 1 {
                return *base;
            }
            match *base {
                Expr::Num(r) => match r.powi(exp) {
                    Some(folded) => Expr::Num(folded),
                    None => Expr::Pow(Box::new(Expr::Num(r)), exp),
                },
                Expr::Pow(inner, inner_exp) => Expr::Pow(inner, inner_exp * exp),
                Expr::Mul(factors) => Expr::Mul(
                    factors
                        .into_iter()
                        .map(|factor| factor.powi(exp))
                        .collect(),
                ),
                other => Expr::Pow(Box::new(other), exp),
            }
        }
        Expr::Sin(arg) if arg.is_zero() => Expr::int(0),
        Expr::Cos(arg) if arg.is_zero() => Expr::int(1),
        other => other,
    })
}

/// Merges repeated factors into integer powers and orders factors
/// canonically.
fn merge_powers(expr: &Expr) -> Expr {
    bottom_up(expr, &|node| match node {
        Expr::Mul(factors) => {
            let mut exponents: BTreeMap<Expr, i32> = BTreeMap::new();
            for factor in factors {
                let (base, exp) = match factor {
                    Expr::Pow(base, exp) => (*base, exp),
                    other => (other, 1),
                };
                *exponents.entry(base).or_insert(0) += exp;
            }
            let mut out = Vec::with_capacity(exponents.len());
            for (base, exp) in exponents {
                match exp {
                    0 => {}
                    1 => out.push(base),
                    _ => out.push(base.powi(exp)),
                }
            }
            unwrap_product(out)
        }
        other => other,
    })
}

/// Distributes products over sums and expands small positive powers of
/// sums. Sums under negative powers (denominators) are left opaque.
fn expand(expr: &Expr) -> Expr {
    bottom_up(expr, &|node| match node {
        Expr::Pow(base, exp) if (2..=3).contains(&exp) => match *base {
            Expr::Add(terms) => {
                let sums = vec![terms; exp as usize];
                distribute(&sums, &[])
            }
            other => Expr::Pow(Box::new(other), exp),
        },
        Expr::Mul(factors) => {
            if factors.iter().any(|f| matches!(f, Expr::Add(_))) {
                let mut sums = Vec::new();
                let mut plain = Vec::new();
                for factor in factors {
                    match factor {
                        Expr::Add(terms) => sums.push(terms),
                        other => plain.push(other),
                    }
                }
                distribute(&sums, &plain)
            } else {
                Expr::Mul(factors)
            }
        }
        other => other,
    })
}

/// Builds the sum of all cross products of `sums`, with `plain` factors
/// carried into every term.
fn distribute(sums: &[Vec<Expr>], plain: &[Expr]) -> Expr {
    let mut terms: Vec<Vec<Expr>> = vec![plain.to_vec()];
    for sum in sums {
        let mut next = Vec::with_capacity(terms.len() * sum.len());
        for partial in &terms {
            for term in sum {
                let mut extended = partial.clone();
                extended.push(term.clone());
                next.push(extended);
            }
        }
        terms = next;
    }
    unwrap_sum(terms.into_iter().map(unwrap_product).collect())
}

/// Sums the rational coefficients of structurally equal monomials and
/// orders the surviving terms canonically.
fn collect_terms(expr: &Expr) -> Expr {
    bottom_up(expr, &|node| match node {
        Expr::Add(terms) => {
            let mut collected: BTreeMap<Vec<Expr>, Rational> = BTreeMap::new();
            for term in terms {
                let (coeff, key) = split_term(term);
                let entry = collected.entry(key).or_insert(Rational::ZERO);
                *entry = *entry + coeff;
            }
            let mut out = Vec::with_capacity(collected.len());
            for (key, coeff) in collected {
                if coeff.is_zero() {
                    continue;
                }
                out.push(rebuild_term(coeff, key));
            }
            unwrap_sum(out)
        }
        other => other,
    })
}

/// Splits a term into its rational coefficient and a sorted monomial key.
fn split_term(term: Expr) -> (Rational, Vec<Expr>) {
    match term {
        Expr::Num(r) => (r, Vec::new()),
        Expr::Mul(factors) => {
            let mut coeff = Rational::ONE;
            let mut key = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    Expr::Num(r) => coeff = coeff * r,
                    other => key.push(other),
                }
            }
            key.sort();
            (coeff, key)
        }
        other => (Rational::ONE, vec![other]),
    }
}

fn rebuild_term(coeff: Rational, mut key: Vec<Expr>) -> Expr {
    if key.is_empty() {
        return Expr::Num(coeff);
    }
    if coeff.is_one() {
        return unwrap_product(key);
    }
    key.insert(0, Expr::Num(coeff));
    Expr::Mul(key)
}

/// Rewrites `sin(-u)` as `-sin(u)` and `cos(-u)` as `cos(u)` when the
/// argument is uniformly negative, so equivalent angles share one spelling.
fn canonicalize_trig_sign(expr: &Expr) -> Expr {
    bottom_up(expr, &|node| match node {
        Expr::Sin(arg) => match negated_form(&arg) {
            Some(positive) => Expr::Mul(vec![Expr::int(-1), Expr::sin(positive)]),
            None => Expr::Sin(arg),
        },
        Expr::Cos(arg) => match negated_form(&arg) {
            Some(positive) => Expr::cos(positive),
            None => Expr::Cos(arg),
        },
        other => other,
    })
}

/// Returns the negation of `expr` when every term carries a negative
/// coefficient; `None` otherwise. Negating a uniformly negative expression
/// yields a uniformly positive one, so this cannot oscillate.
fn negated_form(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Num(r) if r.is_negative() => Some(Expr::Num(-*r)),
        Expr::Mul(factors) => negate_product(factors),
        Expr::Add(terms) if !terms.is_empty() => {
            let negated: Option<Vec<Expr>> = terms
                .iter()
                .map(|term| match term {
                    Expr::Num(r) if r.is_negative() => Some(Expr::Num(-*r)),
                    Expr::Mul(factors) => negate_product(factors),
                    _ => None,
                })
                .collect();
            negated.map(Expr::Add)
        }
        _ => None,
    }
}

/// Negates a product whose folded coefficient is negative.
fn negate_product(factors: &[Expr]) -> Option<Expr> {
    let position = factors
        .iter()
        .position(|factor| matches!(factor, Expr::Num(r) if r.is_negative()))?;
    let mut out = Vec::with_capacity(factors.len());
    for (i, factor) in factors.iter().enumerate() {
        if i == position {
            if let Expr::Num(r) = factor {
                let flipped = -*r;
                if !flipped.is_one() || factors.len() == 1 {
                    out.push(Expr::Num(flipped));
                }
            }
        } else {
            out.push(factor.clone());
        }
    }
    Some(unwrap_product(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_terms_collect() {
        let x = Expr::sym("x");
        let got = simplify(&(x.clone() + x.clone()));
        assert_eq!(got, Expr::Mul(vec![Expr::int(2), x]));
    }

    #[test]
    fn cancellation_yields_zero() {
        let x = Expr::sym("x");
        assert!(simplify(&(x.clone() - x)).is_zero());

        // Commuted products cancel too.
        let a = Expr::sym("a");
        let b = Expr::sym("b");
        let expr = a.clone() * b.clone() - b * a;
        assert!(simplify(&expr).is_zero());
    }

    #[test]
    fn repeated_factors_merge_into_powers() {
        let x = Expr::sym("x");
        let got = simplify(&(x.clone() * x.clone()));
        assert_eq!(got, x.powi(2));
    }

    #[test]
    fn products_of_sums_expand_and_collect() {
        let a = Expr::sym("a");
        let b = Expr::sym("b");
        let expr = (a.clone() + b.clone()) * (a.clone() - b.clone());
        let want = simplify(&(a.powi(2) - b.powi(2)));
        assert_eq!(simplify(&expr), want);
    }

    #[test]
    fn constants_fold_and_annihilate() {
        let x = Expr::sym("x");
        let got = simplify(&(Expr::int(2) * Expr::int(3) * x.clone()));
        assert_eq!(got, Expr::Mul(vec![Expr::int(6), x.clone()]));
        assert!(simplify(&(Expr::int(0) * x)).is_zero());
    }

    #[test]
    fn trivial_powers_reduce() {
        let x = Expr::sym("x");
        assert_eq!(simplify(&x.clone().powi(1)), x.clone());
        assert!(simplify(&x.clone().powi(0)).is_one());
        assert_eq!(simplify(&x.clone().powi(2).powi(3)), x.powi(6));
    }

    #[test]
    fn negative_angles_normalize() {
        let x = Expr::time_fn("x");
        let got = simplify(&Expr::sin(-x.clone()));
        assert_eq!(got, Expr::Mul(vec![Expr::int(-1), Expr::sin(x.clone())]));
        assert_eq!(simplify(&Expr::cos(-x.clone())), Expr::cos(x));
    }

    #[test]
    fn denominators_stay_opaque() {
        // A sum under a negative power must not be distributed away.
        let den = Expr::sym("a") + Expr::sym("b");
        let expr = Expr::sym("c") * den.clone().powi(-1);
        let got = simplify(&expr);
        assert!(got.contains(&simplify(&den).powi(-1)));
    }

    #[test]
    fn normalization_is_deterministic() {
        let build = || {
            let q = Expr::time_fn("q");
            Expr::sin(q.clone()) * Expr::cos(q.clone()) + Expr::cos(q.clone()) * Expr::sin(q)
        };
        assert_eq!(simplify(&build()), simplify(&build()));
    }
}
