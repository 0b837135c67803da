//! Trigonometric identity reduction.
//!
//! [`trig_simplify`] runs after algebraic normalization and rewrites sums of
//! trigonometric monomials using three identity families:
//!
//! - Pythagorean pairs: `R·sin²x + R·cos²x → R`
//! - Angle-addition product pairs:
//!   `R·sin(a)cos(b) ± R·cos(a)sin(b) → R·sin(a ± b)` and
//!   `R·cos(a)cos(b) ∓ R·sin(a)sin(b) → R·cos(a ± b)`
//! - Squared angle-addition trinomials, the expanded form of
//!   `(cos(a)cos(b) ± sin(a)sin(b))²` and `(sin(a)cos(b) ± cos(a)sin(b))²`.
//!
//! Every rewrite is an exact identity, so reduction preserves the value of
//! the expression under any numeric substitution. Terms the rules do not
//! match pass through untouched.

use std::collections::BTreeMap;

use crate::expr::Expr;
use crate::normalize::simplify;
use crate::rational::Rational;

const MAX_ROUNDS: usize = 12;

/// Reduces trigonometric identities throughout the tree.
///
/// The input is normalized first; call sites that already hold a normalized
/// expression pay only the fixpoint check.
pub fn trig_simplify(expr: &Expr) -> Expr {
    let mut current = simplify(expr);
    for _ in 0..MAX_ROUNDS {
        let next = simplify(&rewrite(&current));
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Applies the identity rules to every sum node, children first.
fn rewrite(expr: &Expr) -> Expr {
    let rebuilt = match expr {
        Expr::Num(_) | Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) => expr.clone(),
        Expr::Add(terms) => {
            let terms: Vec<Expr> = terms.iter().map(rewrite).collect();
            return reduce_sum(terms);
        }
        Expr::Mul(factors) => Expr::Mul(factors.iter().map(rewrite).collect()),
        Expr::Pow(base, exp) => Expr::Pow(Box::new(rewrite(base)), *exp),
        Expr::Sin(arg) => Expr::Sin(Box::new(rewrite(arg))),
        Expr::Cos(arg) => Expr::Cos(Box::new(rewrite(arg))),
    };
    rebuilt
}

/// A term viewed as a rational coefficient times a factor → exponent map.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Monomial {
    coeff: Rational,
    factors: BTreeMap<Expr, i32>,
}

impl Monomial {
    fn from_term(term: &Expr) -> Self {
        let mut coeff = Rational::ONE;
        let mut factors = BTreeMap::new();
        let push = |factor: &Expr, map: &mut BTreeMap<Expr, i32>, coeff: &mut Rational| {
            match factor {
                Expr::Num(r) => *coeff = *coeff * *r,
                Expr::Pow(base, exp) => *map.entry((**base).clone()).or_insert(0) += exp,
                other => *map.entry(other.clone()).or_insert(0) += 1,
            }
        };
        match term {
            Expr::Mul(parts) => {
                for part in parts {
                    push(part, &mut factors, &mut coeff);
                }
            }
            single => push(single, &mut factors, &mut coeff),
        }
        Self { coeff, factors }
    }

    fn to_expr(&self) -> Expr {
        let mut parts = Vec::with_capacity(self.factors.len() + 1);
        if !self.coeff.is_one() || self.factors.is_empty() {
            parts.push(Expr::Num(self.coeff));
        }
        for (base, exp) in &self.factors {
            match exp {
                0 => {}
                1 => parts.push(base.clone()),
                _ => parts.push(base.clone().powi(*exp)),
            }
        }
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Expr::Mul(parts)
        }
    }

    /// Removes `count` powers of `base`, or `None` if fewer are present.
    fn strip(&self, base: &Expr, count: i32) -> Option<Monomial> {
        let have = *self.factors.get(base)?;
        if have < count {
            return None;
        }
        let mut out = self.clone();
        if have == count {
            out.factors.remove(base);
        } else {
            out.factors.insert(base.clone(), have - count);
        }
        Some(out)
    }

    fn with_factor(mut self, base: Expr, exp: i32) -> Monomial {
        *self.factors.entry(base).or_insert(0) += exp;
        self
    }

    /// The sin/cos bases appearing in this monomial, with their exponents.
    fn trig_bases(&self) -> Vec<(Expr, i32)> {
        self.factors
            .iter()
            .filter(|(base, _)| matches!(base, Expr::Sin(_) | Expr::Cos(_)))
            .map(|(base, exp)| (base.clone(), *exp))
            .collect()
    }
}

fn reduce_sum(terms: Vec<Expr>) -> Expr {
    let mut monomials: Vec<Monomial> = terms.iter().map(Monomial::from_term).collect();
    let mut budget = 64usize;
    while budget > 0 && apply_one_rule(&mut monomials) {
        budget -= 1;
    }
    let rebuilt: Vec<Expr> = monomials.iter().map(Monomial::to_expr).collect();
    match rebuilt.len() {
        0 => Expr::int(0),
        1 => rebuilt.into_iter().next().unwrap_or_else(|| Expr::int(0)),
        _ => Expr::Add(rebuilt),
    }
}

/// Tries each identity family in order; fires at most one rewrite.
fn apply_one_rule(monomials: &mut Vec<Monomial>) -> bool {
    try_pythagorean(monomials)
        || try_product_pair(monomials)
        || try_squared_trinomial(monomials)
}

/// `c·R·sin²x + c·R·cos²x → c·R`
fn try_pythagorean(monomials: &mut Vec<Monomial>) -> bool {
    for i in 0..monomials.len() {
        for (base, exp) in monomials[i].trig_bases() {
            let Expr::Sin(arg) = &base else { continue };
            if exp < 2 {
                continue;
            }
            let Some(rest_i) = monomials[i].strip(&base, 2) else {
                continue;
            };
            let cos_base = Expr::cos((**arg).clone());
            for j in 0..monomials.len() {
                if j == i || monomials[j].coeff != monomials[i].coeff {
                    continue;
                }
                let Some(rest_j) = monomials[j].strip(&cos_base, 2) else {
                    continue;
                };
                if rest_i == rest_j {
                    replace_pair(monomials, i, j, rest_i);
                    return true;
                }
            }
        }
    }
    false
}

/// Angle-addition pairs over a shared remainder `R`:
/// `c·R·sin(a)cos(b) + c·R·cos(a)sin(b) → c·R·sin(a + b)` (and the `−`,
/// `cos·cos`, `sin·sin` variants).
fn try_product_pair(monomials: &mut Vec<Monomial>) -> bool {
    for i in 0..monomials.len() {
        let bases = monomials[i].trig_bases();
        for (first, _) in &bases {
            for (second, _) in &bases {
                let (sin_pair, a, b) = match (first, second) {
                    (Expr::Sin(a), Expr::Cos(b)) if a != b => (true, (**a).clone(), (**b).clone()),
                    (Expr::Cos(a), Expr::Cos(b)) if a < b => (false, (**a).clone(), (**b).clone()),
                    _ => continue,
                };
                let Some(rest_i) = monomials[i]
                    .strip(first, 1)
                    .and_then(|m| m.strip(second, 1))
                else {
                    continue;
                };
                // The partner term swaps sin and cos across the two angles.
                let (partner_first, partner_second) = if sin_pair {
                    (Expr::cos(a.clone()), Expr::sin(b.clone()))
                } else {
                    (Expr::sin(a.clone()), Expr::sin(b.clone()))
                };
                for j in 0..monomials.len() {
                    if j == i {
                        continue;
                    }
                    let same_sign = monomials[j].coeff == monomials[i].coeff;
                    let flipped_sign = monomials[j].coeff == -monomials[i].coeff;
                    if !same_sign && !flipped_sign {
                        continue;
                    }
                    let Some(rest_j) = monomials[j]
                        .strip(&partner_first, 1)
                        .and_then(|m| m.strip(&partner_second, 1))
                    else {
                        continue;
                    };
                    // The coefficient relation was checked above; the rests
                    // only have to agree structurally.
                    if rest_i.factors != rest_j.factors {
                        continue;
                    }
                    let combined = if sin_pair {
                        let arg = if same_sign {
                            simplify(&(a.clone() + b.clone()))
                        } else {
                            simplify(&(a.clone() - b.clone()))
                        };
                        Expr::sin(arg)
                    } else {
                        let arg = if same_sign {
                            simplify(&(a.clone() - b.clone()))
                        } else {
                            simplify(&(a.clone() + b.clone()))
                        };
                        Expr::cos(arg)
                    };
                    let merged = rest_i.clone().with_factor(combined, 1);
                    replace_pair(monomials, i, j, merged);
                    return true;
                }
            }
        }
    }
    false
}

/// The expanded square of an angle-addition pair:
/// `c·R·cos²a·cos²b ± 2c·R·sin(a)cos(a)sin(b)cos(b) + c·R·sin²a·sin²b
///   → c·R·cos(a ∓ b)²` (and the sin variant).
fn try_squared_trinomial(monomials: &mut Vec<Monomial>) -> bool {
    let half = Rational::new(1, 2);
    for mid in 0..monomials.len() {
        let bases = monomials[mid].trig_bases();
        // Candidate angle pairs with all four single trig factors present.
        let mut angles: Vec<Expr> = Vec::new();
        for (base, _) in &bases {
            let arg = match base {
                Expr::Sin(arg) | Expr::Cos(arg) => (**arg).clone(),
                _ => continue,
            };
            if !angles.contains(&arg) {
                angles.push(arg);
            }
        }
        for a in &angles {
            for b in &angles {
                if !(a < b) {
                    continue;
                }
                let Some(rest_mid) = monomials[mid]
                    .strip(&Expr::sin(a.clone()), 1)
                    .and_then(|m| m.strip(&Expr::cos(a.clone()), 1))
                    .and_then(|m| m.strip(&Expr::sin(b.clone()), 1))
                    .and_then(|m| m.strip(&Expr::cos(b.clone()), 1))
                else {
                    continue;
                };
                let c = monomials[mid].coeff * half;
                for cos_version in [true, false] {
                    // cos version: squares are cos²a·cos²b and sin²a·sin²b.
                    // sin version: squares are sin²a·cos²b and cos²a·sin²b.
                    let (first_a, first_b) = if cos_version {
                        (Expr::cos(a.clone()), Expr::cos(b.clone()))
                    } else {
                        (Expr::sin(a.clone()), Expr::cos(b.clone()))
                    };
                    let (second_a, second_b) = if cos_version {
                        (Expr::sin(a.clone()), Expr::sin(b.clone()))
                    } else {
                        (Expr::cos(a.clone()), Expr::sin(b.clone()))
                    };
                    let Some((i, rest_i)) = find_square(monomials, mid, &first_a, &first_b, c.abs())
                    else {
                        continue;
                    };
                    let Some((j, rest_j)) =
                        find_square(monomials, mid, &second_a, &second_b, c.abs())
                    else {
                        continue;
                    };
                    if i == j
                        || rest_i.factors != rest_mid.factors
                        || rest_j.factors != rest_mid.factors
                    {
                        continue;
                    }
                    let square_coeff = monomials[i].coeff;
                    if monomials[j].coeff != square_coeff {
                        continue;
                    }
                    // Middle coefficient is ±2·square_coeff.
                    let plus_middle = monomials[mid].coeff == square_coeff * Rational::int(2);
                    let minus_middle = monomials[mid].coeff == -(square_coeff * Rational::int(2));
                    if !plus_middle && !minus_middle {
                        continue;
                    }
                    let arg = match (cos_version, plus_middle) {
                        (true, true) => simplify(&(a.clone() - b.clone())),
                        (true, false) => simplify(&(a.clone() + b.clone())),
                        (false, true) => simplify(&(a.clone() + b.clone())),
                        (false, false) => simplify(&(a.clone() - b.clone())),
                    };
                    let combined_base = if cos_version {
                        Expr::cos(arg)
                    } else {
                        Expr::sin(arg)
                    };
                    let mut merged = rest_mid.clone().with_factor(combined_base, 2);
                    merged.coeff = square_coeff;
                    let mut remove = vec![mid, i, j];
                    remove.sort_unstable();
                    remove.reverse();
                    for index in remove {
                        monomials.remove(index);
                    }
                    monomials.push(merged);
                    return true;
                }
            }
        }
    }
    false
}

/// Finds a term (other than `skip`) equal to `coeff_hint`-scaled
/// `first²·second²` times a remainder, returning its index and remainder.
fn find_square(
    monomials: &[Monomial],
    skip: usize,
    first: &Expr,
    second: &Expr,
    coeff_hint: Rational,
) -> Option<(usize, Monomial)> {
    for (index, monomial) in monomials.iter().enumerate() {
        if index == skip || monomial.coeff.abs() != coeff_hint {
            continue;
        }
        let stripped = monomial.strip(first, 2).and_then(|m| m.strip(second, 2));
        if let Some(rest) = stripped {
            return Some((index, rest));
        }
    }
    None
}

fn replace_pair(monomials: &mut Vec<Monomial>, i: usize, j: usize, merged: Monomial) {
    let (hi, lo) = if i > j { (i, j) } else { (j, i) };
    monomials.remove(hi);
    monomials.remove(lo);
    monomials.push(merged);
}
