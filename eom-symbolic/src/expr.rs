//! The symbolic expression tree.
//!
//! An [`Expr`] is an immutable tree over rational constants, named symbols,
//! time-dependent functions and their time derivatives, n-ary sums and
//! products, integer powers, and the two trigonometric operators this domain
//! needs. Every transformation in this crate produces a new tree; nothing is
//! mutated in place.
//!
//! Constants are exact rationals, so `Expr` is `Eq + Ord + Hash` and every
//! normalization step is fully deterministic.

use std::ops::{Add, Mul, Neg, Sub};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::rational::Rational;

/// A symbolic expression.
///
/// The derived `Ord` is structural. It carries no algebraic meaning, but it
/// is total and stable, which is what canonical term ordering needs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum Expr {
    /// An exact rational constant.
    Num(Rational),
    /// A named real-valued constant (a system parameter).
    Sym(String),
    /// A named function of time, rendered as `name(t)`.
    TimeFn(String),
    /// The `order`-th time derivative of a [`Expr::TimeFn`].
    Deriv(String, u32),
    /// An n-ary sum.
    Add(Vec<Expr>),
    /// An n-ary product.
    Mul(Vec<Expr>),
    /// An integer power of a base expression.
    Pow(Box<Expr>, i32),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Num(Rational::int(n))
    }

    pub fn rational(num: i64, den: i64) -> Self {
        Expr::Num(Rational::new(num, den))
    }

    pub fn sym(name: impl Into<String>) -> Self {
        Expr::Sym(name.into())
    }

    pub fn time_fn(name: impl Into<String>) -> Self {
        Expr::TimeFn(name.into())
    }

    pub fn deriv(name: impl Into<String>, order: u32) -> Self {
        Expr::Deriv(name.into(), order)
    }

    pub fn sum(terms: Vec<Expr>) -> Self {
        Expr::Add(terms)
    }

    pub fn product(factors: Vec<Expr>) -> Self {
        Expr::Mul(factors)
    }

    pub fn powi(self, exp: i32) -> Self {
        Expr::Pow(Box::new(self), exp)
    }

    pub fn sin(arg: Expr) -> Self {
        Expr::Sin(Box::new(arg))
    }

    pub fn cos(arg: Expr) -> Self {
        Expr::Cos(Box::new(arg))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Num(r) if r.is_one())
    }

    /// Total node count, used to bound normalization work in tests.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Expr::Num(_) | Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) => 0,
            Expr::Add(children) | Expr::Mul(children) => {
                children.iter().map(Expr::node_count).sum()
            }
            Expr::Pow(base, _) => base.node_count(),
            Expr::Sin(arg) | Expr::Cos(arg) => arg.node_count(),
        }
    }

    /// Whether `target` occurs anywhere in this tree (structural match).
    pub fn contains(&self, target: &Expr) -> bool {
        if self == target {
            return true;
        }
        match self {
            Expr::Num(_) | Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) => false,
            Expr::Add(children) | Expr::Mul(children) => {
                children.iter().any(|c| c.contains(target))
            }
            Expr::Pow(base, _) => base.contains(target),
            Expr::Sin(arg) | Expr::Cos(arg) => arg.contains(target),
        }
    }

    /// Returns a new tree with every structural occurrence of `target`
    /// replaced by `replacement`.
    pub fn substitute(&self, target: &Expr, replacement: &Expr) -> Expr {
        if self == target {
            return replacement.clone();
        }
        match self {
            Expr::Num(_) | Expr::Sym(_) | Expr::TimeFn(_) | Expr::Deriv(_, _) => self.clone(),
            Expr::Add(children) => Expr::Add(
                children
                    .iter()
                    .map(|c| c.substitute(target, replacement))
                    .collect(),
            ),
            Expr::Mul(children) => Expr::Mul(
                children
                    .iter()
                    .map(|c| c.substitute(target, replacement))
                    .collect(),
            ),
            Expr::Pow(base, exp) => Expr::Pow(Box::new(base.substitute(target, replacement)), *exp),
            Expr::Sin(arg) => Expr::Sin(Box::new(arg.substitute(target, replacement))),
            Expr::Cos(arg) => Expr::Cos(Box::new(arg.substitute(target, replacement))),
        }
    }
}

impl Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Expr::Add(vec![self, rhs])
    }
}

impl Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Expr::Add(vec![self, -rhs])
    }
}

impl Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Expr::Mul(vec![self, rhs])
    }
}

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Expr::Mul(vec![Expr::int(-1), self])
    }
}
