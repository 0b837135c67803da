//! Symbolic expression trees and calculus for equation-of-motion derivation.
//!
//! This crate supplies the computer-algebra capability the derivation
//! pipeline consumes: immutable expression trees over rational constants,
//! parameters, time functions and their derivatives ([`Expr`]), total and
//! partial differentiation ([`diff_time`], [`diff`]), staged algebraic
//! normalization ([`simplify`]), trigonometric identity reduction
//! ([`trig_simplify`]), closed-form linear solving ([`solve_linear`]), and
//! numeric spot-check evaluation ([`eval`]).
//!
//! It is deliberately not a general-purpose CAS. The operator set and the
//! solver are scoped to what Lagrangian mechanics of a fixed planar linkage
//! needs, and everything is deterministic: the same input tree always
//! normalizes to the same canonical output.

mod diff;
mod display;
mod eval;
mod expr;
mod normalize;
mod rational;
mod solve;
mod trig;

pub use diff::{diff, diff_time};
pub use eval::{eval, Atom, EvalError};
pub use expr::Expr;
pub use normalize::simplify;
pub use rational::Rational;
pub use solve::{solve_linear, SolveError};
pub use trig::trig_simplify;
