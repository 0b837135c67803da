//! The one-shot derivation pipeline.
//!
//! Strictly linear, no feedback: declare the model, map the kinematics,
//! formulate the energies, apply the Euler–Lagrange operator, solve for
//! the accelerations, reduce, scrub. Each stage consumes the immutable
//! output of the previous one, and two runs with the same declarations
//! produce byte-identical results.

use eom_symbolic::Expr;

use crate::energy;
use crate::engine::CasEngine;
use crate::euler_lagrange;
use crate::kinematics;
use crate::model::{build_model, CoordinateModel};
use crate::scrub::{EquationScrubber, ScrubbedEquation};
use crate::simplify;
use crate::system::{solve_system, DeriveError, EquationSystem};

/// The closed-form angular acceleration of one coordinate, with its
/// scrubbed export form.
#[derive(Debug, Clone)]
pub struct SolvedAcceleration {
    /// Name of the coordinate this acceleration belongs to.
    pub coordinate: String,
    /// The solved-and-reduced expression.
    pub expression: Expr,
    /// The exported text and its advisory well-formedness flag.
    pub scrubbed: ScrubbedEquation,
}

/// The result of a full derivation run.
#[derive(Debug, Clone)]
pub struct Derivation {
    /// The simplified Euler–Lagrange equations, one per coordinate.
    pub equations: Vec<Expr>,
    /// One solved acceleration per coordinate, in declaration order.
    pub accelerations: Vec<SolvedAcceleration>,
}

/// Runs the full pipeline on a freshly built two-mass model.
///
/// # Errors
///
/// Propagates [`DeriveError`] from the solve stage; every other stage is
/// total.
pub fn derive(engine: &impl CasEngine) -> Result<Derivation, DeriveError> {
    let model = build_model(engine);
    derive_for_model(engine, &model)
}

/// Runs the pipeline on an existing model.
pub fn derive_for_model(
    engine: &impl CasEngine,
    model: &CoordinateModel,
) -> Result<Derivation, DeriveError> {
    let masses = kinematics::map_masses(engine, model);
    let energies = energy::formulate(model, &masses);
    let equations = euler_lagrange::derive_equations(engine, model, &energies.lagrangian);

    let unknowns: Vec<Expr> = model
        .coordinates()
        .iter()
        .map(|coordinate| coordinate.acceleration().clone())
        .collect();
    let system = EquationSystem::new(equations.clone(), unknowns);
    let solutions = solve_system(engine, &system)?;

    let scrubber = EquationScrubber::for_coordinates(model.coordinates());
    let accelerations = model
        .coordinates()
        .iter()
        .zip(solutions)
        .map(|(coordinate, solution)| {
            let expression = simplify::reduce(engine, &solution);
            let scrubbed = scrubber.scrub(&expression.to_string());
            SolvedAcceleration {
                coordinate: coordinate.name().to_string(),
                expression,
                scrubbed,
            }
        })
        .collect();

    Ok(Derivation {
        equations,
        accelerations,
    })
}
