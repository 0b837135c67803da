//! Coordinate and parameter declarations for the two-mass linkage.
//!
//! [`build_model`] is a factory: every call returns a fresh, independent set
//! of symbols. Nothing is declared at module scope, so parallel derivation
//! runs can never alias each other's expression namespace.

use eom_symbolic::Expr;

use crate::engine::CasEngine;

/// A named, time-dependent scalar unknown (here, a rod angle).
///
/// The first and second time derivatives are computed once at declaration
/// and cached; every downstream stage reuses them.
#[derive(Debug, Clone)]
pub struct GeneralizedCoordinate {
    name: String,
    velocity_alias: String,
    symbol: Expr,
    velocity: Expr,
    acceleration: Expr,
}

impl GeneralizedCoordinate {
    /// Declares a coordinate and derives its velocity and acceleration.
    ///
    /// `velocity_alias` is the canonical domain name the scrubber
    /// substitutes for the coordinate's first-derivative token.
    pub fn declare(
        engine: &impl CasEngine,
        name: impl Into<String>,
        velocity_alias: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let symbol = Expr::time_fn(name.clone());
        let velocity = engine.diff_time(&symbol);
        let acceleration = engine.diff_time(&velocity);
        Self {
            name,
            velocity_alias: velocity_alias.into(),
            symbol,
            velocity,
            acceleration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn velocity_alias(&self) -> &str {
        &self.velocity_alias
    }

    pub fn symbol(&self) -> &Expr {
        &self.symbol
    }

    pub fn velocity(&self) -> &Expr {
        &self.velocity
    }

    pub fn acceleration(&self) -> &Expr {
        &self.acceleration
    }
}

/// A named real-valued constant of the physical system.
///
/// The positivity flag is declarative metadata for numeric consumers; the
/// symbolic derivation itself never branches on it.
#[derive(Debug, Clone)]
pub struct SystemParameter {
    name: String,
    symbol: Expr,
    positive: bool,
}

impl SystemParameter {
    /// A parameter constrained positive (a length or a mass).
    pub fn positive(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// A parameter with no sign constraint (gravity).
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    fn new(name: impl Into<String>, positive: bool) -> Self {
        let name = name.into();
        let symbol = Expr::sym(name.clone());
        Self {
            name,
            symbol,
            positive,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &Expr {
        &self.symbol
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }
}

/// The declared coordinates and parameters of one derivation run.
#[derive(Debug, Clone)]
pub struct CoordinateModel {
    coordinates: [GeneralizedCoordinate; 2],
    rod_lengths: [SystemParameter; 2],
    masses: [SystemParameter; 2],
    gravity: SystemParameter,
}

impl CoordinateModel {
    pub fn coordinates(&self) -> &[GeneralizedCoordinate; 2] {
        &self.coordinates
    }

    pub fn rod_lengths(&self) -> &[SystemParameter; 2] {
        &self.rod_lengths
    }

    pub fn masses(&self) -> &[SystemParameter; 2] {
        &self.masses
    }

    pub fn gravity(&self) -> &SystemParameter {
        &self.gravity
    }
}

/// Builds a fresh model for the planar two-mass serial linkage.
pub fn build_model(engine: &impl CasEngine) -> CoordinateModel {
    CoordinateModel {
        coordinates: [
            GeneralizedCoordinate::declare(engine, "mass_1.angle", "mass_1.angular_velocity"),
            GeneralizedCoordinate::declare(engine, "mass_2.angle", "mass_2.angular_velocity"),
        ],
        rod_lengths: [
            SystemParameter::positive("mass_1.rod_length"),
            SystemParameter::positive("mass_2.rod_length"),
        ],
        masses: [
            SystemParameter::positive("mass_1.mass"),
            SystemParameter::positive("mass_2.mass"),
        ],
        gravity: SystemParameter::unconstrained("gravity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NativeEngine;

    #[test]
    fn coordinates_cache_their_derivatives() {
        let engine = NativeEngine;
        let coord = GeneralizedCoordinate::declare(&engine, "mass_1.angle", "mass_1.angular_velocity");
        assert_eq!(coord.symbol(), &Expr::time_fn("mass_1.angle"));
        assert_eq!(coord.velocity(), &Expr::deriv("mass_1.angle", 1));
        assert_eq!(coord.acceleration(), &Expr::deriv("mass_1.angle", 2));
    }

    #[test]
    fn model_declares_the_contracted_names() {
        let model = build_model(&NativeEngine);
        let names: Vec<&str> = model.coordinates().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["mass_1.angle", "mass_2.angle"]);
        assert_eq!(model.rod_lengths()[0].name(), "mass_1.rod_length");
        assert_eq!(model.masses()[1].name(), "mass_2.mass");
        assert_eq!(model.gravity().name(), "gravity");
    }

    #[test]
    fn sign_constraints_follow_the_physics() {
        let model = build_model(&NativeEngine);
        assert!(model.rod_lengths().iter().all(SystemParameter::is_positive));
        assert!(model.masses().iter().all(SystemParameter::is_positive));
        assert!(!model.gravity().is_positive());
    }

    #[test]
    fn each_build_is_independent() {
        let engine = NativeEngine;
        let a = build_model(&engine);
        let b = build_model(&engine);
        assert_eq!(
            a.coordinates()[0].symbol(),
            b.coordinates()[0].symbol()
        );
    }
}
