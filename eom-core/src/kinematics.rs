//! Cartesian kinematics of the serial two-mass chain.
//!
//! Each mass hangs at the end of a rod: the first from the origin, the
//! second from the first. Positions are pure expressions over the
//! coordinates and rod lengths; velocities come from one time
//! differentiation. No solving is involved and nothing here can fail.

use eom_symbolic::Expr;

use crate::engine::CasEngine;
use crate::model::CoordinateModel;

/// Position and velocity expressions for one mass.
#[derive(Debug, Clone)]
pub struct MassKinematics {
    pub x: Expr,
    pub y: Expr,
    pub vx: Expr,
    pub vy: Expr,
}

impl MassKinematics {
    fn from_position(engine: &impl CasEngine, x: Expr, y: Expr) -> Self {
        let vx = engine.diff_time(&x);
        let vy = engine.diff_time(&y);
        Self { x, y, vx, vy }
    }

    /// Cartesian acceleration, by a further time differentiation.
    pub fn acceleration(&self, engine: &impl CasEngine) -> (Expr, Expr) {
        (engine.diff_time(&self.vx), engine.diff_time(&self.vy))
    }
}

/// Maps the generalized coordinates to the Cartesian kinematics of both
/// masses: `(l₁·cos θ₁, l₁·sin θ₁)` for the first, chained by
/// `(l₂·cos θ₂, l₂·sin θ₂)` for the second.
pub fn map_masses(engine: &impl CasEngine, model: &CoordinateModel) -> [MassKinematics; 2] {
    let [theta1, theta2] = model.coordinates();
    let [l1, l2] = model.rod_lengths();

    let x1 = l1.symbol().clone() * Expr::cos(theta1.symbol().clone());
    let y1 = l1.symbol().clone() * Expr::sin(theta1.symbol().clone());
    let x2 = x1.clone() + l2.symbol().clone() * Expr::cos(theta2.symbol().clone());
    let y2 = y1.clone() + l2.symbol().clone() * Expr::sin(theta2.symbol().clone());

    [
        MassKinematics::from_position(engine, x1, y1),
        MassKinematics::from_position(engine, x2, y2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NativeEngine;
    use crate::model::build_model;

    #[test]
    fn velocity_is_the_time_derivative_of_position() {
        let engine = NativeEngine;
        let model = build_model(&engine);
        for mass in map_masses(&engine, &model) {
            assert_eq!(
                engine.simplify(&mass.vx),
                engine.simplify(&engine.diff_time(&mass.x))
            );
            assert_eq!(
                engine.simplify(&mass.vy),
                engine.simplify(&engine.diff_time(&mass.y))
            );
        }
    }

    #[test]
    fn second_mass_chains_from_the_first() {
        let engine = NativeEngine;
        let model = build_model(&engine);
        let [first, second] = map_masses(&engine, &model);

        let [_, theta2] = model.coordinates();
        let [_, l2] = model.rod_lengths();
        let offset_x = l2.symbol().clone() * Expr::cos(theta2.symbol().clone());
        let offset_y = l2.symbol().clone() * Expr::sin(theta2.symbol().clone());

        assert_eq!(
            engine.simplify(&(second.x.clone() - first.x.clone())),
            engine.simplify(&offset_x)
        );
        assert_eq!(
            engine.simplify(&(second.y.clone() - first.y.clone())),
            engine.simplify(&offset_y)
        );
    }

    #[test]
    fn acceleration_matches_twice_differentiated_position() {
        let engine = NativeEngine;
        let model = build_model(&engine);
        let [first, _] = map_masses(&engine, &model);
        let (ax, ay) = first.acceleration(&engine);
        assert_eq!(
            engine.simplify(&ax),
            engine.simplify(&engine.diff_time(&engine.diff_time(&first.x)))
        );
        assert_eq!(
            engine.simplify(&ay),
            engine.simplify(&engine.diff_time(&engine.diff_time(&first.y)))
        );
    }
}
