//! Energy expressions and the Lagrangian.
//!
//! Pure expression composition: `T = ½·m·(ẋ² + ẏ²)` summed over the
//! masses, `V = m·g·y` summed over the masses, `L = T − V`. The operand
//! association is the whole contract here; swapping T and V silently
//! flips the sign of every derived equation, so the tests pin it down.

use eom_symbolic::Expr;

use crate::kinematics::MassKinematics;
use crate::model::CoordinateModel;

/// The kinetic and potential energies of the system and their difference.
#[derive(Debug, Clone)]
pub struct Energies {
    pub kinetic: Expr,
    pub potential: Expr,
    pub lagrangian: Expr,
}

/// Builds total kinetic energy, total potential energy, and the
/// Lagrangian `L = T − V` from the kinematic outputs.
pub fn formulate(model: &CoordinateModel, masses: &[MassKinematics; 2]) -> Energies {
    let half = Expr::rational(1, 2);
    let gravity = model.gravity().symbol().clone();

    let kinetic = Expr::sum(
        model
            .masses()
            .iter()
            .zip(masses.iter())
            .map(|(m, kin)| {
                half.clone()
                    * m.symbol().clone()
                    * (kin.vx.clone().powi(2) + kin.vy.clone().powi(2))
            })
            .collect(),
    );

    let potential = Expr::sum(
        model
            .masses()
            .iter()
            .zip(masses.iter())
            .map(|(m, kin)| m.symbol().clone() * gravity.clone() * kin.y.clone())
            .collect(),
    );

    let lagrangian = kinetic.clone() - potential.clone();

    Energies {
        kinetic,
        potential,
        lagrangian,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CasEngine, NativeEngine};
    use crate::kinematics::map_masses;
    use crate::model::build_model;
    use approx::assert_relative_eq;
    use eom_symbolic::{eval, Atom};

    fn bindings(l_scale: f64) -> impl Fn(Atom<'_>) -> Option<f64> {
        move |atom| match atom {
            Atom::Sym("mass_1.rod_length") => Some(1.1 * l_scale),
            Atom::Sym("mass_2.rod_length") => Some(0.8 * l_scale),
            Atom::Sym("mass_1.mass") => Some(2.0),
            Atom::Sym("mass_2.mass") => Some(0.5),
            Atom::Sym("gravity") => Some(9.81),
            Atom::TimeFn("mass_1.angle") => Some(0.6),
            Atom::TimeFn("mass_2.angle") => Some(-1.2),
            Atom::Deriv("mass_1.angle", 1) => Some(1.7),
            Atom::Deriv("mass_2.angle", 1) => Some(-0.4),
            _ => None,
        }
    }

    fn formulated() -> Energies {
        let engine = NativeEngine;
        let model = build_model(&engine);
        let masses = map_masses(&engine, &model);
        formulate(&model, &masses)
    }

    #[test]
    fn kinetic_energy_is_non_negative() {
        let energies = formulated();
        for scale in [0.3, 1.0, 2.5] {
            let t = eval(&energies.kinetic, &bindings(scale)).expect("bound");
            assert!(t >= 0.0, "kinetic energy must be non-negative, got {t}");
        }
    }

    #[test]
    fn potential_energy_is_linear_in_height() {
        // Scaling both rod lengths scales every height linearly, so V must
        // scale by the same factor.
        let energies = formulated();
        let v1 = eval(&energies.potential, &bindings(1.0)).expect("bound");
        let v2 = eval(&energies.potential, &bindings(2.0)).expect("bound");
        assert_relative_eq!(v2, 2.0 * v1, max_relative = 1e-12);
    }

    #[test]
    fn lagrangian_is_kinetic_minus_potential() {
        let engine = NativeEngine;
        let energies = formulated();
        let residue = energies.lagrangian.clone() - energies.kinetic.clone()
            + energies.potential.clone();
        assert!(engine.simplify(&residue).is_zero());

        // The swapped association V − T is not the Lagrangian.
        let swapped = energies.potential.clone() - energies.kinetic.clone();
        let t = eval(&energies.kinetic, &bindings(1.0)).expect("bound");
        let l = eval(&energies.lagrangian, &bindings(1.0)).expect("bound");
        let s = eval(&swapped, &bindings(1.0)).expect("bound");
        let v = eval(&energies.potential, &bindings(1.0)).expect("bound");
        assert_relative_eq!(l, t - v, max_relative = 1e-12);
        assert_relative_eq!(s, v - t, max_relative = 1e-12);
    }
}
