//! Symbolic derivation of equations of motion for a planar two-mass
//! articulated linkage (a double pendulum), via Lagrangian mechanics.
//!
//! The pipeline is strictly linear: declare coordinates and parameters,
//! map the serial-chain kinematics, formulate `L = T − V`, apply the
//! Euler–Lagrange operator per coordinate, solve the coupled system for
//! the angular accelerations, reduce the closed forms, and scrub their
//! renderings into portable text for an external numeric simulator.
//!
//! The computer algebra itself lives behind the [`CasEngine`] trait;
//! [`NativeEngine`] backs it with `eom-symbolic`, and tests can inject a
//! fake. Run the whole thing with [`derive`]:
//!
//! ```
//! use eom_core::{derive, NativeEngine};
//!
//! let derivation = derive(&NativeEngine).expect("the fixed model is solvable");
//! for acceleration in &derivation.accelerations {
//!     assert!(acceleration.scrubbed.well_formed);
//! }
//! ```

pub mod energy;
mod engine;
pub mod euler_lagrange;
pub mod kinematics;
pub mod model;
mod pipeline;
pub mod scrub;
pub mod simplify;
pub mod system;

pub use engine::{CasEngine, NativeEngine};
pub use pipeline::{derive, derive_for_model, Derivation, SolvedAcceleration};
pub use system::DeriveError;
