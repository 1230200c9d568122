//! Adapters for running residual rules in an external least-squares solver.

pub mod tiny;

pub use tiny::{
    add_functor, add_functor_with_isotropic_noise, set_quaternion_manifold, solve,
    LinearSolverKind, TinyFactor, TinySolveOptions,
};
