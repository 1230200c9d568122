//! tiny-solver integration.
//!
//! tiny-solver differentiates its factors itself, so residual rules are handed
//! over directly as [`Factor`]s instead of going through [`CostFunction`]
//! handles. [`TinyFactor`] forwards every scalar type tiny-solver asks for to
//! [`ResidualFunctor::residual`].
//!
//! [`CostFunction`]: crate::CostFunction

use crate::cost::ResidualFunctor;
use crate::error::CostError;
use anyhow::{anyhow, ensure, Result};
use nalgebra::{DVector, RealField};
use serde::{Deserialize, Serialize};
use sfm_core::math::lift;
use std::collections::HashMap;
use std::sync::Arc;
use tiny_solver::factors::Factor;
use tiny_solver::linear::sparse::LinearSolverType;
use tiny_solver::manifold::so3::QuaternionManifold;
use tiny_solver::optimizer::{Optimizer, OptimizerOptions};
use tiny_solver::problem::Problem;
use tiny_solver::LevenbergMarquardtOptimizer;

/// A residual rule registered as a tiny-solver factor.
///
/// The residual is multiplied by `scale`, which is `1 / stddev` when the
/// factor models isotropic measurement noise.
#[derive(Debug, Clone)]
pub struct TinyFactor<F> {
    functor: F,
    scale: f64,
}

impl<F: ResidualFunctor> TinyFactor<F> {
    pub fn new(functor: F) -> Self {
        Self {
            functor,
            scale: 1.0,
        }
    }

    pub fn with_isotropic_noise(functor: F, stddev: f64) -> Result<Self, CostError> {
        if !(stddev > 0.0 && stddev.is_finite()) {
            return Err(CostError::NonPositiveStddev(stddev));
        }
        Ok(Self {
            functor,
            scale: 1.0 / stddev,
        })
    }
}

impl<T: RealField, F: ResidualFunctor> Factor<T> for TinyFactor<F> {
    fn residual_func(&self, params: &[DVector<T>]) -> DVector<T> {
        let r = self.functor.residual(params);
        if self.scale == 1.0 {
            r
        } else {
            r * lift::<T>(self.scale)
        }
    }
}

fn check_variables<F: ResidualFunctor>(functor: &F, variables: &[&str]) -> Result<()> {
    let sizes = functor.parameter_block_sizes();
    ensure!(
        variables.len() == sizes.len(),
        "{:?} expects {} parameter blocks {:?}, got {} variables",
        functor,
        sizes.len(),
        sizes,
        variables.len()
    );
    Ok(())
}

/// Add `functor` as a residual block over the named variables.
///
/// `variables` must follow the functor's parameter-block order.
pub fn add_functor<F>(problem: &mut Problem, functor: F, variables: &[&str]) -> Result<()>
where
    F: ResidualFunctor + 'static,
{
    check_variables(&functor, variables)?;
    problem.add_residual_block(
        F::NUM_RESIDUALS,
        variables,
        Box::new(TinyFactor::new(functor)),
        None,
    );
    Ok(())
}

/// Add `functor` with residuals divided by `stddev`.
pub fn add_functor_with_isotropic_noise<F>(
    problem: &mut Problem,
    functor: F,
    stddev: f64,
    variables: &[&str],
) -> Result<()>
where
    F: ResidualFunctor + 'static,
{
    check_variables(&functor, variables)?;
    let factor = TinyFactor::with_isotropic_noise(functor, stddev)?;
    problem.add_residual_block(F::NUM_RESIDUALS, variables, Box::new(factor), None);
    Ok(())
}

/// Keep a `[qx, qy, qz, qw]` variable on the unit sphere during the solve.
pub fn set_quaternion_manifold(problem: &mut Problem, name: &str) {
    problem.set_variable_manifold(name, Arc::new(QuaternionManifold));
}

/// Linear solver used inside each LM iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearSolverKind {
    SparseCholesky,
    SparseQR,
}

/// User-facing solver options mapped onto tiny-solver's optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TinySolveOptions {
    pub max_iters: usize,
    pub verbosity: usize,
    pub linear_solver: Option<LinearSolverKind>,
    pub min_abs_decrease: Option<f64>,
    pub min_rel_decrease: Option<f64>,
    pub min_error: Option<f64>,
}

impl Default for TinySolveOptions {
    fn default() -> Self {
        let defaults = OptimizerOptions::default();
        Self {
            max_iters: defaults.max_iteration,
            verbosity: defaults.verbosity_level,
            linear_solver: None,
            min_abs_decrease: Some(defaults.min_abs_error_decrease_threshold),
            min_rel_decrease: Some(defaults.min_rel_error_decrease_threshold),
            min_error: Some(defaults.min_error_threshold),
        }
    }
}

impl TinySolveOptions {
    fn to_optimizer_options(&self) -> OptimizerOptions {
        let mut opts = OptimizerOptions {
            max_iteration: self.max_iters,
            verbosity_level: self.verbosity,
            ..OptimizerOptions::default()
        };
        if let Some(solver) = self.linear_solver {
            opts.linear_solver_type = match solver {
                LinearSolverKind::SparseCholesky => LinearSolverType::SparseCholesky,
                LinearSolverKind::SparseQR => LinearSolverType::SparseQR,
            };
        }
        if let Some(v) = self.min_abs_decrease {
            opts.min_abs_error_decrease_threshold = v;
        }
        if let Some(v) = self.min_rel_decrease {
            opts.min_rel_error_decrease_threshold = v;
        }
        if let Some(v) = self.min_error {
            opts.min_error_threshold = v;
        }
        opts
    }
}

/// Solve a tiny-solver problem with Levenberg-Marquardt.
pub fn solve(
    problem: &Problem,
    initial: &HashMap<String, DVector<f64>>,
    opts: &TinySolveOptions,
) -> Result<HashMap<String, DVector<f64>>> {
    log::debug!(
        "tiny-solver LM: {} variables, max_iters={}",
        initial.len(),
        opts.max_iters
    );
    let optimizer = LevenbergMarquardtOptimizer::default();
    optimizer
        .optimize(problem, initial, Some(opts.to_optimizer_options()))
        .ok_or_else(|| anyhow!("tiny-solver failed to converge"))
}
