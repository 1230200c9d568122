//! Solver-facing cost-function handle and the residual-rule trait behind it.

use nalgebra::{DMatrix, DVector, RealField};
use std::fmt;

/// Type-erased residual block consumed by a nonlinear least-squares solver.
///
/// A handle declares its residual dimension and the ordered sizes of its
/// parameter blocks, and evaluates residuals with optional per-block Jacobians.
/// Handles are immutable after construction and safe to evaluate from several
/// threads at once.
pub trait CostFunction: fmt::Debug + Send + Sync {
    /// Number of residual components `N`.
    fn num_residuals(&self) -> usize;

    /// Ordered parameter block sizes `(d1, ..., dk)`.
    fn parameter_block_sizes(&self) -> &[usize];

    /// Evaluate the residual block.
    ///
    /// - `parameters[i]` holds block `i` (at least `d_i` values).
    /// - `residuals` receives `N` values.
    /// - when `jacobians` is given, every `Some` slot `i` receives the
    ///   row-major `N × d_i` Jacobian of the residuals w.r.t. block `i`.
    ///
    /// Returns `false` when the buffers do not match the declared layout.
    /// Degenerate geometry is reported through non-finite residuals, not `false`.
    fn evaluate(
        &self,
        parameters: &[&[f64]],
        residuals: &mut [f64],
        jacobians: Option<&mut [Option<&mut [f64]>]>,
    ) -> bool;

    /// Evaluate residuals only.
    fn evaluate_residuals(&self, parameters: &[&[f64]]) -> Option<DVector<f64>> {
        let mut residuals = DVector::zeros(self.num_residuals());
        self.evaluate(parameters, residuals.as_mut_slice(), None)
            .then_some(residuals)
    }

    /// Evaluate residuals and the Jacobian of every parameter block.
    fn evaluate_with_jacobians(
        &self,
        parameters: &[&[f64]],
    ) -> Option<(DVector<f64>, Vec<DMatrix<f64>>)> {
        let n = self.num_residuals();
        let sizes = self.parameter_block_sizes();
        let mut residuals = DVector::zeros(n);
        let mut buffers: Vec<Vec<f64>> = sizes.iter().map(|d| vec![0.0; n * d]).collect();
        {
            let mut slots: Vec<Option<&mut [f64]>> =
                buffers.iter_mut().map(|b| Some(b.as_mut_slice())).collect();
            let ok = self.evaluate(
                parameters,
                residuals.as_mut_slice(),
                Some(slots.as_mut_slice()),
            );
            if !ok {
                return None;
            }
        }
        let jacobians = buffers
            .iter()
            .zip(sizes)
            .map(|(b, &d)| DMatrix::from_row_slice(n, d, b))
            .collect();
        Some((residuals, jacobians))
    }
}

/// A residual rule with fixed dimensions, written once for any scalar type.
///
/// Implementations own their constructor-captured constants and must compute
/// the residual from the parameter blocks using only [`RealField`] arithmetic,
/// so the same code evaluates on `f64` and on dual numbers. Branches that pick
/// different formulas depending on parameter values break derivatives and are
/// only allowed where both sides agree to first order.
pub trait ResidualFunctor: fmt::Debug + Send + Sync {
    /// Residual dimension `N`.
    const NUM_RESIDUALS: usize;

    /// Ordered parameter block sizes.
    fn parameter_block_sizes(&self) -> Vec<usize>;

    /// Residual vector of length [`Self::NUM_RESIDUALS`].
    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T>;
}
