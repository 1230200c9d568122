//! Forward-mode automatic differentiation adapter using `num-dual`.
//!
//! All parameter blocks of a residual rule are stacked into one local vector,
//! the rule is evaluated once on dual numbers carrying a tangent per stacked
//! parameter, and the resulting `N × Σd` Jacobian is scattered back into the
//! per-block row-major buffers the solver asked for.
//!
//! Value-only evaluation skips the dual numbers and runs the rule on `f64`.

use crate::cost::{CostFunction, ResidualFunctor};
use nalgebra::{DMatrix, DVector, RealField};
use num_dual::{jacobian, DualDVec64};
use std::fmt;

/// Cost-function handle that differentiates a [`ResidualFunctor`] automatically.
pub struct AutoDiffCostFunction<F> {
    functor: F,
    block_sizes: Vec<usize>,
}

impl<F: ResidualFunctor> AutoDiffCostFunction<F> {
    pub fn new(functor: F) -> Self {
        let block_sizes = functor.parameter_block_sizes();
        Self {
            functor,
            block_sizes,
        }
    }

    /// Construct a boxed, type-erased handle.
    pub fn boxed(functor: F) -> Box<dyn CostFunction>
    where
        F: 'static,
    {
        Box::new(Self::new(functor))
    }

    pub fn functor(&self) -> &F {
        &self.functor
    }

    fn layout_matches(&self, parameters: &[&[f64]], residuals: &[f64]) -> bool {
        parameters.len() == self.block_sizes.len()
            && residuals.len() >= F::NUM_RESIDUALS
            && parameters
                .iter()
                .zip(&self.block_sizes)
                .all(|(p, &d)| p.len() >= d)
    }
}

impl<F: ResidualFunctor> fmt::Debug for AutoDiffCostFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoDiffCostFunction")
            .field("functor", &self.functor)
            .field("num_residuals", &F::NUM_RESIDUALS)
            .field("block_sizes", &self.block_sizes)
            .finish()
    }
}

fn split_blocks<T: RealField>(x: &DVector<T>, block_sizes: &[usize]) -> Vec<DVector<T>> {
    let mut offset = 0;
    block_sizes
        .iter()
        .map(|&d| {
            let block = x.rows(offset, d).into_owned();
            offset += d;
            block
        })
        .collect()
}

fn stack_blocks(parameters: &[&[f64]], block_sizes: &[usize]) -> DVector<f64> {
    let total: usize = block_sizes.iter().sum();
    let mut x = DVector::zeros(total);
    let mut offset = 0;
    for (p, &d) in parameters.iter().zip(block_sizes) {
        x.rows_mut(offset, d).copy_from_slice(&p[..d]);
        offset += d;
    }
    x
}

/// Every requested slot must hold at least `N × d_i` values.
fn slots_fit(jacobians: &[Option<&mut [f64]>], block_sizes: &[usize], n: usize) -> bool {
    jacobians.len() == block_sizes.len()
        && jacobians
            .iter()
            .zip(block_sizes)
            .all(|(slot, &d)| slot.as_ref().map_or(true, |out| out.len() >= n * d))
}

fn scatter_jacobians(
    jacobian: &DMatrix<f64>,
    block_sizes: &[usize],
    jacobians: &mut [Option<&mut [f64]>],
) {
    let n = jacobian.nrows();
    let mut offset = 0;
    for (slot, &d) in jacobians.iter_mut().zip(block_sizes) {
        if let Some(out) = slot {
            for r in 0..n {
                for c in 0..d {
                    out[r * d + c] = jacobian[(r, offset + c)];
                }
            }
        }
        offset += d;
    }
}

impl<F: ResidualFunctor> CostFunction for AutoDiffCostFunction<F> {
    fn num_residuals(&self) -> usize {
        F::NUM_RESIDUALS
    }

    fn parameter_block_sizes(&self) -> &[usize] {
        &self.block_sizes
    }

    fn evaluate(
        &self,
        parameters: &[&[f64]],
        residuals: &mut [f64],
        jacobians: Option<&mut [Option<&mut [f64]>]>,
    ) -> bool {
        if !self.layout_matches(parameters, residuals) {
            return false;
        }

        let jacobians = match jacobians {
            Some(slots) if slots.iter().any(Option::is_some) => {
                if !slots_fit(slots, &self.block_sizes, F::NUM_RESIDUALS) {
                    return false;
                }
                slots
            }
            _ => {
                let x = stack_blocks(parameters, &self.block_sizes);
                let blocks = split_blocks(&x, &self.block_sizes);
                let r = self.functor.residual(&blocks);
                debug_assert_eq!(r.len(), F::NUM_RESIDUALS, "{:?}", self.functor);
                residuals[..F::NUM_RESIDUALS].copy_from_slice(r.as_slice());
                return true;
            }
        };

        let x = stack_blocks(parameters, &self.block_sizes);
        let (r, j) = jacobian(
            |p: DVector<DualDVec64>| {
                let blocks = split_blocks(&p, &self.block_sizes);
                self.functor.residual(&blocks)
            },
            x,
        );
        debug_assert_eq!(r.len(), F::NUM_RESIDUALS, "{:?}", self.functor);
        residuals[..F::NUM_RESIDUALS].copy_from_slice(r.as_slice());
        scatter_jacobians(&j, &self.block_sizes, jacobians);
        true
    }
}
