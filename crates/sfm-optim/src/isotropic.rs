//! Isotropic measurement noise as a cost-function decorator.
//!
//! Wrapping a cost function divides every residual component by the standard
//! deviation of the measurement noise. The wrapper conditions each component
//! through its own [`LinearConditioner`] and applies the conditioner's
//! derivative to the corresponding Jacobian row (chain rule), so the wrapped
//! handle exposes the same parameter layout as the inner one.

use crate::cost::{CostFunction, ResidualFunctor};
use crate::error::CostError;
use crate::jacobian_ad::AutoDiffCostFunction;

/// Scalar map `r = scale * x` with one residual and one 1-sized block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearConditioner {
    pub scale: f64,
}

const SCALAR_BLOCK: [usize; 1] = [1];

impl LinearConditioner {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Value and derivative at `x`.
    fn apply(&self, x: f64) -> Option<(f64, f64)> {
        let mut value = [0.0];
        let mut derivative = [0.0];
        let mut slots = [Some(&mut derivative[..])];
        self.evaluate(&[&[x][..]], &mut value, Some(&mut slots[..]))
            .then_some((value[0], derivative[0]))
    }
}

impl CostFunction for LinearConditioner {
    fn num_residuals(&self) -> usize {
        1
    }

    fn parameter_block_sizes(&self) -> &[usize] {
        &SCALAR_BLOCK
    }

    fn evaluate(
        &self,
        parameters: &[&[f64]],
        residuals: &mut [f64],
        jacobians: Option<&mut [Option<&mut [f64]>]>,
    ) -> bool {
        let (Some(x), Some(r)) = (
            parameters.first().and_then(|p| p.first()),
            residuals.first_mut(),
        ) else {
            return false;
        };
        *r = self.scale * x;
        if let Some(Some(jac)) = jacobians.and_then(|slots| slots.first_mut()) {
            match jac.first_mut() {
                Some(d) => *d = self.scale,
                None => return false,
            }
        }
        true
    }
}

/// Cost function whose residuals are divided by an isotropic noise stddev.
#[derive(Debug)]
pub struct IsotropicNoiseCost {
    inner: Box<dyn CostFunction>,
    conditioners: Vec<LinearConditioner>,
    stddev: f64,
}

impl IsotropicNoiseCost {
    /// Wrap `inner`; `stddev` must be strictly positive and finite.
    pub fn new(inner: Box<dyn CostFunction>, stddev: f64) -> Result<Self, CostError> {
        if !(stddev > 0.0 && stddev.is_finite()) {
            return Err(CostError::NonPositiveStddev(stddev));
        }
        let scale = 1.0 / stddev;
        let conditioners = vec![LinearConditioner::new(scale); inner.num_residuals()];
        log::debug!(
            "isotropic noise wrapper: stddev={stddev}, residuals={}",
            conditioners.len()
        );
        Ok(Self {
            inner,
            conditioners,
            stddev,
        })
    }

    /// Build the auto-differentiated handle of `functor` and wrap it.
    pub fn create<F>(stddev: f64, functor: F) -> Result<Box<dyn CostFunction>, CostError>
    where
        F: ResidualFunctor + 'static,
    {
        let inner = AutoDiffCostFunction::boxed(functor);
        Ok(Box::new(Self::new(inner, stddev)?))
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    pub fn inner(&self) -> &dyn CostFunction {
        self.inner.as_ref()
    }
}

impl CostFunction for IsotropicNoiseCost {
    fn num_residuals(&self) -> usize {
        self.inner.num_residuals()
    }

    fn parameter_block_sizes(&self) -> &[usize] {
        self.inner.parameter_block_sizes()
    }

    fn evaluate(
        &self,
        parameters: &[&[f64]],
        residuals: &mut [f64],
        mut jacobians: Option<&mut [Option<&mut [f64]>]>,
    ) -> bool {
        if !self
            .inner
            .evaluate(parameters, residuals, jacobians.as_deref_mut())
        {
            return false;
        }

        let sizes = self.inner.parameter_block_sizes();
        for (row, conditioner) in self.conditioners.iter().enumerate() {
            let Some((value, derivative)) = conditioner.apply(residuals[row]) else {
                return false;
            };
            residuals[row] = value;

            let Some(slots) = jacobians.as_deref_mut() else {
                continue;
            };
            for (slot, &d) in slots.iter_mut().zip(sizes) {
                if let Some(jac) = slot {
                    for v in &mut jac[row * d..(row + 1) * d] {
                        *v *= derivative;
                    }
                }
            }
        }
        true
    }
}
