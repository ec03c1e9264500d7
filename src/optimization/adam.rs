use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{OptimErr, Result};

use super::{Objective, Optimizer};

/// Adam: per-coordinate steps from bias-corrected running estimates of the
/// gradient's first and second moments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Adam {
    /// Step size multiplier.
    pub learning_rate: f32,
    /// Exponential decay rate of the first-moment estimate.
    pub beta1: f32,
    /// Exponential decay rate of the second-moment estimate.
    pub beta2: f32,
    /// Keeps the denominator away from zero.
    pub epsilon: f32,
    /// If positive, `weight_decay * x` is added to the gradient before
    /// the update.
    pub weight_decay: f32,
}

impl Adam {
    /// A configuration with the given learning rate and every other
    /// option at its default.
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        let in_range = |b: f32| (0. ..1.).contains(&b);
        if !in_range(self.beta1) || !in_range(self.beta2) {
            return Err(OptimErr::InvalidConfig("adam betas must lie in [0, 1)"));
        }

        Ok(())
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay: 0.,
        }
    }
}

/// Accumulators for [`Adam`]. `Default` starts a fresh optimization.
#[derive(Debug, Clone, Default)]
pub struct AdamState {
    exp_avg: Option<Box<[f32]>>,
    exp_avg_sq: Option<Box<[f32]>>,
    iteration: usize,
}

impl AdamState {
    /// Number of completed steps.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The first-moment estimate, allocated on the first step.
    pub fn exp_avg(&self) -> Option<&[f32]> {
        self.exp_avg.as_deref()
    }

    /// The second-moment estimate, allocated on the first step.
    pub fn exp_avg_sq(&self) -> Option<&[f32]> {
        self.exp_avg_sq.as_deref()
    }
}

impl Optimizer for Adam {
    type State = AdamState;

    fn step(
        &self,
        objective: &mut dyn Objective,
        x: &mut [f32],
        state: &mut AdamState,
    ) -> Result<Vec<f32>> {
        self.validate()?;

        let (loss, mut grad) = objective.evaluate(x);
        if grad.len() != x.len() {
            return Err(OptimErr::DimensionMismatch {
                what: "gradient",
                got: grad.len(),
                expected: x.len(),
            });
        }

        for (what, accum) in [
            ("first-moment estimate", &state.exp_avg),
            ("second-moment estimate", &state.exp_avg_sq),
        ] {
            if let Some(accum) = accum {
                if accum.len() != x.len() {
                    return Err(OptimErr::DimensionMismatch {
                        what,
                        got: accum.len(),
                        expected: x.len(),
                    });
                }
            }
        }

        if self.weight_decay > 0. {
            let wd = self.weight_decay;
            grad.iter_mut().zip(x.iter()).for_each(|(g, w)| *g += wd * w);
        }

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        let t = state.iteration as i32 + 1;
        let bc1 = 1. - b1.powi(t);
        let bc2 = 1. - b2.powi(t);
        let step_size = lr * (bc2.sqrt() / bc1);

        let exp_avg = state.exp_avg.get_or_insert_with(|| {
            debug!(params = x.len(); "allocating moment estimates");
            vec![0.; x.len()].into_boxed_slice()
        });
        let exp_avg_sq = state
            .exp_avg_sq
            .get_or_insert_with(|| vec![0.; x.len()].into_boxed_slice());

        x.iter_mut()
            .zip(&grad)
            .zip(exp_avg.iter_mut())
            .zip(exp_avg_sq.iter_mut())
            .for_each(|(((w, g), m), s)| {
                *m = b1 * *m + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);
                *w -= step_size * *m / (s.sqrt() + eps);
            });

        state.iteration += 1;
        Ok(vec![loss])
    }
}
