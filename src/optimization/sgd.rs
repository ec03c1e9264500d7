use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{OptimErr, Result};

use super::{Objective, Optimizer};

/// Stochastic gradient descent, with optional momentum, dampening,
/// Nesterov look-ahead, weight decay and iteration-based learning rate
/// decay.
///
/// With everything at its default this is plain gradient descent:
/// `x -= learning_rate * grad`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Sgd {
    /// Step size multiplier.
    pub learning_rate: f32,
    /// If positive, the effective rate on iteration `t` is
    /// `learning_rate / (1 + t * learning_rate_decay)`.
    pub learning_rate_decay: f32,
    /// If positive, `weight_decay * x` is added to the gradient before
    /// the update.
    pub weight_decay: f32,
    /// If positive, the step uses an accumulated velocity
    /// `v = momentum * v + (1 - dampening) * grad` instead of the raw
    /// gradient.
    pub momentum: f32,
    /// Dampens the incoming gradient's contribution to the velocity.
    /// `None` follows `momentum`.
    pub dampening: Option<f32>,
    /// Look-ahead update `grad + momentum * v`. Requires a positive
    /// momentum and zero dampening.
    pub nesterov: bool,
}

impl Sgd {
    /// A configuration with the given learning rate and every other
    /// option at its default.
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }

    fn dampening(&self) -> f32 {
        self.dampening.unwrap_or(self.momentum)
    }

    fn validate(&self) -> Result<()> {
        if self.nesterov && (self.momentum <= 0. || self.dampening() != 0.) {
            return Err(OptimErr::InvalidConfig(
                "nesterov requires a positive momentum and zero dampening",
            ));
        }

        Ok(())
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            learning_rate_decay: 0.,
            weight_decay: 0.,
            momentum: 0.,
            dampening: None,
            nesterov: false,
        }
    }
}

/// Accumulators for [`Sgd`]. `Default` starts a fresh optimization.
#[derive(Debug, Clone, Default)]
pub struct SgdState {
    velocity: Option<Box<[f32]>>,
    iteration: usize,
}

impl SgdState {
    /// Number of completed steps.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The velocity accumulator, allocated on the first momentum step.
    pub fn velocity(&self) -> Option<&[f32]> {
        self.velocity.as_deref()
    }
}

impl Optimizer for Sgd {
    type State = SgdState;

    fn step(
        &self,
        objective: &mut dyn Objective,
        x: &mut [f32],
        state: &mut SgdState,
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

        if let Some(velocity) = &state.velocity {
            if velocity.len() != x.len() {
                return Err(OptimErr::DimensionMismatch {
                    what: "velocity",
                    got: velocity.len(),
                    expected: x.len(),
                });
            }
        }

        if self.weight_decay > 0. {
            let wd = self.weight_decay;
            grad.iter_mut().zip(x.iter()).for_each(|(g, w)| *g += wd * w);
        }

        let lr = self.learning_rate / (1. + state.iteration as f32 * self.learning_rate_decay);

        if self.momentum > 0. {
            let velocity = state.velocity.get_or_insert_with(|| {
                debug!(params = x.len(); "allocating velocity accumulator");
                vec![0.; x.len()].into_boxed_slice()
            });

            let mu = self.momentum;
            let damp = self.dampening();

            if self.nesterov {
                x.iter_mut()
                    .zip(&grad)
                    .zip(velocity.iter_mut())
                    .for_each(|((w, g), v)| {
                        *v = mu * *v + g;
                        *w -= lr * (g + mu * *v);
                    });
            } else {
                x.iter_mut()
                    .zip(&grad)
                    .zip(velocity.iter_mut())
                    .for_each(|((w, g), v)| {
                        *v = mu * *v + (1. - damp) * g;
                        *w -= lr * *v;
                    });
            }
        } else {
            for (w, g) in x.iter_mut().zip(&grad) {
                *w -= lr * g;
            }
        }

        state.iteration += 1;
        Ok(vec![loss])
    }
}
