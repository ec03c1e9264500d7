use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{OptimErr, Result};

use super::{Objective, Optimizer};

/// Adagrad: per-coordinate steps scaled by the accumulated squared
/// gradient, so frequently-updated coordinates slow down on their own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Adagrad {
    /// Step size multiplier.
    pub learning_rate: f32,
    /// If positive, the effective rate on iteration `t` is
    /// `learning_rate / (1 + t * learning_rate_decay)`.
    pub learning_rate_decay: f32,
    /// If positive, `weight_decay * x` is added to the gradient before
    /// the update.
    pub weight_decay: f32,
    /// Keeps the denominator away from zero before any gradient has
    /// accumulated.
    pub epsilon: f32,
}

impl Adagrad {
    /// A configuration with the given learning rate and every other
    /// option at its default.
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }
}

impl Default for Adagrad {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            learning_rate_decay: 0.,
            weight_decay: 0.,
            epsilon: 1e-10,
        }
    }
}

/// Accumulators for [`Adagrad`]. `Default` starts a fresh optimization.
#[derive(Debug, Clone, Default)]
pub struct AdagradState {
    accum: Option<Box<[f32]>>,
    iteration: usize,
}

impl AdagradState {
    /// Number of completed steps.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The squared-gradient accumulator, allocated on the first step.
    pub fn accum(&self) -> Option<&[f32]> {
        self.accum.as_deref()
    }
}

impl Optimizer for Adagrad {
    type State = AdagradState;

    fn step(
        &self,
        objective: &mut dyn Objective,
        x: &mut [f32],
        state: &mut AdagradState,
    ) -> Result<Vec<f32>> {
        let (loss, mut grad) = objective.evaluate(x);
        if grad.len() != x.len() {
            return Err(OptimErr::DimensionMismatch {
                what: "gradient",
                got: grad.len(),
                expected: x.len(),
            });
        }

        if let Some(accum) = &state.accum {
            if accum.len() != x.len() {
                return Err(OptimErr::DimensionMismatch {
                    what: "squared-gradient accumulator",
                    got: accum.len(),
                    expected: x.len(),
                });
            }
        }

        if self.weight_decay > 0. {
            let wd = self.weight_decay;
            grad.iter_mut().zip(x.iter()).for_each(|(g, w)| *g += wd * w);
        }

        let lr = self.learning_rate / (1. + state.iteration as f32 * self.learning_rate_decay);
        let eps = self.epsilon;

        let accum = state.accum.get_or_insert_with(|| {
            debug!(params = x.len(); "allocating squared-gradient accumulator");
            vec![0.; x.len()].into_boxed_slice()
        });

        x.iter_mut()
            .zip(&grad)
            .zip(accum.iter_mut())
            .for_each(|((w, g), a)| {
                *a += g * g;
                *w -= lr * g / (a.sqrt() + eps);
            });

        state.iteration += 1;
        Ok(vec![loss])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(grad: Vec<f32>) -> impl FnMut(&[f32]) -> (f32, Vec<f32>) {
        move |_: &[f32]| (0., grad.clone())
    }

    #[test]
    fn accumulates_squared_gradients() {
        let adagrad = Adagrad {
            learning_rate: 1.,
            epsilon: 0.,
            ..Adagrad::default()
        };
        let mut state = AdagradState::default();
        let mut x = [0., 0.];

        // First step: accum = g^2, so each coordinate moves by lr * sign(g).
        adagrad
            .step(&mut constant(vec![3., -4.]), &mut x, &mut state)
            .unwrap();
        assert_eq!(state.accum().unwrap(), [9., 16.]);
        assert_eq!(x, [-1., 1.]);

        // Second step: accum = 2 * g^2, step shrinks by sqrt(2).
        adagrad
            .step(&mut constant(vec![3., -4.]), &mut x, &mut state)
            .unwrap();
        assert_eq!(state.accum().unwrap(), [18., 32.]);

        let expected = 1. + 1. / 2f32.sqrt();
        assert!((x[0] + expected).abs() < 1e-6);
        assert!((x[1] - expected).abs() < 1e-6);
        assert_eq!(state.iteration(), 2);
    }

    #[test]
    fn short_gradient_leaves_parameters_untouched() {
        let adagrad = Adagrad::default();
        let mut x = [1., 2.];

        let err = adagrad
            .step(
                &mut constant(vec![1.]),
                &mut x,
                &mut AdagradState::default(),
            )
            .unwrap_err();

        assert!(matches!(err, OptimErr::DimensionMismatch { .. }));
        assert_eq!(x, [1., 2.]);
    }

    #[test]
    fn stale_accumulator_is_rejected() {
        let adagrad = Adagrad::default();
        let mut state = AdagradState::default();

        adagrad
            .step(&mut constant(vec![1.; 3]), &mut [0.; 3], &mut state)
            .unwrap();

        let mut x = [0.; 2];
        let err = adagrad
            .step(&mut constant(vec![1.; 2]), &mut x, &mut state)
            .unwrap_err();

        assert!(matches!(
            err,
            OptimErr::DimensionMismatch {
                got: 3,
                expected: 2,
                ..
            }
        ));
    }
}
