use crate::error::Result;

use super::Objective;

/// The step protocol shared by every algorithm in the crate.
///
/// The algorithm value itself is the configuration: it is read through
/// `&self`, so it cannot change during a call and may be shared across
/// many calls. The accumulators live in an explicitly constructed
/// [`State`](Optimizer::State) passed back in on every call. A fresh
/// (`Default`) state starts a new optimization; two optimizations with
/// separate states never interfere, even over the same parameter storage.
/// Reinitializing the state mid-run resets momentum and adaptive
/// accumulators and is the caller's misuse to avoid.
pub trait Optimizer {
    /// Algorithm-specific accumulators carried across steps.
    type State: Default;

    /// Performs one update of `x` in place.
    ///
    /// Evaluates `objective`, applies the algorithm's update rule to `x`
    /// and returns the losses observed during the call, in evaluation
    /// order. Every algorithm in this crate evaluates the objective
    /// exactly once per step, so the returned history holds one element;
    /// the protocol leaves room for algorithms that evaluate several
    /// times.
    ///
    /// `x` is borrowed mutably for the whole call, so no other party can
    /// read or write its storage between the gradient computation and the
    /// update application.
    ///
    /// # Errors
    /// * `OptimErr::InvalidConfig` - The options contradict each other.
    ///   Detected before the objective runs; `x` and `state` are
    ///   untouched.
    /// * `OptimErr::DimensionMismatch` - The returned gradient or a
    ///   pre-existing accumulator disagrees with `x` in length; `x` is
    ///   untouched.
    fn step(
        &self,
        objective: &mut dyn Objective,
        x: &mut [f32],
        state: &mut Self::State,
    ) -> Result<Vec<f32>>;
}
