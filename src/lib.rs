//! A stateful iterative optimizer core over flat parameter vectors, plus
//! the buffer consolidation that lets many independently owned parameter
//! buffers be optimized as one contiguous vector.
//!
//! Setup consolidates a [`ParameterGroup`] once into a
//! [`FlattenedParams`]; the training loop then repeatedly evaluates an
//! [`Objective`] and applies an [`Optimizer`] step to the flat vector,
//! carrying the algorithm's state across calls.

mod error;
mod optimization;
mod parameters;

pub use error::{OptimErr, Result};
pub use optimization::{
    Adagrad, AdagradState, Adam, AdamState, Objective, Optimizer, OptimizerSpec, Sgd, SgdState,
};
pub use parameters::{BufferPair, Component, FlattenedParams, ParamView, ParameterGroup};
