use serde::{Deserialize, Serialize};

use super::{Adagrad, Adam, Sgd};

/// Serialized selection of an optimization algorithm.
///
/// This is the shape callers embed in training-run descriptions; it
/// resolves to the concrete configuration structs. Omitted fields take
/// the algorithm's documented defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Sgd(Sgd),
    Adagrad(Adagrad),
    Adam(Adam),
}
