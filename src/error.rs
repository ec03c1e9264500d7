use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, OptimErr>;

/// Failures surfaced by parameter consolidation and optimizer steps.
///
/// Every variant is detected synchronously at the offending call and
/// reported before any parameter or state storage is touched, so a failed
/// call never leaves a partial update behind.
#[derive(Debug)]
pub enum OptimErr {
    /// A component's parameter and gradient buffers disagree in length.
    InvalidInput {
        component: usize,
        params: usize,
        grads: usize,
    },
    /// A component already carries a view from a previous consolidation.
    AlreadyFlattened { component: usize },
    /// Contradictory optimizer options.
    InvalidConfig(&'static str),
    /// A gradient or accumulator length disagrees with the parameter vector.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

impl Display for OptimErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimErr::InvalidInput {
                component,
                params,
                grads,
            } => write!(
                f,
                "component {component} has mismatched buffers: {params} parameters and {grads} gradients"
            ),
            OptimErr::AlreadyFlattened { component } => {
                write!(f, "component {component} already belongs to a flattened set")
            }
            OptimErr::InvalidConfig(msg) => write!(f, "invalid optimizer configuration: {msg}"),
            OptimErr::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(f, "{what} length mismatch: got {got}, expected {expected}"),
        }
    }
}

impl Error for OptimErr {}
