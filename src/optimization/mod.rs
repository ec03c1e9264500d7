mod adagrad;
mod adam;
mod objective;
mod optimizer;
mod sgd;
mod spec;

pub use adagrad::{Adagrad, AdagradState};
pub use adam::{Adam, AdamState};
pub use objective::Objective;
pub use optimizer::Optimizer;
pub use sgd::{Sgd, SgdState};
pub use spec::OptimizerSpec;
