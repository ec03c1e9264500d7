mod component;
mod flatten;
mod group;
mod view;

pub use component::{BufferPair, Component};
pub use flatten::FlattenedParams;
pub use group::ParameterGroup;
pub use view::ParamView;
