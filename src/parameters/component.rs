use super::ParamView;

/// A model component that owns its parameter and gradient storage until it
/// is consolidated into a flat buffer.
///
/// Before consolidation a component hands out its owned buffers through
/// [`params`](Component::params) and [`grads`](Component::grads). During
/// consolidation it is [`rebind`](Component::rebind)-ed: it must drop its
/// own allocations and keep only the assigned [`ParamView`], resolving its
/// parameters through the owning
/// [`FlattenedParams`](super::FlattenedParams) from then on.
pub trait Component {
    /// Parameter buffer currently owned by the component.
    fn params(&self) -> &[f32];

    /// Gradient buffer currently owned by the component.
    ///
    /// Must have the same length as [`params`](Component::params).
    fn grads(&self) -> &[f32];

    /// Replaces the component's owned storage with a range into the flat
    /// buffers.
    fn rebind(&mut self, view: ParamView);

    /// The view assigned by a previous consolidation, if any.
    fn view(&self) -> Option<ParamView>;
}

/// A plain pair of owned buffers, for components that keep no structure of
/// their own beyond the parameters themselves.
#[derive(Debug, Default)]
pub struct BufferPair {
    params: Vec<f32>,
    grads: Vec<f32>,
    view: Option<ParamView>,
}

impl BufferPair {
    /// Wraps the given parameter and gradient buffers.
    ///
    /// Length agreement between the two buffers is checked at
    /// consolidation time, not here.
    pub fn new(params: Vec<f32>, grads: Vec<f32>) -> Self {
        Self {
            params,
            grads,
            view: None,
        }
    }

    /// A pair of zero-filled buffers of the given length.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0.; len], vec![0.; len])
    }
}

impl Component for BufferPair {
    fn params(&self) -> &[f32] {
        &self.params
    }

    fn grads(&self) -> &[f32] {
        &self.grads
    }

    fn rebind(&mut self, view: ParamView) {
        self.params = Vec::new();
        self.grads = Vec::new();
        self.view = Some(view);
    }

    fn view(&self) -> Option<ParamView> {
        self.view
    }
}
