use log::debug;

use crate::error::{OptimErr, Result};

use super::{ParamView, ParameterGroup};

/// Owns the consolidated parameter and gradient storage for a group of
/// components.
///
/// Consolidation performs the one and only copy; every later access
/// resolves a [`ParamView`] against the same allocation, so a write
/// through a view and a write through the contiguous buffer land in the
/// same memory. Both buffers are boxed slices and are never reallocated,
/// which keeps every handed-out view valid for the lifetime of the set.
#[derive(Debug)]
pub struct FlattenedParams {
    params: Box<[f32]>,
    grads: Box<[f32]>,
    views: Box<[ParamView]>,
}

impl FlattenedParams {
    /// Consolidates the group's buffers into one parameter and one
    /// gradient allocation and rebinds every component to its sub-range.
    ///
    /// Views are assigned in registration order and preserve each
    /// component's parameter values at the moment of the call.
    ///
    /// # Arguments
    /// * `group` - The ordered components to consolidate. The group is
    ///   consumed; re-consolidating the same components requires building
    ///   a new group and is rejected.
    ///
    /// # Errors
    /// * `OptimErr::InvalidInput` - A component's parameter and gradient
    ///   buffers have different lengths. No component is rebound.
    /// * `OptimErr::AlreadyFlattened` - A component already carries a view
    ///   from an earlier consolidation. No component is rebound.
    pub fn flatten(mut group: ParameterGroup<'_>) -> Result<Self> {
        let mut total = 0;
        for (i, component) in group.components().iter().enumerate() {
            if component.view().is_some() {
                return Err(OptimErr::AlreadyFlattened { component: i });
            }

            let params = component.params().len();
            let grads = component.grads().len();
            if params != grads {
                return Err(OptimErr::InvalidInput {
                    component: i,
                    params,
                    grads,
                });
            }

            total += params;
        }

        let mut params = vec![0.; total].into_boxed_slice();
        let mut grads = vec![0.; total].into_boxed_slice();
        let mut views = Vec::with_capacity(group.len());

        let mut offset = 0;
        for component in group.components_mut() {
            let view = ParamView::new(offset, component.params().len());

            params[view.range()].copy_from_slice(component.params());
            grads[view.range()].copy_from_slice(component.grads());
            component.rebind(view);

            offset = view.range().end;
            views.push(view);
        }

        debug!(components = views.len(), params = total; "consolidated parameter buffers");

        Ok(Self {
            params,
            grads,
            views: views.into_boxed_slice(),
        })
    }

    /// Total number of parameters in the set.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The ordered view descriptors, one per component, in registration
    /// order.
    pub fn views(&self) -> &[ParamView] {
        &self.views
    }

    /// The flat parameter vector.
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// The flat parameter vector, for the optimizer to mutate in place.
    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    /// The flat gradient vector.
    pub fn grads(&self) -> &[f32] {
        &self.grads
    }

    /// The flat gradient vector, for gradient producers to write into.
    pub fn grads_mut(&mut self) -> &mut [f32] {
        &mut self.grads
    }

    /// The parameter and gradient vectors at once, both mutable.
    ///
    /// The two buffers are distinct allocations, so a caller can hand the
    /// gradient slice to an objective closure while the optimizer mutates
    /// the parameter slice.
    pub fn split_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.params, &mut self.grads)
    }

    /// Resolves a view against the parameter buffer.
    ///
    /// # Panics
    /// If the view does not lie within this set.
    pub fn view_params(&self, view: ParamView) -> &[f32] {
        &self.params[view.range()]
    }

    /// Resolves a view against the parameter buffer, mutably.
    ///
    /// # Panics
    /// If the view does not lie within this set.
    pub fn view_params_mut(&mut self, view: ParamView) -> &mut [f32] {
        &mut self.params[view.range()]
    }

    /// Resolves a view against the gradient buffer.
    ///
    /// # Panics
    /// If the view does not lie within this set.
    pub fn view_grads(&self, view: ParamView) -> &[f32] {
        &self.grads[view.range()]
    }

    /// Resolves a view against the gradient buffer, mutably.
    ///
    /// # Panics
    /// If the view does not lie within this set.
    pub fn view_grads_mut(&mut self, view: ParamView) -> &mut [f32] {
        &mut self.grads[view.range()]
    }

    /// Fills the gradient buffer with zeros.
    pub fn zero_grad(&mut self) {
        self.grads.fill(0.);
    }

    /// Splits the gradient buffer into disjoint per-component slices, in
    /// view order.
    ///
    /// The slices never overlap, so independent threads may each write one
    /// of them without synchronization. The mutable borrow on the set ends
    /// only once every slice is dropped, which forces the barrier between
    /// gradient computation and the optimizer step.
    pub fn disjoint_grads_mut(&mut self) -> Vec<&mut [f32]> {
        let mut out = Vec::with_capacity(self.views.len());
        let mut rest = &mut self.grads[..];

        for view in &self.views {
            let (head, tail) = rest.split_at_mut(view.len());
            out.push(head);
            rest = tail;
        }

        out
    }
}
