//! Global L2-norm gradient clipping for a single module.
//!
//! burn's `GradientClippingConfig::Norm` clips each parameter tensor on its own.
//! Here the norm is taken over every float parameter of the module at once, and
//! all gradients are rescaled by the same factor when it exceeds the threshold.

use std::marker::PhantomData;

use burn::{
    module::{AutodiffModule, ModuleVisitor, ParamId},
    optim::GradientsParams,
    prelude::*,
    tensor::backend::AutodiffBackend,
};

/// Sums the squared entries of every gradient belonging to the visited module.
struct SquaredNorm<'a, B: AutodiffBackend> {
    grads: &'a GradientsParams,
    sum: f32,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for SquaredNorm<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.get::<B::InnerBackend, D>(id) {
            self.sum += grad.powf_scalar(2.0).sum().into_scalar().elem::<f32>();
        }
    }
}

/// Multiplies every gradient belonging to the visited module by `scale`.
struct Rescale<'a, B: AutodiffBackend> {
    grads: &'a mut GradientsParams,
    scale: f32,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for Rescale<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.remove::<B::InnerBackend, D>(id) {
            self.grads.register(id, grad.mul_scalar(self.scale));
        }
    }
}

/// L2 norm over all gradients of `module`.
pub fn grad_norm<B, M>(module: &M, grads: &GradientsParams) -> f32
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let mut visitor = SquaredNorm::<B> {
        grads,
        sum: 0.0,
        _backend: PhantomData,
    };
    module.visit(&mut visitor);
    visitor.sum.sqrt()
}

/// Rescale `grads` so their global norm is at most `max_norm`.
///
/// Returns the norm measured before clipping.
pub fn clip_grad_norm<B, M>(module: &M, grads: &mut GradientsParams, max_norm: f32) -> f32
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let total_norm = grad_norm::<B, M>(module, grads);
    let scale = max_norm / (total_norm + 1e-6);

    if scale < 1.0 {
        let mut visitor = Rescale::<B> {
            grads,
            scale,
            _backend: PhantomData,
        };
        module.visit(&mut visitor);
    }

    total_norm
}
