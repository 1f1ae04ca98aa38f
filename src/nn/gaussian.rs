//! Diagonal-covariance Gaussian over continuous actions.
//!
//! Action dimensions are independent, so joint log-densities are sums over the last
//! dimension. Entropy is reported per dimension.

use burn::prelude::*;
use rand::Rng;
use rand_distr::StandardNormal;

/// `0.5 * ln(2π)`
const HALF_LN_2PI: f32 = 0.918_938_5;

/// A batch of diagonal Gaussians, one row per state.
#[derive(Debug, Clone)]
pub struct DiagGaussian<B: Backend> {
    /// `[batch, action_dim]`
    mean: Tensor<B, 2>,
    /// `[batch, action_dim]`
    log_std: Tensor<B, 2>,
}

impl<B: Backend> DiagGaussian<B> {
    pub fn new(mean: Tensor<B, 2>, log_std: Tensor<B, 2>) -> Self {
        Self { mean, log_std }
    }

    pub fn mean(&self) -> Tensor<B, 2> {
        self.mean.clone()
    }

    pub fn std(&self) -> Tensor<B, 2> {
        self.log_std.clone().exp()
    }

    /// Draw `mean + std * ε` with `ε ~ N(0, I)` taken from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Tensor<B, 2> {
        let [batch, dim] = self.mean.dims();
        let noise: Vec<f32> = (0..batch * dim).map(|_| rng.sample(StandardNormal)).collect();
        let noise = Tensor::<B, 2>::from_data(TensorData::new(noise, [batch, dim]), &self.mean.device());

        self.mean.clone() + self.std() * noise
    }

    /// Joint log-density of `actions`, summed over action dimensions: `[batch]`
    ///
    /// log N(x; μ, σ) = -0.5 * ((x - μ) / σ)² - log σ - 0.5 * log(2π)
    pub fn log_prob(&self, actions: Tensor<B, 2>) -> Tensor<B, 1> {
        let z = (actions - self.mean.clone()) / self.std();

        z.powf_scalar(2.0)
            .mul_scalar(-0.5)
            .sub(self.log_std.clone())
            .sub_scalar(HALF_LN_2PI)
            .sum_dim(1)
            .squeeze_dims(&[1])
    }

    /// Entropy of every component: `[batch, action_dim]`
    ///
    /// H = 0.5 + 0.5 * log(2π) + log σ
    pub fn entropy(&self) -> Tensor<B, 2> {
        self.log_std.clone().add_scalar(0.5 + HALF_LN_2PI)
    }
}
