//! Actor (Gaussian policy) and critic (state value) networks.
//!
//! Both are two-hidden-layer ReLU MLPs with orthogonal weights and zero biases.

use burn::{
    module::{Module, Param},
    prelude::*,
};
use rand::Rng;

use super::{
    gaussian::DiagGaussian,
    mlp::{MLPConfig, MLP},
};

/// Initial value of every `log_std` entry (std = e^-0.5 ≈ 0.61)
pub const INITIAL_LOG_STD: f32 = -0.5;

/// Configuration for [`GaussianActor`]
#[derive(Config, Debug)]
pub struct ActorConfig {
    pub state_size: usize,
    pub action_size: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
}

/// Policy network: state → N(mean(state), exp(log_std))
///
/// Architecture: state → fc (hidden) → ReLU → fc (hidden) → ReLU → mean (action_dim)
///
/// `log_std` is a learned vector shared by every state.
#[derive(Module, Debug)]
pub struct GaussianActor<B: Backend> {
    mean: MLP<B>,
    log_std: Param<Tensor<B, 1>>,
}

impl ActorConfig {
    pub fn init<B: Backend, R: Rng + ?Sized>(&self, device: &B::Device, rng: &mut R) -> GaussianActor<B> {
        GaussianActor {
            mean: MLPConfig::new(
                self.state_size,
                vec![self.hidden_size, self.hidden_size],
                self.action_size,
            )
            .init(device, rng),
            log_std: Param::from_tensor(
                Tensor::ones([self.action_size], device).mul_scalar(INITIAL_LOG_STD),
            ),
        }
    }
}

impl<B: Backend> GaussianActor<B> {
    /// Forward pass: `[batch, state_dim]` → (mean `[batch, action_dim]`, std `[action_dim]`)
    pub fn forward(&self, state: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 1>) {
        (self.mean.forward(state), self.log_std.val().exp())
    }

    /// Action distribution for a batch of states, with `log_std` broadcast over the batch
    pub fn distribution(&self, state: Tensor<B, 2>) -> DiagGaussian<B> {
        let mean = self.mean.forward(state);
        let batch_size = mean.dims()[0];
        let log_std = self
            .log_std
            .val()
            .unsqueeze_dim::<2>(0)
            .repeat_dim(0, batch_size);

        DiagGaussian::new(mean, log_std)
    }

    /// Sample an action per state and its joint log-probability
    ///
    /// Returns: (action `[batch, action_dim]`, log_prob `[batch]`)
    pub fn get_action<R: Rng + ?Sized>(
        &self,
        state: Tensor<B, 2>,
        rng: &mut R,
    ) -> (Tensor<B, 2>, Tensor<B, 1>) {
        let dist = self.distribution(state);
        let action = dist.sample(rng);
        let log_prob = dist.log_prob(action.clone());
        (action, log_prob)
    }

    pub fn log_std(&self) -> Tensor<B, 1> {
        self.log_std.val()
    }
}

/// Configuration for [`ValueCritic`]
#[derive(Config, Debug)]
pub struct CriticConfig {
    pub state_size: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
}

/// Value network: state → V(state)
///
/// Architecture: state → fc (hidden) → ReLU → fc (hidden) → ReLU → fc (1)
#[derive(Module, Debug)]
pub struct ValueCritic<B: Backend> {
    net: MLP<B>,
}

impl CriticConfig {
    pub fn init<B: Backend, R: Rng + ?Sized>(&self, device: &B::Device, rng: &mut R) -> ValueCritic<B> {
        ValueCritic {
            net: MLPConfig::new(self.state_size, vec![self.hidden_size, self.hidden_size], 1)
                .init(device, rng),
        }
    }
}

impl<B: Backend> ValueCritic<B> {
    /// `[batch, state_dim]` → `[batch, 1]`
    pub fn forward(&self, state: Tensor<B, 2>) -> Tensor<B, 2> {
        self.net.forward(state)
    }
}
