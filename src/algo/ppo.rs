//! Proximal Policy Optimization (PPO) with a diagonal Gaussian policy
//!
//! PPO is an on-policy actor-critic algorithm that improves upon A2C by using a clipped
//! surrogate objective to prevent excessively large policy updates.
//!
//! # Algorithm Overview
//!
//! 1. Collect transitions with `act` + `store`
//! 2. `learn`:
//!    - normalize rewards over the whole buffer
//!    - compute advantages with GAE (backward recurrence, zero terminal bootstrap)
//!    - normalize advantages
//!    - for `n_epochs`: shuffle, cut into mini-batches, and take one joint
//!      actor + critic gradient step per mini-batch
//!    - clear the buffer
//!
//! # Loss
//!
//! ```text
//! L = -mean(min(r·A, clip(r, 1-ε, 1+ε)·A))     (policy)
//!   + c1 · smooth_l1(V(s), r̂)                   (value, r̂ = normalized reward)
//!   - c2 · H[π(·|s)]                             (entropy bonus)
//! ```
//!
//! Each network's gradients are clipped to a global L2 norm of `max_grad_norm`
//! before its own Adam step.
//!
//! # Usage Example
//!
//! ```ignore
//! use latent_ppo::algo::ppo::{PPOAgent, PPOAgentConfig};
//!
//! let config = PPOAgentConfig::new(100, 100)
//!     .with_batch_size(64)
//!     .with_n_epochs(10);
//!
//! let mut agent = PPOAgent::<Autodiff<NdArray>>::new(config, device);
//! let (action, value, log_prob) = agent.act(&state);
//! agent.store(state, action, reward, value, log_prob);
//! agent.learn();
//! ```
//!
//! Reference: "Proximal Policy Optimization Algorithms" (Schulman et al., 2017)

use burn::{
    module::AutodiffModule,
    nn::loss::{HuberLossConfig, Reduction},
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, Numeric},
};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    memory::{shuffled_batches, PPOMemory},
    nn::{clip_grad_norm, ActorConfig, CriticConfig, GaussianActor, ValueCritic},
    traits::{ToTensor, TrainableAgent, TrainingMetrics},
};

/// Added to every normalization denominator
pub const NORM_EPSILON: f32 = 1e-8;

/// Adam's denominator epsilon (burn defaults to 1e-5)
pub const ADAM_EPSILON: f32 = 1e-8;

/// Adam settings shared by the actor and critic optimizers
pub fn optimizer_config() -> AdamConfig {
    AdamConfig::new().with_epsilon(ADAM_EPSILON)
}

/// Configuration for [`PPOAgent`]
#[derive(Config, Debug)]
pub struct PPOAgentConfig {
    /// Dimension of the state vector
    pub state_size: usize,
    /// Dimension of the action vector
    pub action_size: usize,
    /// Width of both hidden layers in actor and critic
    ///
    /// **Default:** `256`
    #[config(default = 256)]
    pub hidden_size: usize,
    /// Adam learning rate, shared by both optimizers
    ///
    /// **Default:** `3e-4`
    #[config(default = 3e-4)]
    pub lr: f64,
    /// Discount factor γ
    ///
    /// **Default:** `0.99`
    #[config(default = 0.99)]
    pub gamma: f32,
    /// GAE λ
    ///
    /// **Default:** `0.95`
    #[config(default = 0.95)]
    pub gae_lambda: f32,
    /// Ratio clipping parameter ε
    ///
    /// **Default:** `0.2`
    #[config(default = 0.2)]
    pub clip_epsilon: f32,
    /// Value loss coefficient c1
    ///
    /// **Default:** `0.5`
    #[config(default = 0.5)]
    pub c1: f32,
    /// Entropy bonus coefficient c2
    ///
    /// **Default:** `0.01`
    #[config(default = 0.01)]
    pub c2: f32,
    /// Mini-batch size, also the minimum number of transitions `learn` needs
    ///
    /// **Default:** `64`
    #[config(default = 64)]
    pub batch_size: usize,
    /// Optimization epochs per `learn` call
    ///
    /// **Default:** `10`
    #[config(default = 10)]
    pub n_epochs: usize,
    /// Informational only: the actor always starts at `log_std = -0.5`
    ///
    /// **Default:** `0.6`
    #[config(default = 0.6)]
    pub action_std_init: f32,
    /// Global gradient-norm threshold, applied per network
    ///
    /// **Default:** `0.5`
    #[config(default = 0.5)]
    pub max_grad_norm: f32,
    /// Seed for weight init, action sampling and mini-batch shuffling
    ///
    /// **Default:** `42`
    #[config(default = 42)]
    pub seed: u64,
}

impl PPOAgentConfig {
    /// Load a config previously written with [`Config::save`]
    pub fn load_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        Self::load(path).map_err(|e| crate::Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// PPO Agent for continuous action spaces
///
/// Generic over the autodiff backend `B`; the device is passed in explicitly and
/// all randomness comes from one seeded RNG owned by the agent.
pub struct PPOAgent<B: AutodiffBackend> {
    // Networks
    actor: GaussianActor<B>,
    critic: ValueCritic<B>,

    // Trajectory buffer
    memory: PPOMemory,

    // Optimizers (stored to keep Adam moments across updates)
    actor_optimizer: OptimizerAdaptor<Adam, GaussianActor<B>, B>,
    critic_optimizer: OptimizerAdaptor<Adam, ValueCritic<B>, B>,

    config: PPOAgentConfig,
    device: B::Device,
    rng: StdRng,
}

impl<B: AutodiffBackend> PPOAgent<B> {
    /// Create a new agent with freshly initialised networks
    pub fn new(config: PPOAgentConfig, device: B::Device) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let actor = ActorConfig::new(config.state_size, config.action_size)
            .with_hidden_size(config.hidden_size)
            .init(&device, &mut rng);
        let critic = CriticConfig::new(config.state_size)
            .with_hidden_size(config.hidden_size)
            .init(&device, &mut rng);

        Self::from_parts(actor, critic, config, device, rng)
    }

    /// Create an agent around existing networks, e.g. a restored actor snapshot
    pub fn with_networks(
        actor: GaussianActor<B>,
        critic: ValueCritic<B>,
        config: PPOAgentConfig,
        device: B::Device,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::from_parts(actor, critic, config, device, rng)
    }

    fn from_parts(
        actor: GaussianActor<B>,
        critic: ValueCritic<B>,
        config: PPOAgentConfig,
        device: B::Device,
        rng: StdRng,
    ) -> Self {
        Self {
            actor,
            critic,
            memory: PPOMemory::new(config.batch_size),
            actor_optimizer: optimizer_config().init(),
            critic_optimizer: optimizer_config().init(),
            config,
            device,
            rng,
        }
    }

    pub fn actor(&self) -> &GaussianActor<B> {
        &self.actor
    }

    pub fn critic(&self) -> &ValueCritic<B> {
        &self.critic
    }

    pub fn memory(&self) -> &PPOMemory {
        &self.memory
    }

    pub fn config(&self) -> &PPOAgentConfig {
        &self.config
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Record one transition
    pub fn store(&mut self, state: Vec<f32>, action: Vec<f32>, reward: f32, value: f32, log_prob: f32) {
        self.memory.store(state, action, reward, value, log_prob);
    }

    /// Select an action for a single state
    ///
    /// Runs on the inner (non-autodiff) backend, so nothing is tracked for gradients.
    ///
    /// Returns (action, value_estimate, log_prob)
    pub fn act(&mut self, state: &[f32]) -> (Vec<f32>, f32, f32) {
        let actor = self.actor.valid();
        let critic = self.critic.valid();

        let state_tensor: Tensor<B::InnerBackend, 1> = state.to_tensor(&self.device);
        let state_tensor = state_tensor.unsqueeze_dim::<2>(0);

        let (action, log_prob) = actor.get_action(state_tensor.clone(), &mut self.rng);
        let value = critic.forward(state_tensor);

        let action: Vec<f32> = action.into_data().iter::<f32>().collect();
        let log_prob = log_prob.into_scalar().elem::<f32>();
        let value = value.into_scalar().elem::<f32>();

        (action, value, log_prob)
    }

    /// Update the agent using the stored trajectory
    ///
    /// No-op (`None`) while fewer than `batch_size` transitions are stored; the
    /// buffer then keeps accumulating. Otherwise the buffer is cleared afterwards.
    pub fn learn(&mut self) -> Option<TrainingMetrics> {
        let n_samples = self.memory.len();
        if n_samples < self.config.batch_size {
            tracing::trace!(
                stored = n_samples,
                batch_size = self.config.batch_size,
                "not enough transitions to learn"
            );
            return None;
        }

        // Normalize rewards, then compute and normalize advantages
        let rewards = normalize(self.memory.rewards());
        let advantages = normalize(&compute_gae(
            &rewards,
            self.memory.values(),
            self.config.gamma,
            self.config.gae_lambda,
        ));

        let states: Tensor<B, 2> = self.memory.states().to_tensor(&self.device);
        let actions: Tensor<B, 2> = self.memory.actions().to_tensor(&self.device);
        let old_log_probs: Tensor<B, 1> = self.memory.log_probs().to_tensor(&self.device);
        let rewards: Tensor<B, 1> = rewards.as_slice().to_tensor(&self.device);
        let advantages: Tensor<B, 1> = advantages.as_slice().to_tensor(&self.device);

        let value_loss_fn = HuberLossConfig::new(1.0).init();
        let mut totals = TrainingMetrics::default();

        // Multiple epochs of optimization
        for _epoch in 0..self.config.n_epochs {
            for batch_indices in shuffled_batches(n_samples, self.config.batch_size, &mut self.rng) {
                let indices: Tensor<B, 1, Int> = batch_indices.as_slice().to_tensor(&self.device);

                let batch_states = gather(&states, &indices);
                let batch_actions = gather(&actions, &indices);
                let batch_old_log_probs = gather(&old_log_probs, &indices);
                let batch_rewards = gather(&rewards, &indices);
                let batch_advantages = gather(&advantages, &indices);

                // Current policy on the batch
                let dist = self.actor.distribution(batch_states.clone());
                let new_log_probs = dist.log_prob(batch_actions);
                // Mean over batch and action dimensions
                let entropy = dist.entropy().mean();

                // Current value estimate
                let values: Tensor<B, 1> = self.critic.forward(batch_states).squeeze_dims(&[1]);

                let ratio = (new_log_probs.clone() - batch_old_log_probs.clone()).exp();
                let policy_loss = clipped_surrogate(
                    ratio.clone(),
                    batch_advantages,
                    self.config.clip_epsilon,
                )
                .mean()
                .neg();
                let value_loss = value_loss_fn.forward(values, batch_rewards, Reduction::Mean);
                let entropy_loss = entropy.clone().mul_scalar(-self.config.c2);

                let total_loss = policy_loss.clone()
                    + value_loss.clone().mul_scalar(self.config.c1)
                    + entropy_loss;

                // Extract metrics before backward pass
                totals.policy_loss += policy_loss.into_scalar().elem::<f32>();
                totals.value_loss += value_loss.into_scalar().elem::<f32>();
                totals.entropy += entropy.into_scalar().elem::<f32>();
                totals.approx_kl += (batch_old_log_probs - new_log_probs)
                    .mean()
                    .into_scalar()
                    .elem::<f32>();
                totals.clip_fraction += clip_fraction(ratio, self.config.clip_epsilon);

                // One backward pass through both networks, then split the gradients
                let mut grads = total_loss.backward();
                let mut actor_grads = GradientsParams::from_module(&mut grads, &self.actor);
                let mut critic_grads = GradientsParams::from_module(&mut grads, &self.critic);

                let actor_norm =
                    clip_grad_norm::<B, _>(&self.actor, &mut actor_grads, self.config.max_grad_norm);
                let critic_norm =
                    clip_grad_norm::<B, _>(&self.critic, &mut critic_grads, self.config.max_grad_norm);
                totals.actor_grad_norm += actor_norm;
                totals.critic_grad_norm += critic_norm;

                tracing::trace!(
                    batch = batch_indices.len(),
                    actor_grad_norm = actor_norm,
                    critic_grad_norm = critic_norm,
                    "ppo mini-batch step"
                );

                self.actor = self
                    .actor_optimizer
                    .step(self.config.lr, self.actor.clone(), actor_grads);
                self.critic = self
                    .critic_optimizer
                    .step(self.config.lr, self.critic.clone(), critic_grads);

                totals.n_updates += 1;
            }
        }

        // Clear trajectory
        self.memory.clear();

        let metrics = average(totals);
        tracing::debug!(
            samples = n_samples,
            updates = metrics.n_updates,
            policy_loss = metrics.policy_loss,
            value_loss = metrics.value_loss,
            entropy = metrics.entropy,
            approx_kl = metrics.approx_kl,
            clip_fraction = metrics.clip_fraction,
            "ppo update"
        );

        Some(metrics)
    }
}

impl<B: AutodiffBackend> TrainableAgent for PPOAgent<B> {
    fn act(&mut self, state: &[f32]) -> (Vec<f32>, f32, f32) {
        PPOAgent::act(self, state)
    }

    fn store(&mut self, state: Vec<f32>, action: Vec<f32>, reward: f32, value: f32, log_prob: f32) {
        PPOAgent::store(self, state, action, reward, value, log_prob);
    }

    fn learn(&mut self) -> Option<TrainingMetrics> {
        PPOAgent::learn(self)
    }
}

/// Generalized Advantage Estimation over one trajectory
///
/// Walks backwards from the last transition; the value after the last one is
/// taken as zero, i.e. the buffer is treated as a complete episode.
///
/// ```text
/// δ_t = r_t + γ·V(t+1) - V(t)
/// A_t = δ_t + γ·λ·A_{t+1}
/// ```
pub fn compute_gae(rewards: &[f32], values: &[f32], gamma: f32, gae_lambda: f32) -> Vec<f32> {
    let n = rewards.len();
    let mut advantages = vec![0.0; n];
    let mut gae = 0.0;

    for t in (0..n).rev() {
        let next_value = if t == n - 1 { 0.0 } else { values[t + 1] };

        let delta = rewards[t] + gamma * next_value - values[t];
        gae = delta + gamma * gae_lambda * gae;
        advantages[t] = gae;
    }

    advantages
}

/// `(x - mean) / (std + ε)` with the unbiased (n-1) standard deviation
///
/// Fewer than two samples have no spread; their std is taken as zero.
pub fn normalize(xs: &[f32]) -> Vec<f32> {
    let n = xs.len();
    if n == 0 {
        return Vec::new();
    }

    let mean = xs.iter().sum::<f32>() / n as f32;
    let std = if n > 1 {
        (xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / (n - 1) as f32).sqrt()
    } else {
        0.0
    };

    xs.iter().map(|x| (x - mean) / (std + NORM_EPSILON)).collect()
}

/// Element-wise `min(r·A, clip(r, 1-ε, 1+ε)·A)`
pub fn clipped_surrogate<B: Backend>(
    ratio: Tensor<B, 1>,
    advantages: Tensor<B, 1>,
    clip_epsilon: f32,
) -> Tensor<B, 1> {
    let clipped_ratio = ratio.clone().clamp(1.0 - clip_epsilon, 1.0 + clip_epsilon);

    let surr1 = ratio * advantages.clone();
    let surr2 = clipped_ratio * advantages;
    surr1.min_pair(surr2)
}

/// Fraction of ratios outside `[1-ε, 1+ε]`
fn clip_fraction<B: Backend>(ratio: Tensor<B, 1>, clip_epsilon: f32) -> f32 {
    let below = ratio.clone().lower_elem(1.0 - clip_epsilon).int();
    let above = ratio.greater_elem(1.0 + clip_epsilon).int();
    (below + above).float().mean().into_scalar().elem::<f32>()
}

/// Rows of `tensor` at `indices`
#[inline]
fn gather<B: Backend, const D: usize, K: Numeric<B>>(
    tensor: &Tensor<B, D, K>,
    indices: &Tensor<B, 1, Int>,
) -> Tensor<B, D, K> {
    tensor.clone().select(0, indices.clone())
}

fn average(totals: TrainingMetrics) -> TrainingMetrics {
    let n = totals.n_updates.max(1) as f32;
    TrainingMetrics {
        policy_loss: totals.policy_loss / n,
        value_loss: totals.value_loss / n,
        entropy: totals.entropy / n,
        approx_kl: totals.approx_kl / n,
        clip_fraction: totals.clip_fraction / n,
        actor_grad_norm: totals.actor_grad_norm / n,
        critic_grad_norm: totals.critic_grad_norm / n,
        n_updates: totals.n_updates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::policy::INITIAL_LOG_STD;
    use burn::{
        backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
        module::{Module, ModuleVisitor, ParamId},
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    /// Flattens every float parameter of a module, in traversal order.
    struct Flatten(Vec<f32>);

    impl<B: Backend> ModuleVisitor<B> for Flatten {
        fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
            self.0.extend(tensor.to_data().iter::<f32>());
        }
    }

    fn params<B: Backend, M: Module<B>>(module: &M) -> Vec<f32> {
        let mut visitor = Flatten(Vec::new());
        module.visit(&mut visitor);
        visitor.0
    }

    fn small_config() -> PPOAgentConfig {
        PPOAgentConfig::new(2, 2)
            .with_hidden_size(16)
            .with_batch_size(4)
            .with_n_epochs(1)
    }

    fn agent(config: PPOAgentConfig) -> PPOAgent<TestBackend> {
        PPOAgent::new(config, NdArrayDevice::default())
    }

    fn fill(agent: &mut PPOAgent<TestBackend>, n: usize) {
        for i in 0..n {
            let x = i as f32 * 0.1;
            agent.store(
                vec![x, 1.0 - x],
                vec![0.5 - x, x],
                if i % 2 == 0 { 1.0 } else { -0.5 } + x,
                0.2 * x,
                -1.5 - x,
            );
        }
    }

    #[test]
    fn test_gae_three_step_literal() {
        let adv = compute_gae(&[1.0, 0.0, 2.0], &[0.5, 0.5, 0.5], 0.99, 0.95);

        let a2 = 1.5_f32;
        let a1 = -0.005 + 0.99 * 0.95 * a2;
        let a0 = 0.995 + 0.99 * 0.95 * a1;

        assert_eq!(adv[2], 1.5);
        assert!((adv[1] - 1.40575).abs() < 1e-5, "{}", adv[1]);
        assert!((adv[1] - a1).abs() < 1e-6);
        assert!((adv[0] - 2.317_108).abs() < 1e-4, "{}", adv[0]);
        assert!((adv[0] - a0).abs() < 1e-6);
    }

    #[test]
    fn test_gae_last_step_has_no_bootstrap() {
        let rewards = [0.3, -1.2, 4.0, 0.7];
        let values = [1.0, 2.0, 3.0, 9.0];
        let adv = compute_gae(&rewards, &values, 0.9, 0.8);
        assert_eq!(adv[3], 0.7 - 9.0);
    }

    #[test]
    fn test_gae_empty() {
        assert!(compute_gae(&[], &[], 0.99, 0.95).is_empty());
    }

    #[test]
    fn test_normalize_zero_mean_unit_std() {
        let xs = normalize(&[1.0, 2.0, 3.0, 4.0, 10.0]);

        let n = xs.len() as f32;
        let mean = xs.iter().sum::<f32>() / n;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / (n - 1.0);

        assert!(mean.abs() < 1e-6);
        assert!((var.sqrt() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_constant_input_stays_finite() {
        let xs = normalize(&[3.0; 6]);
        assert!(xs.iter().all(|x| *x == 0.0));
        assert_eq!(normalize(&[5.0]), vec![0.0]);
    }

    #[test]
    fn test_clipped_surrogate_positive_and_negative_advantage() {
        let device = NdArrayDevice::default();
        let eps = 0.2;

        let ratio = Tensor::<NdArray, 1>::from_floats([0.5, 1.0, 1.5, 0.5, 1.0, 1.5], &device);
        let adv = Tensor::<NdArray, 1>::from_floats([2.0, 2.0, 2.0, -2.0, -2.0, -2.0], &device);

        let out: Vec<f32> = clipped_surrogate(ratio, adv, eps).into_data().iter::<f32>().collect();

        // A > 0: min(r, 1+ε)·A ; A < 0: max(r, 1-ε)·A
        let expected = [
            0.5_f32.min(1.2) * 2.0,
            1.0_f32.min(1.2) * 2.0,
            1.5_f32.min(1.2) * 2.0,
            0.5_f32.max(0.8) * -2.0,
            1.0_f32.max(0.8) * -2.0,
            1.5_f32.max(0.8) * -2.0,
        ];
        for (o, e) in out.iter().zip(expected) {
            assert!((o - e).abs() < 1e-6, "{o} vs {e}");
        }
    }

    #[test]
    fn test_clip_fraction_counts_out_of_range_ratios() {
        let device = NdArrayDevice::default();
        let ratio = Tensor::<NdArray, 1>::from_floats([0.5, 1.0, 1.1, 1.5], &device);
        assert!((clip_fraction(ratio, 0.2) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_act_does_not_touch_memory() {
        let mut agent = agent(small_config());

        let (action, value, log_prob) = agent.act(&[0.1, -0.2]);

        assert_eq!(action.len(), 2);
        assert!(value.is_finite());
        assert!(log_prob.is_finite());
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_act_log_prob_matches_actor_density() {
        let mut agent = agent(small_config());
        let state = [0.3_f32, 0.7];

        let (action, _, log_prob) = agent.act(&state);

        let actor = agent.actor().valid();
        let device = agent.device().clone();
        let dist = actor.distribution(Tensor::from_floats([state], &device));
        let expected: f32 = dist
            .log_prob(Tensor::from_floats([[action[0], action[1]]], &device))
            .into_scalar()
            .elem();

        assert!((log_prob - expected).abs() < 1e-4);
    }

    #[test]
    fn test_learn_below_batch_size_is_noop() {
        let mut agent = agent(small_config());
        fill(&mut agent, 3);

        let memory_before = agent.memory().clone();
        let actor_before = params(agent.actor());
        let critic_before = params(agent.critic());

        assert!(agent.learn().is_none());

        assert_eq!(agent.memory().len(), 3);
        assert_eq!(agent.memory().states(), memory_before.states());
        assert_eq!(agent.memory().actions(), memory_before.actions());
        assert_eq!(agent.memory().rewards(), memory_before.rewards());
        assert_eq!(agent.memory().values(), memory_before.values());
        assert_eq!(agent.memory().log_probs(), memory_before.log_probs());
        assert_eq!(params(agent.actor()), actor_before);
        assert_eq!(params(agent.critic()), critic_before);
    }

    #[test]
    fn test_learn_end_to_end_updates_both_networks_and_clears() {
        let mut agent = agent(small_config());
        fill(&mut agent, 4);

        let actor_before = params(agent.actor());
        let critic_before = params(agent.critic());

        let metrics = agent.learn().expect("4 transitions reach batch_size 4");

        assert_eq!(metrics.n_updates, 1);
        assert!(metrics.policy_loss.is_finite());
        assert!(metrics.value_loss.is_finite());
        assert!(agent.memory().is_empty());
        assert_ne!(params(agent.actor()), actor_before);
        assert_ne!(params(agent.critic()), critic_before);
    }

    #[test]
    fn test_entropy_metric_is_per_dimension_mean() {
        let config = PPOAgentConfig::new(2, 8)
            .with_hidden_size(16)
            .with_batch_size(4)
            .with_n_epochs(1);
        let mut agent = agent(config);
        for i in 0..4 {
            let x = i as f32 * 0.25;
            agent.store(vec![x, -x], vec![x; 8], x, 0.0, -1.0);
        }

        // One update, measured before the step: every dimension still has log σ = -0.5.
        let metrics = agent.learn().expect("4 transitions reach batch_size 4");
        let per_dimension = 0.5 + 0.5 * (2.0 * std::f32::consts::PI).ln() + INITIAL_LOG_STD;

        assert_eq!(metrics.n_updates, 1);
        assert!(
            (metrics.entropy - per_dimension).abs() < 1e-5,
            "entropy {} vs {}",
            metrics.entropy,
            per_dimension
        );
    }

    #[test]
    fn test_adam_epsilon() {
        assert_eq!(optimizer_config().epsilon, ADAM_EPSILON);
        assert_eq!(ADAM_EPSILON, 1e-8);
    }

    #[test]
    fn test_learn_runs_epochs_times_chunks_updates() {
        let config = small_config().with_n_epochs(3);
        let mut agent = agent(config);
        fill(&mut agent, 10);

        // 10 samples in chunks of 4 → 3 chunks per epoch
        let metrics = agent.learn().expect("enough data");
        assert_eq!(metrics.n_updates, 9);
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_buffer_accumulates_until_batch_size() {
        let mut agent = agent(small_config());

        fill(&mut agent, 2);
        assert!(agent.learn().is_none());
        fill(&mut agent, 2);
        assert_eq!(agent.memory().len(), 4);
        assert!(agent.learn().is_some());
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_learn_is_deterministic_for_a_seed() {
        let run = || {
            let mut agent = agent(small_config().with_seed(7).with_n_epochs(2));
            fill(&mut agent, 6);
            agent.learn();
            (params(agent.actor()), params(agent.critic()))
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_different_seeds_give_different_networks() {
        let a = agent(small_config().with_seed(1));
        let b = agent(small_config().with_seed(2));
        assert_ne!(params(a.actor()), params(b.actor()));
    }

    #[test]
    fn test_initial_log_std() {
        let agent = agent(small_config());
        let log_std: Vec<f32> = agent.actor().log_std().into_data().iter::<f32>().collect();
        assert_eq!(log_std, vec![-0.5, -0.5]);
    }

    #[test]
    fn test_config_defaults() {
        let config = PPOAgentConfig::new(100, 100);
        assert_eq!(config.hidden_size, 256);
        assert_eq!(config.lr, 3e-4);
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.gae_lambda, 0.95);
        assert_eq!(config.clip_epsilon, 0.2);
        assert_eq!(config.c1, 0.5);
        assert_eq!(config.c2, 0.01);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.n_epochs, 10);
        assert_eq!(config.action_std_init, 0.6);
        assert_eq!(config.max_grad_norm, 0.5);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ppo.json");

        let config = small_config().with_gamma(0.9);
        config.save(&path).unwrap();

        let loaded = PPOAgentConfig::load_file(&path).unwrap();
        assert_eq!(loaded.gamma, 0.9);
        assert_eq!(loaded.batch_size, 4);
    }

    #[test]
    fn test_config_missing_file_is_error() {
        let err = PPOAgentConfig::load_file("/nonexistent/ppo.json").unwrap_err();
        assert!(matches!(err, crate::Error::Config { .. }));
    }
}
