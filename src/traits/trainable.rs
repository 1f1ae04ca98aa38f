//! Trainable agent trait for the latent search loop
//!
//! This is the only surface the outer loop sees:
//! - `act` during rollouts
//! - `store` to hand a completed transition back
//! - `learn` once enough transitions have accumulated

/// Training metrics returned after each effective update
///
/// All losses are averaged over every mini-batch step of the update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingMetrics {
    /// Clipped-surrogate policy loss
    pub policy_loss: f32,

    /// Smooth-L1 critic loss against normalized rewards
    pub value_loss: f32,

    /// Mean policy entropy (higher means more exploration)
    pub entropy: f32,

    /// Approximate KL divergence from the sampling policy, E[old_log_prob - new_log_prob]
    pub approx_kl: f32,

    /// Fraction of probability ratios outside [1-ε, 1+ε]
    pub clip_fraction: f32,

    /// Mean actor gradient norm before clipping
    pub actor_grad_norm: f32,

    /// Mean critic gradient norm before clipping
    pub critic_grad_norm: f32,

    /// Number of gradient updates performed
    pub n_updates: usize,
}

/// An on-policy agent driven step by step by an external loop
pub trait TrainableAgent {
    /// Sample an action for `state`
    ///
    /// Returns (action, value estimate, log-probability of the action).
    /// Must not record anything; the caller decides what to `store`.
    fn act(&mut self, state: &[f32]) -> (Vec<f32>, f32, f32);

    /// Record one transition
    fn store(&mut self, state: Vec<f32>, action: Vec<f32>, reward: f32, value: f32, log_prob: f32);

    /// Train on the stored transitions
    ///
    /// Returns `None` without touching anything when too little data has been
    /// collected; otherwise consumes the stored transitions.
    fn learn(&mut self) -> Option<TrainingMetrics>;
}
