//! On-policy trajectory storage for PPO.
//!
//! Transitions are kept in five parallel sequences in insertion (temporal) order.
//! The buffer is never sampled across updates: `learn` consumes it and clears it.

use rand::{seq::SliceRandom, Rng};

/// Trajectory buffer of (state, action, reward, value, log_prob) tuples
#[derive(Clone, Debug)]
pub struct PPOMemory {
    states: Vec<Vec<f32>>,
    actions: Vec<Vec<f32>>,
    rewards: Vec<f32>,
    values: Vec<f32>,
    log_probs: Vec<f32>,
    batch_size: usize,
}

impl PPOMemory {
    pub fn new(batch_size: usize) -> Self {
        Self {
            states: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            values: Vec::new(),
            log_probs: Vec::new(),
            batch_size,
        }
    }

    /// Append one transition
    ///
    /// `value` is the critic estimate and `log_prob` the policy log-density at
    /// sampling time.
    pub fn store(&mut self, state: Vec<f32>, action: Vec<f32>, reward: f32, value: f32, log_prob: f32) {
        self.states.push(state);
        self.actions.push(action);
        self.rewards.push(reward);
        self.values.push(value);
        self.log_probs.push(log_prob);
    }

    /// Shuffle all indices once and cut them into contiguous chunks of `batch_size`
    ///
    /// The last chunk may be shorter.
    pub fn generate_batches<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec<usize>> {
        shuffled_batches(self.len(), self.batch_size, rng)
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
        self.values.clear();
        self.log_probs.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn states(&self) -> &[Vec<f32>] {
        &self.states
    }

    pub fn actions(&self) -> &[Vec<f32>] {
        &self.actions
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn log_probs(&self) -> &[f32] {
        &self.log_probs
    }
}

/// Random permutation of `0..n` split into contiguous chunks of `batch_size`
pub fn shuffled_batches<R: Rng + ?Sized>(n: usize, batch_size: usize, rng: &mut R) -> Vec<Vec<usize>> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    indices
        .chunks(batch_size.max(1))
        .map(<[usize]>::to_vec)
        .collect()
}
