//! Latent-space search driven by a trainable agent
//!
//! The agent's state is a latent vector `z`. Each step it proposes an action `a`
//! of the same dimension and the latent moves to `z' = α·z + (1 − α)·a`. The images
//! generated from `z'` and from `a` are scored by the target classifier and turned
//! into a reward by a caller-supplied [`RewardFn`].
//!
//! Every `eval_interval` episodes (and after the last one) the current policy is
//! rolled out from a fresh latent; the softmax probability of the target label on
//! the final image is the score. A score at least as good as the best so far
//! replaces it and triggers the snapshot hook.

use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    config::Config,
    tensor::{activation, Tensor},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::traits::{ToTensor, TrainableAgent};

/// Backend for the host-side scoring of classifier logits
type ScoreBackend = NdArray<f32>;

/// Maps a latent vector to an image
pub trait Generator {
    type Image;

    fn generate(&self, latent: &[f32]) -> Self::Image;
}

/// The black-box classifier under attack
pub trait TargetClassifier<I> {
    /// Unnormalized class scores for `image`
    fn logits(&self, image: &I) -> Vec<f32>;
}

/// Per-step reward from the logits of the next-state image and of the action image
pub trait RewardFn {
    fn reward(&self, state_logits: &[f32], action_logits: &[f32], label: usize) -> f32;
}

impl<F> RewardFn for F
where
    F: Fn(&[f32], &[f32], usize) -> f32,
{
    fn reward(&self, state_logits: &[f32], action_logits: &[f32], label: usize) -> f32 {
        self(state_logits, action_logits, label)
    }
}

/// Configuration for [`LatentSearch`]
#[derive(Config, Debug)]
pub struct SearchConfig {
    /// Weight of the current latent in `z' = α·z + (1 − α)·a`
    pub alpha: f32,
    /// Target class index
    pub label: usize,
    /// Latent dimension; must match the agent's state and action sizes
    #[config(default = 100)]
    pub z_dim: usize,
    #[config(default = 40000)]
    pub max_episodes: usize,
    /// Steps per episode and per evaluation rollout
    #[config(default = 5)]
    pub max_step: usize,
    /// Name of the attacked classifier, used to key snapshots
    #[config(default = "String::from(\"VGG16\")")]
    pub model_name: String,
    #[config(default = 100)]
    pub eval_interval: usize,
    /// Seed for the latent draws (the agent keeps its own RNG)
    #[config(default = 0)]
    pub seed: u64,
}

/// Best result found by [`LatentSearch::run`]
#[derive(Debug, Clone)]
pub struct SearchOutcome<I> {
    /// Softmax probability of the target label on `best_image`
    pub best_score: f32,
    /// Final latent of the best evaluation rollout
    pub best_latent: Option<Vec<f32>>,
    pub best_image: Option<I>,
    /// Episodes run
    pub episodes: usize,
    /// Episodes after which `learn` performed an update
    pub updates: usize,
}

/// Outer episode loop over a generator's latent space
pub struct LatentSearch<G, C, R> {
    config: SearchConfig,
    generator: G,
    classifier: C,
    reward: R,
    rng: StdRng,
}

impl<G, C, R> LatentSearch<G, C, R>
where
    G: Generator,
    C: TargetClassifier<G::Image>,
    R: RewardFn,
{
    pub fn new(config: SearchConfig, generator: G, classifier: C, reward: R) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            generator,
            classifier,
            reward,
            rng,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run `max_episodes` episodes, training `agent` after each one.
    ///
    /// `on_best` is called with the agent, the new best score and its image every
    /// time an evaluation ties or beats the best score; an error from it aborts
    /// the search.
    pub fn run<A, H>(&mut self, agent: &mut A, mut on_best: H) -> crate::Result<SearchOutcome<G::Image>>
    where
        A: TrainableAgent,
        H: FnMut(&A, f32, &G::Image) -> crate::Result<()>,
    {
        let cfg = &self.config;
        tracing::info!(label = cfg.label, alpha = cfg.alpha, model = %cfg.model_name, "starting latent search");

        let mut outcome = SearchOutcome {
            best_score: 0.0,
            best_latent: None,
            best_image: None,
            episodes: 0,
            updates: 0,
        };

        for episode in 1..=self.config.max_episodes {
            let episode_reward = self.run_episode(agent);
            outcome.episodes = episode;

            if let Some(metrics) = agent.learn() {
                outcome.updates += 1;
                tracing::debug!(
                    episode,
                    episode_reward,
                    policy_loss = metrics.policy_loss,
                    value_loss = metrics.value_loss,
                    "agent updated"
                );
            }

            let interval = self.config.eval_interval.max(1);
            if episode % interval != 0 && episode != self.config.max_episodes {
                continue;
            }

            let (latent, image) = self.rollout(agent);
            let score = label_probability(&self.classifier.logits(&image), self.config.label);

            if score >= outcome.best_score {
                outcome.best_score = score;
                on_best(&*agent, score, &image)?;
                outcome.best_latent = Some(latent);
                outcome.best_image = Some(image);
            }

            tracing::info!(
                "Episodes {}/{}, Confidence score: {:.4}, Best score: {:.4}",
                episode,
                self.config.max_episodes,
                score,
                outcome.best_score
            );
        }

        Ok(outcome)
    }

    /// One training episode; returns the summed reward.
    fn run_episode<A: TrainableAgent>(&mut self, agent: &mut A) -> f32 {
        let alpha = self.config.alpha;
        let label = self.config.label;
        let mut z = self.sample_latent();
        let mut total = 0.0;

        for _ in 0..self.config.max_step {
            let (action, value, log_prob) = agent.act(&z);
            let next = step_latent(&z, &action, alpha);

            let state_logits = self.classifier.logits(&self.generator.generate(&next));
            let action_logits = self.classifier.logits(&self.generator.generate(&action));
            let reward = self.reward.reward(&state_logits, &action_logits, label);

            agent.store(z, action, reward, value, log_prob);
            total += reward;
            z = next;
        }

        total
    }

    /// Evaluation rollout from a fresh latent; nothing is stored.
    fn rollout<A: TrainableAgent>(&mut self, agent: &mut A) -> (Vec<f32>, G::Image) {
        let mut z = self.sample_latent();
        for _ in 0..self.config.max_step {
            let (action, _, _) = agent.act(&z);
            z = step_latent(&z, &action, self.config.alpha);
        }
        let image = self.generator.generate(&z);
        (z, image)
    }

    fn sample_latent(&mut self) -> Vec<f32> {
        (0..self.config.z_dim)
            .map(|_| self.rng.sample::<f32, _>(StandardNormal))
            .collect()
    }
}

/// `α·z + (1 − α)·a`, elementwise
pub fn step_latent(z: &[f32], action: &[f32], alpha: f32) -> Vec<f32> {
    z.iter()
        .zip(action)
        .map(|(z, a)| alpha * z + (1.0 - alpha) * a)
        .collect()
}

/// Class probabilities for one logit vector
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let logits: Tensor<ScoreBackend, 1> = logits.to_tensor(&NdArrayDevice::default());
    activation::softmax(logits, 0).into_data().iter::<f32>().collect()
}

/// Softmax probability of `label`, or 0 when the label is out of range
pub fn label_probability(logits: &[f32], label: usize) -> f32 {
    softmax(logits).get(label).copied().unwrap_or(0.0)
}
