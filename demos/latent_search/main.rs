//! Latent search against a toy generator and classifier.
//!
//! The generator is a fixed random projection of the latent and the classifier a
//! fixed random linear map, so the run finishes in seconds on the CPU backend.
//!
//! ```text
//! RUST_LOG=info cargo run --example latent_search
//! ```

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use latent_ppo::{
    algo::ppo::{PPOAgent, PPOAgentConfig},
    checkpoint::{ActorSnapshots, SnapshotKey},
    search::{softmax, Generator, LatentSearch, SearchConfig, TargetClassifier},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

type Backend = Autodiff<NdArray<f32>>;

const Z_DIM: usize = 16;
const PIXELS: usize = 32;
const CLASSES: usize = 10;

/// Row-major `rows × cols` matrix with entries in [-scale, scale]
fn random_matrix(rows: usize, cols: usize, scale: f32, rng: &mut StdRng) -> Vec<f32> {
    (0..rows * cols).map(|_| rng.gen_range(-scale..scale)).collect()
}

fn matvec(matrix: &[f32], x: &[f32]) -> Vec<f32> {
    matrix
        .chunks(x.len())
        .map(|row| row.iter().zip(x).map(|(w, v)| w * v).sum())
        .collect()
}

struct ProjectionGenerator {
    weights: Vec<f32>,
}

impl Generator for ProjectionGenerator {
    type Image = Vec<f32>;

    fn generate(&self, latent: &[f32]) -> Vec<f32> {
        matvec(&self.weights, latent).into_iter().map(f32::tanh).collect()
    }
}

struct LinearClassifier {
    weights: Vec<f32>,
}

impl TargetClassifier<Vec<f32>> for LinearClassifier {
    fn logits(&self, image: &Vec<f32>) -> Vec<f32> {
        matvec(&self.weights, image)
    }
}

/// Log-confidence of both images plus the log-margin of the target over the
/// runner-up on the next-state image.
fn margin_reward(state_logits: &[f32], action_logits: &[f32], label: usize) -> f32 {
    let state = softmax(state_logits);
    let action = softmax(action_logits);

    let runner_up = state
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label)
        .map(|(_, p)| *p)
        .fold(0.0, f32::max);
    let margin = (state[label] - runner_up).max(1e-7).ln();

    2.0 * state[label].ln() + 2.0 * action[label].ln() + 8.0 * margin
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = StdRng::seed_from_u64(0);
    let generator = ProjectionGenerator {
        weights: random_matrix(PIXELS, Z_DIM, 0.5, &mut rng),
    };
    let classifier = LinearClassifier {
        weights: random_matrix(CLASSES, PIXELS, 1.0, &mut rng),
    };

    let agent_config = PPOAgentConfig::new(Z_DIM, Z_DIM)
        .with_hidden_size(64)
        .with_batch_size(20)
        .with_n_epochs(4);
    let mut agent = PPOAgent::<Backend>::new(agent_config, NdArrayDevice::default());

    let search_config = SearchConfig::new(0.5, 3)
        .with_z_dim(Z_DIM)
        .with_max_episodes(400)
        .with_eval_interval(50)
        .with_model_name("toy".to_string());

    let snapshots = ActorSnapshots::new(std::env::temp_dir().join("latent_search"));
    let key = SnapshotKey::new(
        search_config.model_name.clone(),
        search_config.label,
        search_config.alpha,
    );

    let mut search = LatentSearch::new(search_config, generator, classifier, margin_reward);
    let outcome = search.run(&mut agent, |agent, score, _image| {
        let path = snapshots.save(agent.actor(), &key)?;
        tracing::info!(score, path = %path.display(), "new best");
        Ok(())
    })?;

    tracing::info!(
        best_score = outcome.best_score,
        episodes = outcome.episodes,
        updates = outcome.updates,
        "search finished"
    );
    Ok(())
}
