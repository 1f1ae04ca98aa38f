//! Proximal Policy Optimization for latent-space search.
//!
//! The crate is organised leaf-first:
//!
//! - [`nn`]: orthogonally initialised layers, the diagonal Gaussian policy
//!   distribution, the actor and critic networks and gradient-norm clipping
//! - [`memory`]: the on-policy trajectory buffer
//! - [`algo::ppo`]: the agent (`act`, `store`, `learn`)
//! - [`checkpoint`]: actor snapshots keyed by model name, label and step size
//! - [`search`]: the outer loop that drives the agent through a generator's
//!   latent space against a target classifier
//!
//! # Usage Example
//!
//! ```ignore
//! use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
//! use latent_ppo::algo::ppo::{PPOAgent, PPOAgentConfig};
//!
//! type B = Autodiff<NdArray>;
//!
//! let config = PPOAgentConfig::new(100, 100).with_batch_size(64);
//! let mut agent = PPOAgent::<B>::new(config, NdArrayDevice::default());
//!
//! let (action, value, log_prob) = agent.act(&state);
//! agent.store(state, action, reward, value, log_prob);
//! if let Some(metrics) = agent.learn() {
//!     println!("policy loss: {}", metrics.policy_loss);
//! }
//! ```

pub mod algo;
pub mod checkpoint;
pub mod error;
pub mod memory;
pub mod nn;
pub mod search;
pub mod traits;

pub use error::{Error, Result};
