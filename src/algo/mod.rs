/// Proximal Policy Optimization
pub mod ppo;

pub use ppo::{PPOAgent, PPOAgentConfig};
