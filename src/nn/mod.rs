//! Neural network building blocks for the PPO agent

pub mod clip;
pub mod gaussian;
pub mod mlp;
pub mod orthogonal;
pub mod policy;

pub use clip::{clip_grad_norm, grad_norm};
pub use gaussian::DiagGaussian;
pub use mlp::{MLPConfig, MLP};
pub use orthogonal::{OrthogonalLinear, OrthogonalLinearConfig};
pub use policy::{ActorConfig, CriticConfig, GaussianActor, ValueCritic};
