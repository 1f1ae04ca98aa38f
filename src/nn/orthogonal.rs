//! Dense layer with orthogonal weight initialisation and zero bias.
//!
//! The weight matrix is drawn from a standard normal using the caller's RNG and
//! orthonormalised on the host with modified Gram-Schmidt, so two layers built
//! from identically seeded RNGs are bit-identical on any backend.
//!
//! # Gain Values
//!
//! - 1.0: linear / identity (used by the policy and value networks)
//! - sqrt(2) ≈ 1.41: ReLU

use burn::{
    module::{Module, Param},
    prelude::*,
};
use rand::Rng;
use rand_distr::StandardNormal;

/// Configuration for [`OrthogonalLinear`].
#[derive(Config, Debug)]
pub struct OrthogonalLinearConfig {
    /// Number of input features
    pub d_input: usize,
    /// Number of output features
    pub d_output: usize,
    /// Scale applied to the orthonormal matrix
    #[config(default = 1.0)]
    pub gain: f64,
}

impl OrthogonalLinearConfig {
    /// Initialise the layer, drawing the random matrix from `rng`.
    pub fn init<B: Backend, R: Rng + ?Sized>(
        &self,
        device: &B::Device,
        rng: &mut R,
    ) -> OrthogonalLinear<B> {
        let weight = orthogonal_matrix(self.d_output, self.d_input, self.gain, rng);
        let weight = Tensor::<B, 2>::from_data(
            TensorData::new(weight, [self.d_output, self.d_input]),
            device,
        );

        OrthogonalLinear {
            weight: Param::from_tensor(weight),
            bias: Param::from_tensor(Tensor::zeros([self.d_output], device)),
        }
    }
}

/// Linear layer `y = x·Wᵀ + b` with `W` of shape `[d_output, d_input]`.
#[derive(Module, Debug)]
pub struct OrthogonalLinear<B: Backend> {
    pub weight: Param<Tensor<B, 2>>,
    pub bias: Param<Tensor<B, 1>>,
}

impl<B: Backend> OrthogonalLinear<B> {
    /// `[batch, d_input]` → `[batch, d_output]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        input.matmul(self.weight.val().transpose()) + self.bias.val().unsqueeze_dim(0)
    }
}

/// Row-major `rows × cols` matrix with orthonormal rows (wide) or columns (tall), scaled by `gain`.
pub fn orthogonal_matrix<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    gain: f64,
    rng: &mut R,
) -> Vec<f32> {
    let n_vectors = rows.min(cols);
    let len = rows.max(cols);
    let basis = orthonormal_basis(n_vectors, len, rng);

    let mut out = vec![0.0_f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            // Wide matrices hold the basis in their rows, tall ones in their columns.
            let v = if rows <= cols { basis[r][c] } else { basis[c][r] };
            out[r * cols + c] = (v * gain) as f32;
        }
    }
    out
}

fn orthonormal_basis<R: Rng + ?Sized>(n: usize, len: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(n);

    while basis.len() < n {
        let mut v: Vec<f64> = (0..len).map(|_| rng.sample(StandardNormal)).collect();

        for u in &basis {
            let proj: f64 = v.iter().zip(u).map(|(a, b)| a * b).sum();
            v.iter_mut().zip(u).for_each(|(a, b)| *a -= proj * b);
        }

        let norm = v.iter().map(|a| a * a).sum::<f64>().sqrt();
        // Linearly dependent draw: discard and sample again.
        if norm < 1e-10 {
            continue;
        }
        v.iter_mut().for_each(|a| *a /= norm);
        basis.push(v);
    }

    basis
}
