/// Multi-Layer Perceptron (MLP) - feedforward trunk shared by the policy and value networks
///
/// Every layer is an [`OrthogonalLinear`], so a network built from a seeded RNG is
/// reproducible across runs and backends.

use burn::{
    module::Module,
    prelude::*,
    tensor::{activation::relu, backend::Backend},
};
use rand::Rng;

use super::orthogonal::{OrthogonalLinear, OrthogonalLinearConfig};

/// Configuration for Multi-Layer Perceptron
#[derive(Config, Debug)]
pub struct MLPConfig {
    /// Input dimension
    pub input_dim: usize,
    /// Hidden layer dimensions (e.g., [256, 256] for two hidden layers of 256 units each)
    pub hidden_layers: Vec<usize>,
    /// Output dimension
    pub output_dim: usize,
    /// Orthogonal init gain for every layer
    #[config(default = 1.0)]
    pub gain: f64,
}

/// Multi-Layer Perceptron implementation
///
/// Hidden layers use ReLU activation, the output layer is linear.
#[derive(Module, Debug)]
pub struct MLP<B: Backend> {
    layers: Vec<OrthogonalLinear<B>>,
}

impl MLPConfig {
    /// Initialize the MLP, drawing all weights from `rng`
    pub fn init<B: Backend, R: Rng + ?Sized>(&self, device: &B::Device, rng: &mut R) -> MLP<B> {
        let dims: Vec<usize> = std::iter::once(self.input_dim)
            .chain(self.hidden_layers.iter().copied())
            .chain(std::iter::once(self.output_dim))
            .collect();

        let layers = dims
            .windows(2)
            .map(|pair| {
                OrthogonalLinearConfig::new(pair[0], pair[1])
                    .with_gain(self.gain)
                    .init(device, &mut *rng)
            })
            .collect();

        MLP { layers }
    }
}

impl<B: Backend> MLP<B> {
    /// `[batch, input_dim]` → `[batch, output_dim]`
    ///
    /// Applies ReLU after every layer except the last.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let last = self.layers.len() - 1;

        self.layers
            .iter()
            .enumerate()
            .fold(input, |x, (i, layer)| {
                let x = layer.forward(x);
                if i < last {
                    relu(x)
                } else {
                    x
                }
            })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use rand::{rngs::StdRng, SeedableRng};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_mlp_forward_2d() {
        let device = NdArrayDevice::default();
        let mut rng = StdRng::seed_from_u64(0);

        // 4 → [64, 64] → 2
        let mlp = MLPConfig::new(4, vec![64, 64], 2).init::<TestBackend, _>(&device, &mut rng);
        assert_eq!(mlp.num_layers(), 3);

        let input = Tensor::<TestBackend, 2>::random(
            [8, 4],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let output = mlp.forward(input);

        assert_eq!(output.shape().dims, [8, 2]);
    }

    #[test]
    fn test_mlp_no_hidden_layers() {
        let device = NdArrayDevice::default();
        let mut rng = StdRng::seed_from_u64(1);

        // Direct connection: 4 → 2
        let mlp = MLPConfig::new(4, vec![], 2).init::<TestBackend, _>(&device, &mut rng);
        assert_eq!(mlp.num_layers(), 1);

        let input = Tensor::<TestBackend, 2>::ones([1, 4], &device);
        assert_eq!(mlp.forward(input).shape().dims, [1, 2]);
    }

    #[test]
    fn test_mlp_zero_input_gives_zero_output() {
        // Zero biases and ReLU(0) = 0 propagate a zero input straight through.
        let device = NdArrayDevice::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mlp = MLPConfig::new(3, vec![16, 16], 2).init::<TestBackend, _>(&device, &mut rng);

        let output = mlp.forward(Tensor::<TestBackend, 2>::zeros([2, 3], &device));
        let values: Vec<f32> = output.into_data().iter::<f32>().collect();
        assert!(values.iter().all(|v| *v == 0.0));
    }
}
