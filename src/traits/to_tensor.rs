use burn::{
    prelude::*,
    tensor::{backend::Backend, BasicOps},
};

/// A trait for converting host-side buffers to tensors
///
/// The agent keeps trajectories as plain `f32` vectors; these impls move them onto
/// the device, converting to the backend's element type on the way.
pub trait ToTensor<B: Backend, const D: usize, K: BasicOps<B>> {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, D, K>;
}

// Implementations

impl<B, K> ToTensor<B, 1, K> for &[f32]
where
    B: Backend,
    K: BasicOps<B>,
{
    #[inline]
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 1, K> {
        let data = TensorData::new(self.to_vec(), [self.len()]).convert::<K::Elem>();
        Tensor::from_data(data, device)
    }
}

impl<B, K> ToTensor<B, 2, K> for &[Vec<f32>]
where
    B: Backend,
    K: BasicOps<B>,
{
    /// Rows must all have the same length; the first row fixes the width.
    #[inline]
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2, K> {
        let rows = self.len();
        let cols = self.first().map_or(0, Vec::len);

        // Pre-allocate exact capacity to avoid reallocation
        let mut flat = Vec::with_capacity(rows * cols);
        for row in self {
            flat.extend_from_slice(row);
        }

        let data = TensorData::new(flat, [rows, cols]).convert::<K::Elem>();
        Tensor::from_data(data, device)
    }
}

impl<B: Backend> ToTensor<B, 1, Int> for &[usize] {
    #[inline]
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 1, Int> {
        let indices: Vec<i64> = self.iter().map(|&i| i as i64).collect();
        let data = TensorData::new(indices, [self.len()]).convert::<B::IntElem>();
        Tensor::from_data(data, device)
    }
}
