use ndarray as nd;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Shape parameters for a batch of bodies, (N, shape_space_dim)
#[derive(Clone, Debug)]
pub struct Betas {
    pub betas: nd::Array2<f32>,
}
impl Default for Betas {
    fn default() -> Self {
        Self::new_empty(1, super::metadata::SHAPE_SPACE_DIM)
    }
}
impl Betas {
    pub fn new(betas: nd::Array2<f32>) -> Self {
        Self { betas }
    }
    pub fn new_empty(batch_size: usize, num_betas: usize) -> Self {
        Self {
            betas: nd::Array2::<f32>::zeros((batch_size, num_betas)),
        }
    }
    /// Uniform samples in `[0, scale)`, reproducible for a given seed
    pub fn new_random(batch_size: usize, num_betas: usize, scale: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let betas = nd::Array2::from_shape_simple_fn((batch_size, num_betas), || scale * rng.random::<f32>());
        Self { betas }
    }
    pub fn batch_size(&self) -> usize {
        self.betas.nrows()
    }
}
