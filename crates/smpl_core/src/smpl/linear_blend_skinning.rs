use crate::common::{
    error::{check_dims, Result},
    metadata::SmplMetadata,
};
use burn::tensor::{backend::Backend, Tensor};

pub const COMPONENT: &str = "LinearBlendSkinning";

/// Skinning weights of every vertex over all joints, (V, J)
#[derive(Clone, Debug)]
pub struct LinearBlendSkinning<B: Backend> {
    pub lbs_weights: Tensor<B, 2>,
}
impl<B: Backend> LinearBlendSkinning<B> {
    /// # Errors
    /// Fails if the weights are not (V, J)
    pub fn new(lbs_weights: Tensor<B, 2>, metadata: &SmplMetadata) -> Result<Self> {
        check_dims(COMPONENT, "weights", lbs_weights.dims(), [metadata.num_verts, metadata.num_joints])?;
        Ok(Self { lbs_weights })
    }

    /// Blends the joint transforms per vertex and applies them to the rest shape
    /// # Errors
    /// Fails if the rest shape is not (N, V, 3) or the transforms are not (N, J, 4, 4)
    pub fn skin(&self, rest_shape: Tensor<B, 3>, transformations: Tensor<B, 4>) -> Result<Tensor<B, 3>> {
        let [nr_verts, nr_joints] = self.lbs_weights.dims();
        let [nr_batch, _, _] = rest_shape.dims();
        check_dims(COMPONENT, "rest shape", rest_shape.dims(), [nr_batch, nr_verts, 3])?;
        check_dims(COMPONENT, "transformations", transformations.dims(), [nr_batch, nr_joints, 4, 4])?;

        let per_vertex = self
            .lbs_weights
            .clone()
            .unsqueeze_dim::<3>(0)
            .repeat(&[nr_batch, 1, 1])
            .matmul(transformations.reshape([nr_batch, nr_joints, 16]))
            .reshape([nr_batch, nr_verts, 4, 4]);
        let posed = per_vertex.matmul(cart2homo(rest_shape).unsqueeze_dim::<4>(3)).squeeze::<3>(3);
        Ok(homo2cart(posed))
    }
}

/// (N, V, 3) -> (N, V, 4) with w = 1
pub fn cart2homo<B: Backend>(points: Tensor<B, 3>) -> Tensor<B, 3> {
    let [nr_batch, nr_points, _] = points.dims();
    let device = points.device();
    Tensor::cat(vec![points, Tensor::ones([nr_batch, nr_points, 1], &device)], 2)
}

/// (N, V, 4) -> (N, V, 3), dividing by w
pub fn homo2cart<B: Backend>(points: Tensor<B, 3>) -> Tensor<B, 3> {
    let [nr_batch, nr_points, _] = points.dims();
    let w = points.clone().slice([0..nr_batch, 0..nr_points, 3..4]);
    points.slice([0..nr_batch, 0..nr_points, 0..3]).div(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::SmplError;
    use burn::backend::NdArray;
    use smpl_utils::bshare::tensor_to_data_float;

    type B = NdArray;

    fn translation(x: f32, y: f32, z: f32) -> [[f32; 4]; 4] {
        [[1.0, 0.0, 0.0, x], [0.0, 1.0, 0.0, y], [0.0, 0.0, 1.0, z], [0.0, 0.0, 0.0, 1.0]]
    }

    #[test]
    fn test_weights_blend_translations() {
        let device = Default::default();
        let metadata = SmplMetadata::new(2, 2, 1, 0);
        let weights = Tensor::<B, 2>::from_floats([[1.0, 0.0], [0.5, 0.5]], &device);
        let stage = LinearBlendSkinning::new(weights, &metadata).unwrap();
        let rest = Tensor::<B, 3>::from_floats([[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]], &device);
        let transforms = Tensor::<B, 4>::from_floats([[translation(1.0, 0.0, 0.0), translation(0.0, 2.0, 0.0)]], &device);
        let verts = tensor_to_data_float(&stage.skin(rest, transforms).unwrap()).unwrap();
        assert_eq!(verts, vec![1.0, 0.0, 0.0, 1.5, 2.0, 1.0]);
    }

    #[test]
    fn test_identity_transforms_keep_rest_shape() {
        let device = Default::default();
        let metadata = SmplMetadata::new(3, 2, 1, 0);
        let weights = Tensor::<B, 2>::from_floats([[0.2, 0.8], [1.0, 0.0], [0.5, 0.5]], &device);
        let stage = LinearBlendSkinning::new(weights, &metadata).unwrap();
        let rest = Tensor::<B, 3>::from_floats([[[0.1, 0.2, 0.3], [-1.0, 0.0, 2.0], [4.0, 5.0, 6.0]]], &device).repeat(&[2, 1, 1]);
        let transforms = Tensor::<B, 2>::eye(4, &device).reshape([1, 1, 4, 4]).repeat(&[2, 2, 1, 1]);
        let verts = tensor_to_data_float(&stage.skin(rest.clone(), transforms).unwrap()).unwrap();
        for (v, r) in verts.iter().zip(tensor_to_data_float(&rest).unwrap()) {
            assert!((v - r).abs() < 1e-6);
        }
    }

    #[test]
    fn test_transform_count_must_match_weights() {
        let device = Default::default();
        let metadata = SmplMetadata::new(1, 2, 1, 0);
        let stage = LinearBlendSkinning::new(Tensor::<B, 2>::ones([1, 2], &device), &metadata).unwrap();
        let rest = Tensor::<B, 3>::zeros([1, 1, 3], &device);
        let transforms = Tensor::<B, 4>::zeros([1, 3, 4, 4], &device);
        let err = stage.skin(rest, transforms).unwrap_err();
        assert!(matches!(err, SmplError::Shape { component: COMPONENT, .. }));
    }

    #[test]
    fn test_homogeneous_roundtrip() {
        let device = Default::default();
        let points = Tensor::<B, 3>::from_floats([[[1.0, 2.0, 3.0]]], &device);
        let homo = cart2homo(points);
        assert_eq!(tensor_to_data_float(&homo).unwrap(), vec![1.0, 2.0, 3.0, 1.0]);
        let scaled = homo.mul_scalar(2.0);
        assert_eq!(tensor_to_data_float(&homo2cart(scaled)).unwrap(), vec![1.0, 2.0, 3.0]);
    }
}
