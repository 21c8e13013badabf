use burn::{prelude::Backend, tensor::Tensor};

/// Everything one forward pass produces. Shapes are for a batch of N bodies
/// on a model with V vertices and J joints. This is generic over burn backend
#[derive(Clone, Debug)]
pub struct SmplOutput<B: Backend> {
    /// (N, V, 3)
    pub shape_blend_shape: Tensor<B, 3>,
    /// (N, V, 3)
    pub pose_blend_shape: Tensor<B, 3>,
    /// (N, J, 3, 3)
    pub pose_rot: Tensor<B, 4>,
    /// (N, J, 3, 3)
    pub rest_pose_rot: Tensor<B, 4>,
    /// Template plus both blend shapes, (N, V, 3)
    pub rest_shape: Tensor<B, 3>,
    /// Joints regressed from the shaped template, (N, J, 3)
    pub joints: Tensor<B, 3>,
    /// (N, J, 3)
    pub posed_joints: Tensor<B, 3>,
    /// Rest-pose relative joint transforms, (N, J, 4, 4)
    pub transformations: Tensor<B, 4>,
    /// Skinned vertices, (N, V, 3)
    pub verts: Tensor<B, 3>,
    /// Sum of the blend shapes and the extra offsets if any were given, (N, V, 3)
    pub displacement: Tensor<B, 3>,
}
impl<B: Backend> SmplOutput<B> {
    pub fn batch_size(&self) -> usize {
        self.verts.dims()[0]
    }
}
