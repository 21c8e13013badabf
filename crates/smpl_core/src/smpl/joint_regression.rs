use crate::common::{
    error::{check_dims, Result},
    metadata::SmplMetadata,
};
use burn::tensor::{backend::Backend, Tensor};

pub const COMPONENT: &str = "JointRegression";

#[derive(Clone, Debug)]
pub struct JointRegressionOutput<B: Backend> {
    /// Template plus shape and pose offsets, (N, V, 3)
    pub rest_shape: Tensor<B, 3>,
    /// (N, J, 3)
    pub joints: Tensor<B, 3>,
}

/// Template mesh and the sparse-in-practice map from vertices to joint locations.
#[derive(Clone, Debug)]
pub struct JointRegression<B: Backend> {
    /// (V, 3)
    pub verts_template: Tensor<B, 2>,
    /// (J, V)
    pub joint_regressor: Tensor<B, 2>,
}
impl<B: Backend> JointRegression<B> {
    /// # Errors
    /// Fails if the template or regressor do not match `metadata`
    pub fn new(verts_template: Tensor<B, 2>, joint_regressor: Tensor<B, 2>, metadata: &SmplMetadata) -> Result<Self> {
        check_dims(COMPONENT, "vertices_template", verts_template.dims(), [metadata.num_verts, 3])?;
        check_dims(COMPONENT, "joint_regressor", joint_regressor.dims(), [metadata.num_joints, metadata.num_verts])?;
        Ok(Self {
            verts_template,
            joint_regressor,
        })
    }
    pub fn num_verts(&self) -> usize {
        self.verts_template.dims()[0]
    }
    pub fn num_joints(&self) -> usize {
        self.joint_regressor.dims()[0]
    }

    /// Builds the rest shape and regresses joints from the template plus shape offsets only,
    /// so posing never changes where the joints sit.
    /// # Errors
    /// Fails if the two offset fields are not both (N, V, 3)
    pub fn regress(&self, shape_blend_shape: Tensor<B, 3>, pose_blend_shape: Tensor<B, 3>) -> Result<JointRegressionOutput<B>> {
        let [nr_batch, _, _] = shape_blend_shape.dims();
        let nr_verts = self.num_verts();
        check_dims(COMPONENT, "shape blend shape", shape_blend_shape.dims(), [nr_batch, nr_verts, 3])?;
        check_dims(COMPONENT, "pose blend shape", pose_blend_shape.dims(), [nr_batch, nr_verts, 3])?;

        let template = self.verts_template.clone().unsqueeze_dim::<3>(0).expand([nr_batch, nr_verts, 3]);
        let shaped = template + shape_blend_shape;
        let rest_shape = shaped.clone() + pose_blend_shape;
        let joints = self
            .joint_regressor
            .clone()
            .unsqueeze_dim::<3>(0)
            .repeat(&[nr_batch, 1, 1])
            .matmul(shaped);
        Ok(JointRegressionOutput { rest_shape, joints })
    }
}
