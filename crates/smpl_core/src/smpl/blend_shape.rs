use crate::common::{
    error::{check_dims, Result, SmplError},
    metadata::SmplMetadata,
};
use burn::tensor::{backend::Backend, Tensor};
use smpl_utils::numerical::batch_rodrigues;

pub const COMPONENT: &str = "BlendShape";

/// Per-vertex offsets coming from the shape and pose bases, together with the
/// rotation matrices that the kinematic chain reuses.
#[derive(Clone, Debug)]
pub struct BlendShapeOutput<B: Backend> {
    pub shape_blend_shape: Tensor<B, 3>,
    pub pose_blend_shape: Tensor<B, 3>,
    pub pose_rot: Tensor<B, 4>,
    pub rest_pose_rot: Tensor<B, 4>,
}

/// Holds the shape and pose bases already flattened for a single matmul each.
#[derive(Clone, Debug)]
pub struct BlendShape<B: Backend> {
    pub device: B::Device,
    /// (K, V*3)
    pub shape_dirs: Tensor<B, 2>,
    /// (P, V*3)
    pub pose_dirs: Tensor<B, 2>,
    pub num_verts: usize,
    pub num_joints: usize,
}
impl<B: Backend> BlendShape<B> {
    /// `shape_dirs` is (V, 3, K) and `pose_dirs` is (V, 3, P) as stored in the model assets
    /// # Errors
    /// Fails if the bases do not match `metadata`
    pub fn new(shape_dirs: Tensor<B, 3>, pose_dirs: Tensor<B, 3>, metadata: &SmplMetadata) -> Result<Self> {
        let num_verts = metadata.num_verts;
        check_dims(COMPONENT, "shape_blend_shapes", shape_dirs.dims(), [num_verts, 3, metadata.shape_space_dim])?;
        check_dims(COMPONENT, "pose_blend_shapes", pose_dirs.dims(), [num_verts, 3, metadata.num_pose_blend_shapes])?;
        if metadata.num_pose_blend_shapes != metadata.num_joints.saturating_sub(1) * 9 {
            return Err(SmplError::shape(
                COMPONENT,
                format!(
                    "{} pose blend shapes do not match {} joints",
                    metadata.num_pose_blend_shapes, metadata.num_joints
                ),
            ));
        }
        let device = shape_dirs.device();
        let shape_dirs = shape_dirs.reshape([num_verts * 3, metadata.shape_space_dim]).transpose();
        let pose_dirs = pose_dirs.reshape([num_verts * 3, metadata.num_pose_blend_shapes]).transpose();
        Ok(Self {
            device,
            shape_dirs,
            pose_dirs,
            num_verts,
            num_joints: metadata.num_joints,
        })
    }

    pub fn shape_space_dim(&self) -> usize {
        self.shape_dirs.dims()[0]
    }

    /// Linear combination of the shape basis, (N, K) -> (N, V, 3)
    /// # Errors
    /// Fails if beta does not have K columns
    pub fn shape_blend(&self, beta: Tensor<B, 2>) -> Result<Tensor<B, 3>> {
        let [nr_batch, nr_betas] = beta.dims();
        check_dims(COMPONENT, "beta", [nr_betas], [self.shape_space_dim()])?;
        Ok(beta.matmul(self.shape_dirs.clone()).reshape([nr_batch, self.num_verts, 3]))
    }

    /// Rotation matrices for `theta` and for the rest pose. A missing rest pose is all identity.
    /// # Errors
    /// Fails if either pose is not (N, J, 3)
    pub fn pose_rotations(&self, theta: Tensor<B, 3>, rest_theta: Option<Tensor<B, 3>>) -> Result<(Tensor<B, 4>, Tensor<B, 4>)> {
        let [nr_batch, _, _] = theta.dims();
        check_dims(COMPONENT, "theta", theta.dims(), [nr_batch, self.num_joints, 3])?;
        let rest_pose_rot = match rest_theta {
            Some(rest_theta) => {
                check_dims(COMPONENT, "rest theta", rest_theta.dims(), [nr_batch, self.num_joints, 3])?;
                batch_rodrigues(rest_theta)
            }
            None => Tensor::<B, 2>::eye(3, &self.device)
                .reshape([1, 1, 3, 3])
                .repeat(&[nr_batch, self.num_joints, 1, 1]),
        };
        Ok((batch_rodrigues(theta), rest_pose_rot))
    }

    /// Pose-dependent offsets from the rotation difference of every non-root joint
    /// # Errors
    /// Fails if the rotation stacks disagree in shape
    pub fn pose_blend(&self, pose_rot: Tensor<B, 4>, rest_pose_rot: Tensor<B, 4>) -> Result<Tensor<B, 3>> {
        let [nr_batch, nr_joints, _, _] = pose_rot.dims();
        check_dims(COMPONENT, "pose rotations", pose_rot.dims(), [nr_batch, self.num_joints, 3, 3])?;
        check_dims(COMPONENT, "rest pose rotations", rest_pose_rot.dims(), [nr_batch, nr_joints, 3, 3])?;
        if nr_joints == 1 {
            return Ok(Tensor::zeros([nr_batch, self.num_verts, 3], &self.device));
        }
        //the root joint is left out of the pose feature
        let pose_feature = unroll(pose_rot).slice([0..nr_batch, 9..nr_joints * 9]);
        let rest_feature = unroll(rest_pose_rot).slice([0..nr_batch, 9..nr_joints * 9]);
        Ok((pose_feature - rest_feature)
            .matmul(self.pose_dirs.clone())
            .reshape([nr_batch, self.num_verts, 3]))
    }

    /// Runs the whole stage. With `enable_pose_blend` off the pose offsets are zeros
    /// # Errors
    /// Fails on any input shape mismatch, before any work is done
    pub fn blend(
        &self,
        beta: Tensor<B, 2>,
        theta: Tensor<B, 3>,
        rest_theta: Option<Tensor<B, 3>>,
        enable_pose_blend: bool,
    ) -> Result<BlendShapeOutput<B>> {
        let [nr_batch, nr_betas] = beta.dims();
        check_dims(COMPONENT, "beta", [nr_betas], [self.shape_space_dim()])?;
        check_dims(COMPONENT, "theta", theta.dims(), [nr_batch, self.num_joints, 3])?;
        if let Some(rest_theta) = &rest_theta {
            check_dims(COMPONENT, "rest theta", rest_theta.dims(), [nr_batch, self.num_joints, 3])?;
        }

        let shape_blend_shape = self.shape_blend(beta)?;
        let (pose_rot, rest_pose_rot) = self.pose_rotations(theta, rest_theta)?;
        let pose_blend_shape = if enable_pose_blend {
            self.pose_blend(pose_rot.clone(), rest_pose_rot.clone())?
        } else {
            Tensor::zeros([nr_batch, self.num_verts, 3], &self.device)
        };
        Ok(BlendShapeOutput {
            shape_blend_shape,
            pose_blend_shape,
            pose_rot,
            rest_pose_rot,
        })
    }
}

/// Flattens (N, J, 3, 3) rotations to (N, J*9) in row-major order per joint
pub fn unroll<B: Backend>(rot: Tensor<B, 4>) -> Tensor<B, 2> {
    let [nr_batch, nr_joints, _, _] = rot.dims();
    rot.reshape([nr_batch, nr_joints * 9])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;
    use smpl_utils::bshare::tensor_to_data_float;

    type B = NdArray;

    // 2 verts, 2 joints, 2 betas; shape basis k moves vertex k along x
    fn stage() -> BlendShape<B> {
        let device = Default::default();
        let metadata = SmplMetadata::new(2, 2, 2, 0);
        let mut shape = vec![0.0f32; 2 * 3 * 2];
        shape[0] = 1.0; // v0.x, beta 0
        shape[3 * 2 + 1] = 1.0; // v1.x, beta 1
        let mut pose = vec![0.0f32; 2 * 3 * 9];
        pose[0] = 1.0; // v0.x, first rotation entry of joint 1
        let shape_dirs = Tensor::<B, 3>::from_data(TensorData::new(shape, [2, 3, 2]), &device);
        let pose_dirs = Tensor::<B, 3>::from_data(TensorData::new(pose, [2, 3, 9]), &device);
        BlendShape::new(shape_dirs, pose_dirs, &metadata).unwrap()
    }

    #[test]
    fn test_shape_blend_combines_basis() {
        let stage = stage();
        let beta = Tensor::<B, 2>::from_floats([[2.0, 3.0]], &stage.device);
        let disp = tensor_to_data_float(&stage.shape_blend(beta).unwrap()).unwrap();
        assert_eq!(disp, vec![2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rest_pose_gives_zero_pose_offsets() {
        let stage = stage();
        let beta = Tensor::<B, 2>::zeros([3, 2], &stage.device);
        let theta = Tensor::<B, 3>::from_floats([[[0.1, 0.2, 0.3], [0.4, -0.5, 0.6]]], &stage.device).repeat(&[3, 1, 1]);
        let out = stage.blend(beta, theta.clone(), Some(theta), true).unwrap();
        let disp = tensor_to_data_float(&out.pose_blend_shape).unwrap();
        assert_eq!(disp.len(), 3 * 2 * 3);
        assert!(disp.iter().all(|d| d.abs() < 1e-6));
    }

    #[test]
    fn test_pose_offsets_follow_rotation_difference() {
        let stage = stage();
        let beta = Tensor::<B, 2>::zeros([1, 2], &stage.device);
        let angle = std::f32::consts::FRAC_PI_2;
        // joint 1 rotated about z: R[0][0] = cos = 0 so the difference is -1
        let theta = Tensor::<B, 3>::from_floats([[[0.0, 0.0, 0.0], [0.0, 0.0, angle]]], &stage.device);
        let out = stage.blend(beta, theta, None, true).unwrap();
        let disp = tensor_to_data_float(&out.pose_blend_shape).unwrap();
        assert!((disp[0] + 1.0).abs() < 1e-6);
        assert!(disp[1..].iter().all(|d| d.abs() < 1e-6));
    }

    #[test]
    fn test_disabled_pose_blend_is_zero() {
        let stage = stage();
        let beta = Tensor::<B, 2>::zeros([1, 2], &stage.device);
        let theta = Tensor::<B, 3>::ones([1, 2, 3], &stage.device);
        let out = stage.blend(beta, theta, None, false).unwrap();
        assert!(tensor_to_data_float(&out.pose_blend_shape).unwrap().iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_wrong_beta_width_fails() {
        let stage = stage();
        let beta = Tensor::<B, 2>::zeros([1, 3], &stage.device);
        let theta = Tensor::<B, 3>::zeros([1, 2, 3], &stage.device);
        let err = stage.blend(beta, theta, None, true).unwrap_err();
        assert!(matches!(err, SmplError::Shape { component: COMPONENT, .. }));
    }

    #[test]
    fn test_rest_theta_batch_mismatch_fails() {
        let stage = stage();
        let beta = Tensor::<B, 2>::zeros([2, 2], &stage.device);
        let theta = Tensor::<B, 3>::zeros([2, 2, 3], &stage.device);
        let rest = Tensor::<B, 3>::zeros([1, 2, 3], &stage.device);
        assert!(stage.blend(beta, theta, Some(rest), true).is_err());
    }

    #[test]
    fn test_unroll_keeps_row_order() {
        let device = Default::default();
        let rot = Tensor::<B, 2>::eye(3, &device).reshape([1, 1, 3, 3]);
        let flat = tensor_to_data_float(&unroll(rot)).unwrap();
        assert_eq!(flat, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }
}
