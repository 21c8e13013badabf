use super::error::{Result, SmplError};
use ndarray as nd;
use ndarray::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use smpl_utils::numerical::euler2angleaxis;

/// Axis-angle rotation per joint for a batch of bodies, (N, J, 3)
#[derive(Clone, Debug)]
pub struct Pose {
    pub joint_poses: nd::Array3<f32>,
}
impl Pose {
    pub fn new(joint_poses: nd::Array3<f32>) -> Self {
        Self { joint_poses }
    }
    /// All joints at identity rotation
    pub fn new_empty(batch_size: usize, num_joints: usize) -> Self {
        Self {
            joint_poses: nd::Array3::<f32>::zeros((batch_size, num_joints, 3)),
        }
    }
    /// Uniform samples in `[0, scale)` per component, reproducible for a given seed
    pub fn new_random(batch_size: usize, num_joints: usize, scale: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let joint_poses = nd::Array3::from_shape_simple_fn((batch_size, num_joints, 3), || scale * rng.random::<f32>());
        Self { joint_poses }
    }
    pub fn batch_size(&self) -> usize {
        self.joint_poses.dim().0
    }
    pub fn num_joints(&self) -> usize {
        self.joint_poses.dim().1
    }
    /// Sets one joint from XYZ euler angles in radians
    /// # Errors
    /// Fails if the batch or joint index is out of range
    pub fn set_joint_euler(&mut self, batch: usize, joint: usize, euler_x: f32, euler_y: f32, euler_z: f32) -> Result<()> {
        let (nr_batch, nr_joints, _) = self.joint_poses.dim();
        if batch >= nr_batch || joint >= nr_joints {
            return Err(SmplError::shape(
                "Pose",
                format!("joint ({batch}, {joint}) is out of range for a pose of {nr_batch} x {nr_joints} joints"),
            ));
        }
        let axis_angle = euler2angleaxis(euler_x, euler_y, euler_z);
        self.joint_poses
            .slice_mut(s![batch, joint, ..])
            .assign(&array![axis_angle.x, axis_angle.y, axis_angle.z]);
        Ok(())
    }
}
