use crate::common::error::{check_dims, Result, SmplError};
use burn::tensor::{backend::Backend, Tensor};

pub const COMPONENT: &str = "WorldTransformation";

#[derive(Clone, Debug)]
pub struct WorldTransformationOutput<B: Backend> {
    /// Global transforms with the rest-pose joint location removed, (N, J, 4, 4)
    pub transformations: Tensor<B, 4>,
    /// (N, J, 3)
    pub posed_joints: Tensor<B, 3>,
}

/// Walks the kinematic tree. Parents are kept on the host since the chain is
/// evaluated joint by joint anyway.
#[derive(Clone, Debug)]
pub struct WorldTransformation {
    /// Parent of every joint, the entry for the root is unused
    pub parents: Vec<usize>,
}
impl WorldTransformation {
    /// Takes the first row of the kinematic tree. Every non-root joint must come after its parent.
    /// # Errors
    /// Fails on an empty tree or a parent that is not ordered before its child
    pub fn new(parent_row: &[i64]) -> Result<Self> {
        if parent_row.is_empty() {
            return Err(SmplError::shape(COMPONENT, "kinematic tree has no joints"));
        }
        let mut parents = Vec::with_capacity(parent_row.len());
        parents.push(0);
        for (idx, &parent) in parent_row.iter().enumerate().skip(1) {
            if parent < 0 || parent as usize >= idx {
                return Err(SmplError::shape(
                    COMPONENT,
                    format!("joint {idx} has parent {parent} which is not an earlier joint"),
                ));
            }
            parents.push(parent as usize);
        }
        Ok(Self { parents })
    }
    pub fn num_joints(&self) -> usize {
        self.parents.len()
    }

    /// Local rigid transform of every joint, (N, J, 4, 4). The root is expressed in world
    /// space and every other joint relative to its parent.
    pub fn local_transforms<B: Backend>(&self, joints: Tensor<B, 3>, pose_rot: Tensor<B, 4>) -> Tensor<B, 4> {
        let [nr_batch, nr_joints, _] = joints.dims();
        let device = joints.device();
        let joint = |idx: usize| joints.clone().slice([0..nr_batch, idx..idx + 1, 0..3]).squeeze::<2>(1);

        let mut translations = Vec::with_capacity(nr_joints);
        translations.push(joint(0));
        for (idx, &parent) in self.parents.iter().enumerate().skip(1) {
            translations.push(joint(idx) - joint(parent));
        }
        let translations = Tensor::stack::<3>(translations, 1).unsqueeze_dim::<4>(3); // (N, J, 3, 1)

        let bottom_row = Tensor::<B, 1>::from_floats([0.0, 0.0, 0.0, 1.0], &device)
            .reshape([1, 1, 1, 4])
            .repeat(&[nr_batch, nr_joints, 1, 1]);
        let rot_trans = Tensor::cat(vec![pose_rot, translations], 3);
        Tensor::cat(vec![rot_trans, bottom_row], 2)
    }

    /// Composes local transforms down the tree, (N, J, 4, 4)
    pub fn global_transforms<B: Backend>(&self, local: Tensor<B, 4>) -> Tensor<B, 4> {
        let [nr_batch, nr_joints, _, _] = local.dims();
        let local_at = |idx: usize| local.clone().slice([0..nr_batch, idx..idx + 1, 0..4, 0..4]).squeeze::<3>(1);

        let mut chain: Vec<Tensor<B, 3>> = Vec::with_capacity(nr_joints);
        chain.push(local_at(0));
        for (idx, &parent) in self.parents.iter().enumerate().skip(1) {
            let global = chain[parent].clone().matmul(local_at(idx));
            chain.push(global);
        }
        Tensor::stack(chain, 1)
    }

    /// Subtracts the rotated rest joint location from the translation so the transforms
    /// apply to rest-pose vertices directly
    pub fn relative_transforms<B: Backend>(&self, global: Tensor<B, 4>, joints: Tensor<B, 3>) -> Tensor<B, 4> {
        let [nr_batch, nr_joints, _, _] = global.dims();
        let device = global.device();
        let rotated_joints = global
            .clone()
            .slice([0..nr_batch, 0..nr_joints, 0..3, 0..3])
            .matmul(joints.unsqueeze_dim::<4>(3)); // (N, J, 3, 1)
        let column = Tensor::cat(vec![rotated_joints, Tensor::zeros([nr_batch, nr_joints, 1, 1], &device)], 2);
        let eliminated = Tensor::cat(vec![Tensor::zeros([nr_batch, nr_joints, 4, 3], &device), column], 3);
        global - eliminated
    }

    /// # Errors
    /// Fails if the joints and rotations disagree with each other or with the tree
    pub fn transform<B: Backend>(&self, joints: Tensor<B, 3>, pose_rot: Tensor<B, 4>) -> Result<WorldTransformationOutput<B>> {
        let [nr_batch, _, _] = joints.dims();
        let nr_joints = self.num_joints();
        check_dims(COMPONENT, "joints", joints.dims(), [nr_batch, nr_joints, 3])?;
        check_dims(COMPONENT, "pose rotations", pose_rot.dims(), [nr_batch, nr_joints, 3, 3])?;

        let local = self.local_transforms(joints.clone(), pose_rot);
        let global = self.global_transforms(local);
        let posed_joints = global
            .clone()
            .slice([0..nr_batch, 0..nr_joints, 0..3, 3..4])
            .squeeze::<3>(3);
        let transformations = self.relative_transforms(global, joints);
        Ok(WorldTransformationOutput {
            transformations,
            posed_joints,
        })
    }
}
