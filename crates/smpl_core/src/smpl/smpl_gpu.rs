use super::{
    blend_shape::BlendShape, joint_regression::JointRegression, linear_blend_skinning::LinearBlendSkinning,
    world_transformation::WorldTransformation,
};
use crate::{
    codec::{
        matrices::SmplMatrices,
        obj::{obj_string, save_obj},
    },
    common::{
        betas::Betas,
        error::{check_dims, Result, SmplError},
        metadata::SmplMetadata,
        outputs::SmplOutput,
        pose::Pose,
        smpl_options::SmplOptions,
    },
};
use burn::tensor::{backend::Backend, Tensor};
use log::{debug, info};
use ndarray as nd;
use smpl_utils::bshare::{tensor_to_data_float, ToBurn};
use std::path::Path;

pub const COMPONENT: &str = "SMPL";

/// SMPL body model on a burn backend. Holds the immutable model tensors split per
/// pipeline stage and the output of the last successful launch.
#[derive(Clone)]
pub struct SmplGPU<B: Backend> {
    pub device: B::Device,
    pub metadata: SmplMetadata,
    pub blend_shape: BlendShape<B>,
    pub joint_regression: JointRegression<B>,
    pub world_transformation: WorldTransformation,
    pub skinning: LinearBlendSkinning<B>,
    pub faces: nd::Array2<u32>,
    output: Option<SmplOutput<B>>,
}
impl<B: Backend> SmplGPU<B> {
    /// # Errors
    /// Fails if the matrices do not match `metadata`
    pub fn new_from_matrices(matrices: &SmplMatrices, metadata: SmplMetadata) -> Result<Self> {
        let device = B::Device::default();
        matrices.validate(&metadata)?;

        let verts_template: Tensor<B, 2> = matrices.verts_template.to_burn(&device);
        let shape_dirs: Tensor<B, 3> = matrices.shape_dirs.to_burn(&device);
        let pose_dirs: Tensor<B, 3> = matrices.pose_dirs.to_burn(&device);
        let joint_regressor: Tensor<B, 2> = matrices.joint_regressor.to_burn(&device);
        let lbs_weights: Tensor<B, 2> = matrices.lbs_weights.to_burn(&device);

        let model = Self {
            blend_shape: BlendShape::new(shape_dirs, pose_dirs, &metadata)?,
            joint_regression: JointRegression::new(verts_template, joint_regressor, &metadata)?,
            world_transformation: WorldTransformation::new(&matrices.parents())?,
            skinning: LinearBlendSkinning::new(lbs_weights, &metadata)?,
            faces: matrices.faces.clone(),
            device,
            metadata,
            output: None,
        };
        info!(
            "Initialised burn on Backend: {:?} with {} verts, {} joints, {} faces",
            B::name(),
            model.metadata.num_verts,
            model.metadata.num_joints,
            model.faces.nrows()
        );
        Ok(model)
    }

    /// Reads a json or npz model and infers its topology from the array shapes
    /// # Errors
    /// Fails if the file cannot be read or holds an inconsistent model
    pub fn new_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let matrices = SmplMatrices::from_path(path)?;
        let metadata = matrices.metadata()?;
        Self::new_from_matrices(&matrices, metadata)
    }

    /// Runs the four stages on device tensors
    /// # Errors
    /// Fails with a shape error from whichever stage first sees a mismatch
    pub fn forward_tensors(
        &self,
        options: &SmplOptions,
        beta: Tensor<B, 2>,
        theta: Tensor<B, 3>,
        rest_theta: Option<Tensor<B, 3>>,
        extra: Option<Tensor<B, 3>>,
    ) -> Result<SmplOutput<B>> {
        let [nr_batch, _] = beta.dims();
        check_dims(COMPONENT, "theta batch", [theta.dims()[0]], [nr_batch])?;
        if let Some(extra) = &extra {
            check_dims(COMPONENT, "extra", extra.dims(), [nr_batch, self.metadata.num_verts, 3])?;
        }

        let blend = self.blend_shape.blend(beta, theta, rest_theta, options.enable_pose_blend)?;
        debug!("blend shapes {:?}", blend.shape_blend_shape.dims());
        let regression = self
            .joint_regression
            .regress(blend.shape_blend_shape.clone(), blend.pose_blend_shape.clone())?;
        debug!("joints {:?}", regression.joints.dims());
        let world = self
            .world_transformation
            .transform(regression.joints.clone(), blend.pose_rot.clone())?;
        debug!("transformations {:?}", world.transformations.dims());

        let mut displacement = blend.shape_blend_shape.clone() + blend.pose_blend_shape.clone();
        let mut skin_input = regression.rest_shape.clone();
        if let Some(extra) = extra {
            displacement = displacement + extra.clone();
            skin_input = skin_input + extra;
        }
        let verts = self.skinning.skin(skin_input, world.transformations.clone())?;
        debug!("verts {:?}", verts.dims());

        Ok(SmplOutput {
            shape_blend_shape: blend.shape_blend_shape,
            pose_blend_shape: blend.pose_blend_shape,
            pose_rot: blend.pose_rot,
            rest_pose_rot: blend.rest_pose_rot,
            rest_shape: regression.rest_shape,
            joints: regression.joints,
            posed_joints: world.posed_joints,
            transformations: world.transformations,
            verts,
            displacement,
        })
    }

    /// Pure forward pass from host-side inputs
    /// # Errors
    /// Fails on any shape mismatch between the inputs and the model
    pub fn forward(
        &self,
        options: &SmplOptions,
        betas: &Betas,
        pose: &Pose,
        rest_pose: Option<&Pose>,
        extra: Option<Tensor<B, 3>>,
    ) -> Result<SmplOutput<B>> {
        let beta: Tensor<B, 2> = betas.betas.to_burn(&self.device);
        let theta: Tensor<B, 3> = pose.joint_poses.to_burn(&self.device);
        let rest_theta: Option<Tensor<B, 3>> = rest_pose.map(|rest| rest.joint_poses.to_burn(&self.device));
        self.forward_tensors(options, beta, theta, rest_theta, extra)
    }

    /// Runs a forward pass with default options and keeps the result
    /// # Errors
    /// Same as [`Self::forward`]. The previous result is dropped either way
    pub fn launch(&mut self, betas: &Betas, pose: &Pose) -> Result<()> {
        self.launch_with(&SmplOptions::default(), betas, pose, None, None)
    }

    /// # Errors
    /// Same as [`Self::forward`]. The previous result is dropped either way
    pub fn launch_with(
        &mut self,
        options: &SmplOptions,
        betas: &Betas,
        pose: &Pose,
        rest_pose: Option<&Pose>,
        extra: Option<Tensor<B, 3>>,
    ) -> Result<()> {
        self.output = None;
        self.output = Some(self.forward(options, betas, pose, rest_pose, extra)?);
        Ok(())
    }

    /// Output of the last successful launch
    /// # Errors
    /// Fails if there was none
    pub fn output(&self) -> Result<&SmplOutput<B>> {
        self.output
            .as_ref()
            .ok_or_else(|| SmplError::shape(COMPONENT, "no result available, launch the model first"))
    }

    pub fn rest_shape(&self) -> Result<Tensor<B, 3>> {
        Ok(self.output()?.rest_shape.clone())
    }
    pub fn rest_joints(&self) -> Result<Tensor<B, 3>> {
        Ok(self.output()?.joints.clone())
    }
    pub fn posed_joints(&self) -> Result<Tensor<B, 3>> {
        Ok(self.output()?.posed_joints.clone())
    }
    pub fn vertices(&self) -> Result<Tensor<B, 3>> {
        Ok(self.output()?.verts.clone())
    }
    pub fn transformations(&self) -> Result<Tensor<B, 4>> {
        Ok(self.output()?.transformations.clone())
    }
    pub fn displacement(&self) -> Result<Tensor<B, 3>> {
        Ok(self.output()?.displacement.clone())
    }
    /// Zero based faces
    pub fn face_indices(&self) -> &nd::Array2<u32> {
        &self.faces
    }

    /// Posed vertices of one batch element, (V, 3)
    /// # Errors
    /// Fails before a launch, on an out of range index or if the device data cannot be read
    pub fn vertices_at(&self, index: usize) -> Result<nd::Array2<f32>> {
        let verts = &self.output()?.verts;
        let [nr_batch, nr_verts, _] = verts.dims();
        if index >= nr_batch {
            return Err(SmplError::shape(
                COMPONENT,
                format!("batch index {index} is out of range for {nr_batch} bodies"),
            ));
        }
        let single = verts.clone().slice([index..index + 1, 0..nr_verts, 0..3]).reshape([nr_verts, 3]);
        let values = tensor_to_data_float(&single).map_err(SmplError::data)?;
        nd::Array2::from_shape_vec((nr_verts, 3), values).map_err(|e| SmplError::data(e.to_string()))
    }

    /// Mesh text of one batch element
    /// # Errors
    /// Same as [`Self::vertices_at`]
    pub fn out(&self, index: usize) -> Result<String> {
        let verts = self.vertices_at(index)?;
        obj_string(verts.view(), self.faces.view())
    }

    /// Writes one batch element as a mesh file, creating parent directories
    /// # Errors
    /// Same as [`Self::vertices_at`], plus any I/O failure
    pub fn export_obj(&self, index: usize, path: impl AsRef<Path>) -> Result<()> {
        let verts = self.vertices_at(index)?;
        save_obj(path, verts.view(), self.faces.view())
    }
}
