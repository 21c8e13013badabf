use crate::common::{
    error::{check_dims, Result, SmplError},
    metadata::{smpl_metadata, SmplMetadata},
};
use log::{debug, warn};
use ndarray as nd;
use smpl_utils::io::{FileLoader, FileType};
use std::path::Path;

pub const COMPONENT: &str = "SMPL";

/// Keys shared by the json and npz model documents
pub const KEY_VERTICES_TEMPLATE: &str = "vertices_template";
pub const KEY_SHAPE_BLEND_SHAPES: &str = "shape_blend_shapes";
pub const KEY_POSE_BLEND_SHAPES: &str = "pose_blend_shapes";
pub const KEY_JOINT_REGRESSOR: &str = "joint_regressor";
pub const KEY_KINEMATIC_TREE: &str = "kinematic_tree";
pub const KEY_WEIGHTS: &str = "weights";
pub const KEY_FACE_INDICES: &str = "face_indices";

/// Tolerance on how far a row of skinning weights may sum away from one before we complain
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// Host-side copy of every model array, as read from disk
#[derive(Clone, Debug)]
pub struct SmplMatrices {
    /// (V, 3)
    pub verts_template: nd::Array2<f32>,
    /// (V, 3, K)
    pub shape_dirs: nd::Array3<f32>,
    /// (V, 3, P)
    pub pose_dirs: nd::Array3<f32>,
    /// (J, V)
    pub joint_regressor: nd::Array2<f32>,
    /// (2, J), first row holds the parent of every joint
    pub kinematic_tree: nd::Array2<i64>,
    /// (V, J)
    pub lbs_weights: nd::Array2<f32>,
    /// (F, 3), zero based
    pub faces: nd::Array2<u32>,
}

impl SmplMatrices {
    /// Reads a model, picking the format from the file extension
    /// # Errors
    /// Fails if the file cannot be read, the format is unknown, or a required array is missing or malformed
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = FileLoader::open(path)?;
        let matrices = match FileType::from_path(path) {
            FileType::Json => super::json::read_json(reader)?,
            FileType::Npz => super::npz::read_npz(reader)?,
            other => {
                return Err(SmplError::asset(format!(
                    "cannot read a model from {} ({other:?}), expected one of {:?} or {:?}",
                    path.display(),
                    FileType::Json.value(),
                    FileType::Npz.value()
                )))
            }
        };
        debug!(
            "Read model from {}: {} verts, {} joints, {} faces",
            path.display(),
            matrices.num_verts(),
            matrices.num_joints(),
            matrices.faces.nrows()
        );
        Ok(matrices)
    }

    pub fn num_verts(&self) -> usize {
        self.verts_template.nrows()
    }
    pub fn num_joints(&self) -> usize {
        self.joint_regressor.nrows()
    }

    /// Parent row of the kinematic tree
    pub fn parents(&self) -> Vec<i64> {
        self.kinematic_tree.outer_iter().next().map(|row| row.to_vec()).unwrap_or_default()
    }

    /// Topology implied by the array shapes. Uses the stock SMPL metadata when it matches.
    /// # Errors
    /// Fails if the model has no joints
    pub fn metadata(&self) -> Result<SmplMetadata> {
        let stock = smpl_metadata();
        let (num_verts, num_joints) = (self.num_verts(), self.num_joints());
        if num_joints == 0 {
            return Err(SmplError::asset("model has no joints"));
        }
        let (shape_space_dim, num_faces) = (self.shape_dirs.dim().2, self.faces.nrows());
        if (num_verts, num_joints, shape_space_dim, num_faces)
            == (stock.num_verts, stock.num_joints, stock.shape_space_dim, stock.num_faces)
        {
            return Ok(stock);
        }
        let mut metadata = SmplMetadata::new(num_verts, num_joints, shape_space_dim, num_faces);
        metadata.joint_parents = self
            .parents()
            .iter()
            .enumerate()
            .map(|(idx, &parent)| if idx == 0 { 0 } else { u32::try_from(parent).unwrap_or(u32::MAX) })
            .collect();
        Ok(metadata)
    }

    /// Checks every array against `metadata` and the structural rules of the model
    /// # Errors
    /// Fails on the first shape mismatch, misordered parent or out of range face index
    pub fn validate(&self, metadata: &SmplMetadata) -> Result<()> {
        let (nv, nj) = (metadata.num_verts, metadata.num_joints);
        if nj == 0 {
            return Err(SmplError::asset("model has no joints"));
        }
        check_dims(COMPONENT, KEY_VERTICES_TEMPLATE, self.verts_template.dim().into(), [nv, 3])?;
        check_dims(COMPONENT, KEY_SHAPE_BLEND_SHAPES, self.shape_dirs.dim().into(), [nv, 3, metadata.shape_space_dim])?;
        check_dims(COMPONENT, KEY_POSE_BLEND_SHAPES, self.pose_dirs.dim().into(), [nv, 3, metadata.num_pose_blend_shapes])?;
        check_dims(COMPONENT, KEY_JOINT_REGRESSOR, self.joint_regressor.dim().into(), [nj, nv])?;
        check_dims(COMPONENT, KEY_KINEMATIC_TREE, self.kinematic_tree.dim().into(), [2, nj])?;
        check_dims(COMPONENT, KEY_WEIGHTS, self.lbs_weights.dim().into(), [nv, nj])?;
        check_dims(COMPONENT, KEY_FACE_INDICES, [self.faces.ncols()], [3])?;

        for (idx, &parent) in self.kinematic_tree.row(0).iter().enumerate().skip(1) {
            if parent < 0 || parent as usize >= idx {
                return Err(SmplError::shape(
                    COMPONENT,
                    format!("joint {idx} has parent {parent}, parents must be listed before their children"),
                ));
            }
        }
        if let Some(&max_idx) = self.faces.iter().max() {
            if max_idx as usize >= nv {
                return Err(SmplError::shape(
                    COMPONENT,
                    format!("face references vertex {max_idx} but the model has {nv} vertices"),
                ));
            }
        }
        let off_rows = self.unnormalized_weight_rows();
        if off_rows > 0 {
            warn!("{off_rows} vertices have skinning weights that do not sum to one");
        }
        let moved = self.parents_differing_from(metadata);
        if !moved.is_empty() {
            warn!("joints {moved:?} have a different parent than the {nj} joint topology expects");
        }
        Ok(())
    }

    /// Number of vertices whose skinning weights sum away from one
    pub fn unnormalized_weight_rows(&self) -> usize {
        self.lbs_weights
            .rows()
            .into_iter()
            .filter(|row| (row.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE)
            .count()
    }

    /// Non-root joints whose parent in the kinematic tree is not the one listed in
    /// `metadata.joint_parents`. Empty when the metadata carries no parent table.
    pub fn parents_differing_from(&self, metadata: &SmplMetadata) -> Vec<usize> {
        let parents = self.parents();
        if metadata.joint_parents.len() != parents.len() {
            return Vec::new();
        }
        parents
            .iter()
            .zip(&metadata.joint_parents)
            .enumerate()
            .skip(1)
            .filter(|(_, (&tree, &expected))| tree != i64::from(expected))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Zero pose basis for models shipped without pose correctives
pub(crate) fn missing_pose_dirs(num_verts: usize, num_joints: usize) -> nd::Array3<f32> {
    warn!("Model has no '{KEY_POSE_BLEND_SHAPES}', pose blend shapes will be zero");
    nd::Array3::zeros((num_verts, 3, num_joints.saturating_sub(1) * 9))
}

/// Converts face indices stored one based in the model documents
pub(crate) fn faces_from_one_based(faces: nd::ArrayView2<i64>) -> Result<nd::Array2<u32>> {
    let mut out = nd::Array2::<u32>::zeros(faces.raw_dim());
    for (dst, &src) in out.iter_mut().zip(faces.iter()) {
        if src < 1 || src > i64::from(u32::MAX) {
            return Err(SmplError::asset(format!("{KEY_FACE_INDICES} must be one based, found {src}")));
        }
        *dst = (src - 1) as u32;
    }
    Ok(out)
}
