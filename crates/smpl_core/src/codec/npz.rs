use super::matrices::{
    faces_from_one_based, missing_pose_dirs, SmplMatrices, KEY_FACE_INDICES, KEY_JOINT_REGRESSOR, KEY_KINEMATIC_TREE, KEY_POSE_BLEND_SHAPES,
    KEY_SHAPE_BLEND_SHAPES, KEY_VERTICES_TEMPLATE, KEY_WEIGHTS,
};
use crate::common::error::Result;
use ndarray as nd;
use ndarray_npy::NpzReader;
use std::io::{Read, Seek};

/// Reads a model from an npz archive with one array per key. Float arrays may be stored
/// as f32 or f64 and index arrays as any of the common integer types.
/// # Errors
/// Fails if the archive cannot be opened or an array is missing or has an unexpected rank
pub fn read_npz<R: Read + Seek>(reader: R) -> Result<SmplMatrices> {
    let mut npz = NpzReader::new(reader)?;
    let faces = read_int::<_, nd::Ix2>(&mut npz, KEY_FACE_INDICES)?;
    let verts_template: nd::Array2<f32> = read_float(&mut npz, KEY_VERTICES_TEMPLATE)?;
    let joint_regressor: nd::Array2<f32> = read_float(&mut npz, KEY_JOINT_REGRESSOR)?;
    let has_pose_dirs = npz
        .names()?
        .iter()
        .any(|name| name.trim_end_matches(".npy") == KEY_POSE_BLEND_SHAPES);
    let pose_dirs = if has_pose_dirs {
        read_float(&mut npz, KEY_POSE_BLEND_SHAPES)?
    } else {
        missing_pose_dirs(verts_template.nrows(), joint_regressor.nrows())
    };
    Ok(SmplMatrices {
        shape_dirs: read_float(&mut npz, KEY_SHAPE_BLEND_SHAPES)?,
        pose_dirs,
        verts_template,
        joint_regressor,
        kinematic_tree: read_int(&mut npz, KEY_KINEMATIC_TREE)?,
        lbs_weights: read_float(&mut npz, KEY_WEIGHTS)?,
        faces: faces_from_one_based(faces.view())?,
    })
}

fn read_float<R: Read + Seek, D: nd::Dimension>(npz: &mut NpzReader<R>, key: &str) -> Result<nd::Array<f32, D>> {
    if let Ok(array) = npz.by_name::<nd::OwnedRepr<f32>, D>(key) {
        return Ok(array);
    }
    let array: nd::Array<f64, D> = npz.by_name(key)?;
    Ok(array.mapv(|x| x as f32))
}

fn read_int<R: Read + Seek, D: nd::Dimension>(npz: &mut NpzReader<R>, key: &str) -> Result<nd::Array<i64, D>> {
    if let Ok(array) = npz.by_name::<nd::OwnedRepr<i64>, D>(key) {
        return Ok(array);
    }
    if let Ok(array) = npz.by_name::<nd::OwnedRepr<i32>, D>(key) {
        return Ok(array.mapv(i64::from));
    }
    if let Ok(array) = npz.by_name::<nd::OwnedRepr<u32>, D>(key) {
        return Ok(array.mapv(i64::from));
    }
    //kinematic trees exported from the pickles use u64 with u32::MAX as the root parent
    let array: nd::Array<u64, D> = npz.by_name(key)?;
    Ok(array.mapv(|x| x as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::matrices::tests::tiny_matrices;
    use crate::common::error::SmplError;
    use ndarray_npy::NpzWriter;
    use std::io::Cursor;

    fn write_tiny(faces_as_u32: bool) -> Vec<u8> {
        let matrices = tiny_matrices();
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array(KEY_VERTICES_TEMPLATE, &matrices.verts_template.mapv(f64::from)).unwrap();
        npz.add_array(KEY_SHAPE_BLEND_SHAPES, &matrices.shape_dirs).unwrap();
        npz.add_array(KEY_POSE_BLEND_SHAPES, &matrices.pose_dirs).unwrap();
        npz.add_array(KEY_JOINT_REGRESSOR, &matrices.joint_regressor).unwrap();
        npz.add_array(KEY_KINEMATIC_TREE, &matrices.kinematic_tree).unwrap();
        npz.add_array(KEY_WEIGHTS, &matrices.lbs_weights).unwrap();
        let one_based = matrices.faces.mapv(|f| f + 1);
        if faces_as_u32 {
            npz.add_array(KEY_FACE_INDICES, &one_based).unwrap();
        } else {
            npz.add_array(KEY_FACE_INDICES, &one_based.mapv(i64::from)).unwrap();
        }
        npz.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_mixed_dtypes() {
        for faces_as_u32 in [true, false] {
            let matrices = read_npz(Cursor::new(write_tiny(faces_as_u32))).unwrap();
            let expected = tiny_matrices();
            assert_eq!(matrices.verts_template, expected.verts_template);
            assert_eq!(matrices.kinematic_tree, expected.kinematic_tree);
            assert_eq!(matrices.faces, expected.faces);
            assert_eq!(matrices.lbs_weights, expected.lbs_weights);
        }
    }

    #[test]
    fn test_missing_pose_basis_is_zero() {
        let matrices = tiny_matrices();
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array(KEY_VERTICES_TEMPLATE, &matrices.verts_template).unwrap();
        npz.add_array(KEY_SHAPE_BLEND_SHAPES, &matrices.shape_dirs).unwrap();
        npz.add_array(KEY_JOINT_REGRESSOR, &matrices.joint_regressor).unwrap();
        npz.add_array(KEY_KINEMATIC_TREE, &matrices.kinematic_tree).unwrap();
        npz.add_array(KEY_WEIGHTS, &matrices.lbs_weights).unwrap();
        npz.add_array(KEY_FACE_INDICES, &matrices.faces.mapv(|f| f + 1)).unwrap();
        let read = read_npz(Cursor::new(npz.finish().unwrap().into_inner())).unwrap();
        assert_eq!(read.pose_dirs, matrices.pose_dirs);
    }

    #[test]
    fn test_model_without_joints_is_rejected() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array(KEY_VERTICES_TEMPLATE, &nd::Array2::<f32>::zeros((1, 3))).unwrap();
        npz.add_array(KEY_SHAPE_BLEND_SHAPES, &nd::Array3::<f32>::zeros((1, 3, 1))).unwrap();
        npz.add_array(KEY_JOINT_REGRESSOR, &nd::Array2::<f32>::zeros((0, 1))).unwrap();
        npz.add_array(KEY_KINEMATIC_TREE, &nd::Array2::<i64>::zeros((2, 0))).unwrap();
        npz.add_array(KEY_WEIGHTS, &nd::Array2::<f32>::zeros((1, 0))).unwrap();
        npz.add_array(KEY_FACE_INDICES, &nd::Array2::<i64>::ones((1, 3))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_joints.npz");
        std::fs::write(&path, npz.finish().unwrap().into_inner()).unwrap();

        let read = SmplMatrices::from_path(&path).unwrap();
        assert_eq!(read.num_joints(), 0);
        let built = crate::smpl::smpl_gpu::SmplGPU::<burn::backend::NdArray>::new_from_path(&path);
        assert!(matches!(built, Err(SmplError::Asset { .. })));
    }

    #[test]
    fn test_missing_array_fails() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array(KEY_VERTICES_TEMPLATE, &tiny_matrices().verts_template).unwrap();
        let bytes = npz.finish().unwrap().into_inner();
        assert!(matches!(read_npz(Cursor::new(bytes)), Err(SmplError::Npz(_))));
    }
}
