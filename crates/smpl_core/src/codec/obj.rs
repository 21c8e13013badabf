use crate::common::error::{Result, SmplError};
use log::info;
use ndarray as nd;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

/// Writes one `v x y z` line per vertex followed by one `f i j k` line per face.
/// Faces are written one based.
/// # Errors
/// Fails if the writer fails or the arrays are not three wide
pub fn write_obj<W: Write>(writer: &mut W, verts: nd::ArrayView2<f32>, faces: nd::ArrayView2<u32>) -> Result<()> {
    if verts.ncols() != 3 || faces.ncols() != 3 {
        return Err(SmplError::shape(
            "SMPL",
            format!("cannot export vertices {:?} with faces {:?}", verts.dim(), faces.dim()),
        ));
    }
    for v in verts.rows() {
        writeln!(writer, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for f in faces.rows() {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    Ok(())
}

/// Same as [`write_obj`] but into a string
/// # Errors
/// Fails if the arrays are not three wide
pub fn obj_string(verts: nd::ArrayView2<f32>, faces: nd::ArrayView2<u32>) -> Result<String> {
    let mut buf = Vec::new();
    write_obj(&mut buf, verts, faces)?;
    String::from_utf8(buf).map_err(|e| SmplError::data(e.to_string()))
}

/// Writes the mesh to `path`, creating missing parent directories
/// # Errors
/// Fails if the file cannot be created or written
pub fn save_obj(path: impl AsRef<Path>, verts: nd::ArrayView2<f32>, faces: nd::ArrayView2<u32>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(&mut writer, verts, faces)?;
    writer.flush()?;
    info!("Wrote {} verts and {} faces to {}", verts.nrows(), faces.nrows(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::prelude::*;

    #[test]
    fn test_vertices_then_one_based_faces() {
        let verts = array![[0.0f32, 0.5, -1.25], [1.0, 2.0, 3.0], [0.1, 0.0, 0.0]];
        let faces = array![[0u32, 1, 2]];
        let text = obj_string(verts.view(), faces.view()).unwrap();
        assert_eq!(text, "v 0 0.5 -1.25\nv 1 2 3\nv 0.1 0 0\nf 1 2 3\n");
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("mesh.obj");
        let verts = array![[1.0f32, 1.0, 1.0]];
        let faces = nd::Array2::<u32>::zeros((0, 3));
        save_obj(&path, verts.view(), faces.view()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "v 1 1 1\n");
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let verts = nd::Array2::<f32>::zeros((2, 2));
        let faces = nd::Array2::<u32>::zeros((0, 3));
        assert!(obj_string(verts.view(), faces.view()).is_err());
    }
}
