use super::matrices::{
    faces_from_one_based, missing_pose_dirs, SmplMatrices, KEY_FACE_INDICES, KEY_JOINT_REGRESSOR, KEY_KINEMATIC_TREE, KEY_POSE_BLEND_SHAPES,
    KEY_SHAPE_BLEND_SHAPES, KEY_VERTICES_TEMPLATE, KEY_WEIGHTS,
};
use crate::common::error::{Result, SmplError};
use ndarray as nd;
use serde_json::Value;
use std::io::Read;

/// Reads a model stored as one json object of nested number arrays
/// # Errors
/// Fails on malformed json, a missing key, a ragged array or a non numeric entry
pub fn read_json<R: Read>(reader: R) -> Result<SmplMatrices> {
    let doc: Value = serde_json::from_reader(reader)?;
    let faces = array_from_json::<nd::Ix2>(&doc, KEY_FACE_INDICES)?;
    let kinematic_tree = array_from_json::<nd::Ix2>(&doc, KEY_KINEMATIC_TREE)?;
    let verts_template = array_from_json::<nd::Ix2>(&doc, KEY_VERTICES_TEMPLATE)?.mapv(|x| x as f32);
    let joint_regressor = array_from_json::<nd::Ix2>(&doc, KEY_JOINT_REGRESSOR)?.mapv(|x| x as f32);
    let pose_dirs = if doc.get(KEY_POSE_BLEND_SHAPES).is_some() {
        array_from_json::<nd::Ix3>(&doc, KEY_POSE_BLEND_SHAPES)?.mapv(|x| x as f32)
    } else {
        missing_pose_dirs(verts_template.nrows(), joint_regressor.nrows())
    };
    Ok(SmplMatrices {
        verts_template,
        shape_dirs: array_from_json::<nd::Ix3>(&doc, KEY_SHAPE_BLEND_SHAPES)?.mapv(|x| x as f32),
        pose_dirs,
        joint_regressor,
        kinematic_tree: to_integer(&kinematic_tree, KEY_KINEMATIC_TREE)?,
        lbs_weights: array_from_json::<nd::Ix2>(&doc, KEY_WEIGHTS)?.mapv(|x| x as f32),
        faces: faces_from_one_based(to_integer(&faces, KEY_FACE_INDICES)?.view())?,
    })
}

/// Pulls `key` out of the document as an array of dimensionality `D`
fn array_from_json<D: nd::Dimension>(doc: &Value, key: &str) -> Result<nd::Array<f64, D>> {
    let value = doc
        .get(key)
        .ok_or_else(|| SmplError::asset(format!("model is missing '{key}'")))?;
    let mut shape = Vec::new();
    let mut values = Vec::new();
    flatten(value, 0, &mut shape, &mut values, key)?;
    let array = nd::ArrayD::from_shape_vec(nd::IxDyn(&shape), values)
        .map_err(|e| SmplError::asset(format!("'{key}' could not be shaped as {shape:?}: {e}")))?;
    array
        .into_dimensionality::<D>()
        .map_err(|_| SmplError::asset(format!("'{key}' has {} dimensions, expected {:?}", shape.len(), D::NDIM)))
}

fn flatten(value: &Value, depth: usize, shape: &mut Vec<usize>, values: &mut Vec<f64>, key: &str) -> Result<()> {
    match value {
        Value::Array(items) => {
            if shape.len() == depth {
                if !values.is_empty() {
                    return Err(SmplError::asset(format!("'{key}' is ragged")));
                }
                shape.push(items.len());
            } else if shape[depth] != items.len() {
                return Err(SmplError::asset(format!(
                    "'{key}' is ragged, found {} entries at depth {depth} instead of {}",
                    items.len(),
                    shape[depth]
                )));
            }
            for item in items {
                flatten(item, depth + 1, shape, values, key)?;
            }
            Ok(())
        }
        Value::Number(number) => {
            if depth != shape.len() {
                return Err(SmplError::asset(format!("'{key}' is ragged")));
            }
            let number = number
                .as_f64()
                .ok_or_else(|| SmplError::asset(format!("'{key}' holds {number} which is not representable")))?;
            values.push(number);
            Ok(())
        }
        other => Err(SmplError::asset(format!("'{key}' holds a non numeric entry {other}"))),
    }
}

fn to_integer(array: &nd::Array2<f64>, key: &str) -> Result<nd::Array2<i64>> {
    if let Some(bad) = array.iter().find(|x| x.fract() != 0.0) {
        return Err(SmplError::asset(format!("'{key}' must hold integers, found {bad}")));
    }
    Ok(array.mapv(|x| x as i64))
}
