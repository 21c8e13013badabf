use burn::tensor::{backend::Backend, Tensor};
use nalgebra as na;

/// Added to the rotation angle before normalising the axis. Keeps a zero
/// axis-angle finite and makes it map to the identity rotation.
pub const RODRIGUES_EPS: f32 = 1e-8;

/// Calculates the rotation matrices for a batch of rotation vectors.
/// Input is (N, J, 3) axis-angles, output is (N, J, 3, 3).
pub fn batch_rodrigues<B: Backend>(theta: Tensor<B, 3>) -> Tensor<B, 4> {
    let [nr_batch, nr_joints, _] = theta.dims();
    let device = theta.device();

    let angle = theta.clone().powi_scalar(2).sum_dim(2).sqrt(); //l2 norm (N, J, 1)
    let rot_dir = theta.div(angle.clone().add_scalar(RODRIGUES_EPS));

    let rx = rot_dir.clone().slice([0..nr_batch, 0..nr_joints, 0..1]);
    let ry = rot_dir.clone().slice([0..nr_batch, 0..nr_joints, 1..2]);
    let rz = rot_dir.slice([0..nr_batch, 0..nr_joints, 2..3]);
    let zeros = Tensor::<B, 3>::zeros([nr_batch, nr_joints, 1], &device);

    // k = [[0, -rz, ry], [rz, 0, -rx], [-ry, rx, 0]]
    let k: Tensor<B, 4> = Tensor::cat(
        vec![
            zeros.clone(),
            rz.clone().neg(),
            ry.clone(),
            rz,
            zeros.clone(),
            rx.clone().neg(),
            ry.neg(),
            rx,
            zeros,
        ],
        2,
    )
    .reshape([nr_batch, nr_joints, 3, 3]);

    let angle = angle.unsqueeze_dim::<4>(3); // (N, J, 1, 1)
    let sin = angle.clone().sin();
    let one_minus_cos = angle.cos().neg().add_scalar(1.0);
    let identity = Tensor::<B, 2>::eye(3, &device)
        .reshape([1, 1, 3, 3])
        .expand([nr_batch, nr_joints, 3, 3]);

    identity + k.clone().mul(sin) + k.clone().matmul(k).mul(one_minus_cos)
}

//following https://github.com/mrdoob/three.js/blob/034181b82baa318ff19c9e8bcfc41d07411dc0cd/src/math/Quaternion.js#L201
pub fn euler2angleaxis(euler_x: f32, euler_y: f32, euler_z: f32) -> na::Vector3<f32> {
    let c1 = f32::cos(euler_x / 2.0);
    let c2 = f32::cos(euler_y / 2.0);
    let c3 = f32::cos(euler_z / 2.0);
    let s1 = f32::sin(euler_x / 2.0);
    let s2 = f32::sin(euler_y / 2.0);
    let s3 = f32::sin(euler_z / 2.0);
    //the order of the arguments is flipped compared to threejs
    let rot = na::Quaternion::new(
        c1 * c2 * c3 - s1 * s2 * s3,
        s1 * c2 * c3 + c1 * s2 * s3,
        c1 * s2 * c3 - s1 * c2 * s3,
        c1 * c2 * s3 + s1 * s2 * c3,
    );
    let rot = na::UnitQuaternion::new_normalize(rot);

    rot.scaled_axis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bshare::{tensor_to_data_float, ToBurn};
    use burn::backend::NdArray;
    use ndarray as nd;
    use std::f32::consts::FRAC_PI_2;

    type B = NdArray;

    fn rodrigues_single(axis_angle: [f32; 3]) -> Vec<f32> {
        let device = Default::default();
        let theta = nd::Array3::from_shape_vec((1, 1, 3), axis_angle.to_vec()).unwrap();
        let theta: Tensor<B, 3> = theta.to_burn(&device);
        let rot = batch_rodrigues(theta);
        assert_eq!(rot.dims(), [1, 1, 3, 3]);
        tensor_to_data_float(&rot).unwrap()
    }

    fn assert_close(a: &[f32], b: &[f32], eps: f32) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < eps, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_zero_axis_angle_is_identity() {
        let rot = rodrigues_single([0.0, 0.0, 0.0]);
        assert_eq!(rot, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_quarter_turn_about_x() {
        let rot = rodrigues_single([FRAC_PI_2, 0.0, 0.0]);
        let expected = [1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, 0.0];
        assert_close(&rot, &expected, 1e-6);
    }

    #[test]
    fn test_matches_nalgebra_for_arbitrary_axis() {
        let axis_angle = [0.3f32, -0.7, 1.1];
        let rot = rodrigues_single(axis_angle);
        let reference = na::Rotation3::new(na::Vector3::new(axis_angle[0], axis_angle[1], axis_angle[2]));
        // nalgebra is column-major, our data is row-major
        let expected: Vec<f32> = (0..3).flat_map(|r| (0..3).map(move |c| reference[(r, c)])).collect();
        assert_close(&rot, &expected, 1e-5);
    }

    #[test]
    fn test_batch_elements_are_independent() {
        let device = Default::default();
        let theta = nd::array![[[0.0f32, 0.0, 0.0], [0.0, 0.0, FRAC_PI_2]], [[0.0, 0.0, FRAC_PI_2], [0.0, 0.0, 0.0]]];
        let theta: Tensor<B, 3> = theta.to_burn(&device);
        let rot = tensor_to_data_float(&batch_rodrigues(theta)).unwrap();
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let rot_z = [0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert_close(&rot[0..9], &identity, 1e-6);
        assert_close(&rot[9..18], &rot_z, 1e-6);
        assert_close(&rot[18..27], &rot_z, 1e-6);
        assert_close(&rot[27..36], &identity, 1e-6);
    }

    #[test]
    fn test_euler2angleaxis_single_axis() {
        let aa = euler2angleaxis(0.5, 0.0, 0.0);
        assert!((aa.x - 0.5).abs() < 1e-6);
        assert!(aa.y.abs() < 1e-6 && aa.z.abs() < 1e-6);
    }
}
