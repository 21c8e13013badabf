pub mod blend_shape;
pub mod joint_regression;
pub mod linear_blend_skinning;
pub mod smpl_gpu;
pub mod world_transformation;
