pub const NUM_VERTS: usize = 6890;
pub const NUM_JOINTS: usize = 24;
pub const SHAPE_SPACE_DIM: usize = 10;
pub const NUM_POSE_BLEND_SHAPES: usize = (NUM_JOINTS - 1) * 9;
pub const NUM_FACES: usize = 13776;

pub const JOINT_NAMES: [&str; NUM_JOINTS] = [
    "pelvis",
    "left_hip",
    "right_hip",
    "spine1",
    "left_knee",
    "right_knee",
    "spine2",
    "left_ankle",
    "right_ankle",
    "spine3",
    "left_foot",
    "right_foot",
    "neck",
    "left_collar",
    "right_collar",
    "head",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hand",
    "right_hand",
];

/// Parent of every joint in the SMPL kinematic tree, the root points to itself
pub const PARENT_ID_PER_JOINT: [u32; NUM_JOINTS] = [0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9, 9, 12, 13, 14, 16, 17, 18, 19, 20, 21];

/// Topology sizes a model is validated against.
#[derive(Clone, Debug, PartialEq)]
pub struct SmplMetadata {
    pub num_verts: usize,
    pub num_joints: usize,
    pub shape_space_dim: usize,
    pub num_pose_blend_shapes: usize,
    pub num_faces: usize,
    pub joint_names: Vec<String>,
    pub joint_parents: Vec<u32>,
}
impl Default for SmplMetadata {
    fn default() -> Self {
        smpl_metadata()
    }
}
impl SmplMetadata {
    /// Custom topology. Joints are named `joint_<i>` and the parent table is
    /// taken from the asset's kinematic tree when the model is built.
    pub fn new(num_verts: usize, num_joints: usize, shape_space_dim: usize, num_faces: usize) -> Self {
        Self {
            num_verts,
            num_joints,
            shape_space_dim,
            num_pose_blend_shapes: num_joints.saturating_sub(1) * 9,
            num_faces,
            joint_names: (0..num_joints).map(|i| format!("joint_{i}")).collect(),
            joint_parents: Vec::new(),
        }
    }
}

pub fn smpl_metadata() -> SmplMetadata {
    SmplMetadata {
        num_verts: NUM_VERTS,
        num_joints: NUM_JOINTS,
        shape_space_dim: SHAPE_SPACE_DIM,
        num_pose_blend_shapes: NUM_POSE_BLEND_SHAPES,
        num_faces: NUM_FACES,
        joint_names: JOINT_NAMES.map(std::string::ToString::to_string).to_vec(),
        joint_parents: PARENT_ID_PER_JOINT.to_vec(),
    }
}
