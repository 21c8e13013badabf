/// Options specifically for the forward pass of the smpl model
#[derive(Clone, Debug)]
pub struct SmplOptions {
    /// Adds the pose blend shape displacement to the rest shape. Joint
    /// rotations are still used for skinning when this is off.
    pub enable_pose_blend: bool,
}
impl Default for SmplOptions {
    fn default() -> Self {
        Self { enable_pose_blend: true }
    }
}
impl SmplOptions {
    pub fn new(enable_pose_blend: bool) -> Self {
        Self { enable_pose_blend }
    }
}
