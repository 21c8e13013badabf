//! SMPL body model: shape and pose blend shapes, joint regression, the
//! kinematic chain and linear blend skinning on a burn backend.
pub mod codec;
pub mod common;
pub mod smpl;

pub use common::error::{Result, SmplError};
