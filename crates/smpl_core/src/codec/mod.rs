pub mod json;
pub mod matrices;
pub mod npz;
pub mod obj;
