pub mod betas;
pub mod error;
pub mod metadata;
pub mod outputs;
pub mod pose;
pub mod smpl_model;
pub mod smpl_options;
pub mod types;
