use crate::config::{LaunchConfig, LaunchError};
use log::info;
use smpl_core::common::{
    betas::Betas, metadata::SmplMetadata, pose::Pose, smpl_model::SmplDynamic, smpl_options::SmplOptions,
    types::BurnBackend,
};
use std::{str::FromStr, time::Instant};

/// Loads the model, launches it once on seeded random parameters and exports one body
pub fn run(config: &LaunchConfig) -> Result<(), LaunchError> {
    let backend = BurnBackend::from_str(&config.backend).map_err(|_| LaunchError::Backend(config.backend.clone()))?;

    let start = Instant::now();
    let mut model = SmplDynamic::new_from_path(backend, &config.model_path)?;
    info!("Loaded {} in {} ms", config.model_path, start.elapsed().as_millis());

    let (betas, pose) = random_inputs(config, model.metadata());
    let options = SmplOptions::new(config.enable_pose_blend);

    let start = Instant::now();
    model.launch_with(&options, &betas, &pose, None, None)?;
    info!(
        "Launched {} bodies on {} in {} ms",
        config.batch_size,
        model.get_backend(),
        start.elapsed().as_millis()
    );

    model.export_obj(config.export_index, &config.output_path)?;
    Ok(())
}

/// Seeded shape and pose parameters, each drawn from its own stream
pub fn random_inputs(config: &LaunchConfig, metadata: &SmplMetadata) -> (Betas, Pose) {
    let betas = Betas::new_random(config.batch_size, metadata.shape_space_dim, config.beta_scale, config.seed);
    let pose = Pose::new_random(
        config.batch_size,
        metadata.num_joints,
        config.theta_scale,
        config.seed.wrapping_add(1),
    );
    (betas, pose)
}
