//! Launches the SMPL model once on random shape and pose parameters and writes
//! one body of the batch as a mesh.
//!
//! ```bash
//! smpl_launch --model ./data/smpl_female.json --output ./out/vertices.obj
//! smpl_launch --config launch.toml --batch-size 8 --export-index 3
//! ```
mod config;
mod launch;

use clap::Parser;
use config::{LaunchConfig, LaunchError};
use log::error;
use std::{path::PathBuf, process::ExitCode};

#[derive(Parser, Debug)]
#[command(name = "smpl_launch")]
#[command(author, version, about = "Runs the SMPL body model and exports one posed mesh")]
struct Args {
    /// TOML file with launch settings, flags given here override it
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Model asset (.json or .npz)
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Output mesh path
    #[arg(long, short = 'o')]
    output: Option<String>,

    #[arg(long, short = 'n')]
    batch_size: Option<usize>,

    /// Which body of the batch to export
    #[arg(long)]
    export_index: Option<usize>,

    /// Seed for the random betas and pose
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    beta_scale: Option<f32>,

    #[arg(long)]
    theta_scale: Option<f32>,

    /// ndarray, wgpu or candle
    #[arg(long, short = 'b')]
    backend: Option<String>,

    /// Skip the pose blend shapes
    #[arg(long)]
    no_pose_blend: bool,

    /// Log filter, RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<LaunchConfig, LaunchError> {
        let mut config = match &self.config {
            Some(path) => LaunchConfig::load(path)?,
            None => LaunchConfig::default(),
        };
        if let Some(model) = self.model {
            config.model_path = model;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(export_index) = self.export_index {
            config.export_index = export_index;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(beta_scale) = self.beta_scale {
            config.beta_scale = beta_scale;
        }
        if let Some(theta_scale) = self.theta_scale {
            config.theta_scale = theta_scale;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.no_pose_blend {
            config.enable_pose_blend = false;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str())).init();

    match args.into_config().and_then(|config| launch::run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
