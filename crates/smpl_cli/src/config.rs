use serde::Deserialize;
use smpl_core::SmplError;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown backend '{0}'")]
    Backend(String),
    #[error(transparent)]
    Smpl(#[from] SmplError),
}

/// Everything one run of the launcher needs
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LaunchConfig {
    /// Model asset (.json or .npz)
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Where the mesh of `export_index` is written
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub export_index: usize,
    #[serde(default)]
    pub seed: u64,
    /// Betas are uniform in [0, beta_scale)
    #[serde(default = "default_beta_scale")]
    pub beta_scale: f32,
    /// Axis-angle components are uniform in [0, theta_scale)
    #[serde(default = "default_theta_scale")]
    pub theta_scale: f32,
    /// ndarray, wgpu or candle
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_enable_pose_blend")]
    pub enable_pose_blend: bool,
}

fn default_model_path() -> String { "./data/smpl_female.json".to_string() }
fn default_output_path() -> String { "./out/vertices.obj".to_string() }
fn default_batch_size() -> usize { 1 }
fn default_beta_scale() -> f32 { 0.03 }
fn default_theta_scale() -> f32 { 0.2 }
fn default_backend() -> String { "ndarray".to_string() }
fn default_enable_pose_blend() -> bool { true }

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            output_path: default_output_path(),
            batch_size: default_batch_size(),
            export_index: 0,
            seed: 0,
            beta_scale: default_beta_scale(),
            theta_scale: default_theta_scale(),
            backend: default_backend(),
            enable_pose_blend: default_enable_pose_blend(),
        }
    }
}

impl LaunchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LaunchError> {
        let content = fs::read_to_string(path)?;
        let config: LaunchConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: LaunchConfig = toml::from_str("").unwrap();
        assert_eq!(config, LaunchConfig::default());
        assert_eq!(config.model_path, "./data/smpl_female.json");
        assert!((config.theta_scale - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 4\nseed = 42\nbackend = \"wgpu\"").unwrap();
        let config = LaunchConfig::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.seed, 42);
        assert_eq!(config.backend, "wgpu");
        assert_eq!(config.output_path, "./out/vertices.obj");
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = \"many\"").unwrap();
        assert!(matches!(LaunchConfig::load(file.path()), Err(LaunchError::Toml(_))));
    }
}
