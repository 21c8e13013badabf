use super::{
    betas::Betas,
    error::{Result, SmplError},
    metadata::SmplMetadata,
    pose::Pose,
    smpl_options::SmplOptions,
    types::BurnBackend,
};
use crate::{codec::matrices::SmplMatrices, smpl::smpl_gpu::SmplGPU};
#[cfg(feature = "candle")]
use burn::backend::Candle;
use burn::backend::NdArray;
#[cfg(feature = "wgpu")]
use burn::backend::Wgpu;
use log::info;
use ndarray as nd;
use smpl_utils::bshare::ToBurn;
use std::path::Path;

/// A model on whichever backend was picked at runtime
#[allow(clippy::large_enum_variant)]
#[derive(Clone)]
pub enum SmplDynamic {
    NdArray(SmplGPU<NdArray>),
    #[cfg(feature = "wgpu")]
    Wgpu(SmplGPU<Wgpu>),
    #[cfg(feature = "candle")]
    Candle(SmplGPU<Candle>),
}
impl SmplDynamic {
    /// # Errors
    /// Fails if the backend was not compiled in or the matrices are inconsistent
    pub fn new_from_matrices(backend: BurnBackend, matrices: &SmplMatrices, metadata: SmplMetadata) -> Result<Self> {
        match backend {
            BurnBackend::NdArray => {
                info!("Initializing with NdArray Backend");
                Ok(SmplDynamic::NdArray(SmplGPU::new_from_matrices(matrices, metadata)?))
            }
            #[cfg(feature = "wgpu")]
            BurnBackend::Wgpu => {
                info!("Initializing with Wgpu Backend");
                Ok(SmplDynamic::Wgpu(SmplGPU::new_from_matrices(matrices, metadata)?))
            }
            #[cfg(feature = "candle")]
            BurnBackend::Candle => {
                info!("Initializing with Candle Backend");
                Ok(SmplDynamic::Candle(SmplGPU::new_from_matrices(matrices, metadata)?))
            }
            #[allow(unreachable_patterns)]
            other => Err(SmplError::data(format!("backend {other} is not enabled in this build"))),
        }
    }

    /// # Errors
    /// Fails if the model file cannot be read or the backend is not available
    pub fn new_from_path(backend: BurnBackend, path: impl AsRef<Path>) -> Result<Self> {
        let matrices = SmplMatrices::from_path(path)?;
        let metadata = matrices.metadata()?;
        Self::new_from_matrices(backend, &matrices, metadata)
    }

    /// Get the Burn Backend the model was created with
    pub fn get_backend(&self) -> BurnBackend {
        match self {
            SmplDynamic::NdArray(_) => BurnBackend::NdArray,
            #[cfg(feature = "wgpu")]
            SmplDynamic::Wgpu(_) => BurnBackend::Wgpu,
            #[cfg(feature = "candle")]
            SmplDynamic::Candle(_) => BurnBackend::Candle,
        }
    }

    pub fn metadata(&self) -> &SmplMetadata {
        match self {
            SmplDynamic::NdArray(model) => &model.metadata,
            #[cfg(feature = "wgpu")]
            SmplDynamic::Wgpu(model) => &model.metadata,
            #[cfg(feature = "candle")]
            SmplDynamic::Candle(model) => &model.metadata,
        }
    }

    /// # Errors
    /// Fails on any shape mismatch, the previous result is dropped either way
    pub fn launch_with(
        &mut self,
        options: &SmplOptions,
        betas: &Betas,
        pose: &Pose,
        rest_pose: Option<&Pose>,
        extra: Option<&nd::Array3<f32>>,
    ) -> Result<()> {
        match self {
            SmplDynamic::NdArray(model) => {
                let extra = extra.map(|e| e.to_burn(&model.device));
                model.launch_with(options, betas, pose, rest_pose, extra)
            }
            #[cfg(feature = "wgpu")]
            SmplDynamic::Wgpu(model) => {
                let extra = extra.map(|e| e.to_burn(&model.device));
                model.launch_with(options, betas, pose, rest_pose, extra)
            }
            #[cfg(feature = "candle")]
            SmplDynamic::Candle(model) => {
                let extra = extra.map(|e| e.to_burn(&model.device));
                model.launch_with(options, betas, pose, rest_pose, extra)
            }
        }
    }

    /// # Errors
    /// Fails on any shape mismatch
    pub fn launch(&mut self, betas: &Betas, pose: &Pose) -> Result<()> {
        self.launch_with(&SmplOptions::default(), betas, pose, None, None)
    }

    /// Posed vertices of one batch element from the last launch
    /// # Errors
    /// Fails before a launch or on an out of range index
    pub fn vertices_at(&self, index: usize) -> Result<nd::Array2<f32>> {
        match self {
            SmplDynamic::NdArray(model) => model.vertices_at(index),
            #[cfg(feature = "wgpu")]
            SmplDynamic::Wgpu(model) => model.vertices_at(index),
            #[cfg(feature = "candle")]
            SmplDynamic::Candle(model) => model.vertices_at(index),
        }
    }

    /// # Errors
    /// Fails before a launch or on an out of range index
    pub fn out(&self, index: usize) -> Result<String> {
        match self {
            SmplDynamic::NdArray(model) => model.out(index),
            #[cfg(feature = "wgpu")]
            SmplDynamic::Wgpu(model) => model.out(index),
            #[cfg(feature = "candle")]
            SmplDynamic::Candle(model) => model.out(index),
        }
    }

    /// # Errors
    /// Fails before a launch, on an out of range index or when the file cannot be written
    pub fn export_obj(&self, index: usize, path: impl AsRef<Path>) -> Result<()> {
        match self {
            SmplDynamic::NdArray(model) => model.export_obj(index, path),
            #[cfg(feature = "wgpu")]
            SmplDynamic::Wgpu(model) => model.export_obj(index, path),
            #[cfg(feature = "candle")]
            SmplDynamic::Candle(model) => model.export_obj(index, path),
        }
    }
}
