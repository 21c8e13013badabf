#![deny(missing_docs)]
//! ## Crate Items Overview
//!
//! This section provides quick links to the main items in smpl-rs.
//!
//! ### Modules
//! - [`smpl_core`](crate::smpl_core) - The SMPL pipeline: blend shapes, joint regression,
//!   the kinematic chain, skinning, asset readers and the mesh exporter.
//! - [`smpl_utils`](crate::smpl_utils) - Rodrigues and euler conversions, ndarray to burn helpers.
//!
//! ## Usage
//! Load a model, launch it on a batch of shape and pose parameters and write one body out:
//!
//! ```no_run
//! use smpl_rs::prelude::*;
//!
//! let mut model = SmplGPU::<NdArray>::new_from_path("./data/smpl_female.json")?;
//! let betas = Betas::new_random(1, 10, 0.03, 0);
//! let pose = Pose::new_random(1, 24, 0.2, 0);
//! model.launch(&betas, &pose)?;
//! model.export_obj(0, "./out/vertices.obj")?;
//! # Ok::<(), SmplError>(())
//! ```
//!
//! The `smpl_launch` binary in `crates/smpl_cli` does the same from the command line.
pub use smpl_core;
pub use smpl_utils;

/// The items most callers need
pub mod prelude {
    pub use burn::backend::NdArray;
    pub use smpl_core::{
        codec::matrices::SmplMatrices,
        common::{
            betas::Betas,
            metadata::{smpl_metadata, SmplMetadata},
            outputs::SmplOutput,
            pose::Pose,
            smpl_model::SmplDynamic,
            smpl_options::SmplOptions,
            types::BurnBackend,
        },
        smpl::smpl_gpu::SmplGPU,
        Result, SmplError,
    };
}
