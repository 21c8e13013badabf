use thiserror::Error;

/// Everything that can go wrong between loading an asset and exporting a mesh.
///
/// The pipeline stages only ever raise [`SmplError::Shape`]; the other
/// variants come from the asset and export collaborators.
#[derive(Debug, Error)]
pub enum SmplError {
    #[error("[{component}] {message}")]
    Shape { component: &'static str, message: String },
    #[error("[Asset] {message}")]
    Asset { message: String },
    #[error("[Data] {message}")]
    Data { message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Npz(#[from] ndarray_npy::ReadNpzError),
}

impl SmplError {
    pub fn shape(component: &'static str, message: impl Into<String>) -> Self {
        Self::Shape {
            component,
            message: message.into(),
        }
    }
    pub fn asset(message: impl Into<String>) -> Self {
        Self::Asset { message: message.into() }
    }
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, SmplError>;

/// Fails with a shape error unless `actual == expected`.
pub fn check_dims<const D: usize>(component: &'static str, what: &str, actual: [usize; D], expected: [usize; D]) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(SmplError::shape(component, format!("{what} has shape {actual:?}, expected {expected:?}")))
    }
}
