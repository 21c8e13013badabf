use strum_macros::{Display, EnumIter, EnumString};

/// Burn backends a model can be initialised on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BurnBackend {
    NdArray,
    Wgpu,
    Candle,
}
impl BurnBackend {
    /// Whether this binary was built with support for the backend
    pub fn is_available(self) -> bool {
        match self {
            Self::NdArray => true,
            Self::Wgpu => cfg!(feature = "wgpu"),
            Self::Candle => cfg!(feature = "candle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_backend_names() {
        assert_eq!(BurnBackend::from_str("ndarray").unwrap(), BurnBackend::NdArray);
        assert_eq!(BurnBackend::from_str("wgpu").unwrap(), BurnBackend::Wgpu);
        assert!(BurnBackend::from_str("cuda").is_err());
        assert_eq!(BurnBackend::Candle.to_string(), "candle");
    }

    #[test]
    fn test_ndarray_always_available() {
        assert!(BurnBackend::NdArray.is_available());
    }
}
