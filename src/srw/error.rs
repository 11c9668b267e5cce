//! Driver error taxonomy

use thiserror::Error;

use super::engine::EngineError;

#[derive(Debug, Error)]
pub enum DriverError {
    /// Radiation source kind with no SRW translation
    #[error("Unsupported radiation source for SRW: {0}")]
    UnsupportedSource(String),

    /// Beamline component kind with no SRW translation
    #[error("Unsupported beamline component for SRW: {0}")]
    UnsupportedComponent(String),

    #[error("Invalid beamline: {0}")]
    InvalidBeamline(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
