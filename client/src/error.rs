use cadence_shared::{EngineError, SerdeError};
use thiserror::Error;

/// Errors that can occur during client engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The configured sync strategy name is not one of
    /// `extrapolate` / `interpolate` / `frameSync`. Fatal at construction.
    #[error("Unknown sync strategy '{name}'")]
    UnknownSyncStrategy { name: String },

    /// Simulation engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Serialization error
    #[error("Serde error: {0}")]
    Serde(#[from] SerdeError),
}
