use cadence_shared::{EngineError, ObjectId, PlayerId, SerdeError};
use thiserror::Error;

/// Errors that can occur during server authority operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Assignment named a room that was never created
    #[error("Unknown room '{room}'")]
    UnknownRoom { room: String },

    /// Operation named a player that is not connected
    #[error("Unknown player {player_id}")]
    UnknownPlayer { player_id: PlayerId },

    /// Operation named an object that is not in the world
    #[error("Unknown object {id}")]
    UnknownObject { id: ObjectId },

    /// Simulation engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Serialization error while building a sync payload
    #[error("Serde error: {0}")]
    Serde(#[from] SerdeError),
}
