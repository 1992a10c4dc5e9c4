use cadence_shared::{InputDescriptor, PlayerId, StepCount};

/// Events emitted by the server while ticking, drained by the embedding
/// application after each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Fired before the authoritative step runs, carrying the step about to
    /// be simulated.
    PreStep { step: StepCount },
    PostStep { step: StepCount },
    PlayerJoined { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
    /// An input was popped from its step bucket and dispatched to the game.
    ProcessedInput {
        player_id: PlayerId,
        input: InputDescriptor,
    },
    RoomUpdate {
        player_id: PlayerId,
        from: String,
        to: String,
    },
}
