use cadence_shared::{
    ClientMessage, MessageIndex, MessageReceiver, MessageSender, PlayerId, ServerMessage,
};

/// Whether the player has received a world snapshot since joining or moving
/// rooms. New players force the next room sync to be a full update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    New,
    Synced,
}

/// One connected player: its message pipe, room membership and liveness
/// bookkeeping.
pub struct Player {
    pub player_id: PlayerId,
    pub state: PlayerState,
    pub room_name: String,
    pub join_time_ms: f64,
    /// Any received packet refreshes this; silence beyond the configured
    /// timeout disconnects the player.
    pub last_heard_ms: f64,
    pub last_handled_input: Option<MessageIndex>,
    pub sender: Box<dyn MessageSender<ServerMessage>>,
    pub receiver: Box<dyn MessageReceiver<ClientMessage>>,
}
