/// Contains Config properties which will be used by the Server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Steps between room syncs.
    pub update_rate: u32,
    /// Authoritative step rate in Hz.
    pub step_rate: u32,
    /// Every Nth sync for a room is a full update.
    pub full_sync_rate: u32,
    /// Seconds of silence before a player is disconnected. `0` disables the
    /// idle timeout.
    pub timeout_interval: f64,
    /// Whether creating an object requests an immediate sync for its room.
    pub update_on_object_creation: bool,
    /// Label attached to logged client traces. File sinks are the embedding
    /// application's concern.
    pub traces_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            update_rate: 6,
            step_rate: 60,
            full_sync_rate: 20,
            timeout_interval: 180.0,
            update_on_object_creation: true,
            traces_path: String::new(),
        }
    }
}

impl ServerConfig {
    pub fn step_period_ms(&self) -> f64 {
        1000.0 / f64::from(self.step_rate)
    }
}
