/// Server-side partition. Each player belongs to exactly one room; a sync
/// only ever contains objects tagged to the same room.
pub struct Room {
    pub sync_counter: u32,
    pub request_immediate_sync: bool,
    pub request_full_sync: bool,
}

impl Room {
    pub fn new() -> Self {
        Self {
            sync_counter: 0,
            request_immediate_sync: false,
            request_full_sync: false,
        }
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}
