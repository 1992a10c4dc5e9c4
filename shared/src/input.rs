use std::collections::HashMap;

use crate::types::{MessageIndex, StepCount};

/// Game-specific input parameters. The engine only interprets `movement`:
/// inputs flagged as movement are replayed during client re-enactment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputOptions {
    pub movement: bool,
    pub data: HashMap<String, f32>,
}

impl InputOptions {
    pub fn movement() -> Self {
        Self {
            movement: true,
            data: HashMap::new(),
        }
    }
}

/// One captured input on its way from a client to the authoritative step.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDescriptor {
    /// Game-defined tag, e.g. `"up"` or `"fire"`.
    pub input: String,
    /// Monotonic per-player counter, stamped by the client.
    pub message_index: MessageIndex,
    /// Logical step at which the input was produced.
    pub step: StepCount,
    pub options: InputOptions,
}
