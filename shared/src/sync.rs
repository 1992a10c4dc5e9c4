use std::collections::HashMap;

use log::warn;

use crate::game_object::GameObject;
use crate::serde::{ByteReader, ClassRegistry, SerdeError};
use crate::types::{ObjectId, StepCount};

// Wire tags for the events of a sync payload.
pub const TAG_SYNC_HEADER: u8 = 1;
pub const TAG_OBJECT_CREATE: u8 = 2;
pub const TAG_OBJECT_UPDATE: u8 = 3;
pub const TAG_OBJECT_DESTROY: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEventKind {
    ObjectCreate,
    ObjectUpdate,
    ObjectDestroy,
}

impl SyncEventKind {
    pub fn tag(&self) -> u8 {
        match self {
            SyncEventKind::ObjectCreate => TAG_OBJECT_CREATE,
            SyncEventKind::ObjectUpdate => TAG_OBJECT_UPDATE,
            SyncEventKind::ObjectDestroy => TAG_OBJECT_DESTROY,
        }
    }
}

/// A decoded per-object event from a sync payload.
pub struct ObjectEvent {
    pub kind: SyncEventKind,
    pub step_count: StepCount,
    pub object: Box<dyn GameObject>,
}

/// A deserialized sync payload: the header plus every object event, grouped
/// by object id.
pub struct WorldSync {
    pub step_count: StepCount,
    pub full_update: bool,
    pub objects: HashMap<ObjectId, Vec<ObjectEvent>>,
    /// Events dropped because their class id was unknown. The payload frame
    /// length-prefixes each instance, so a single stale event never poisons
    /// the rest of the sync.
    pub dropped_events: u32,
}

impl WorldSync {
    /// Parses a payload framed by the network transmitter. Truncation aborts
    /// the whole payload; an unknown class id drops only that event.
    pub fn deserialize(payload: &[u8], registry: &ClassRegistry) -> Result<WorldSync, SerdeError> {
        let mut reader = ByteReader::new(payload);
        let event_count = reader.read_u16()?;
        if event_count == 0 {
            return Err(SerdeError::MalformedPayload {
                reason: "payload carries no events",
            });
        }

        // first event must be the header
        let tag = reader.read_u8()?;
        if tag != TAG_SYNC_HEADER {
            return Err(SerdeError::MalformedPayload {
                reason: "payload does not start with a sync header",
            });
        }
        let step_count = reader.read_u32()?;
        let full_update = reader.read_u8()? != 0;

        let mut sync = WorldSync {
            step_count,
            full_update,
            objects: HashMap::new(),
            dropped_events: 0,
        };

        for _ in 1..event_count {
            let tag = reader.read_u8()?;
            let kind = match tag {
                TAG_OBJECT_CREATE => SyncEventKind::ObjectCreate,
                TAG_OBJECT_UPDATE => SyncEventKind::ObjectUpdate,
                TAG_OBJECT_DESTROY => SyncEventKind::ObjectDestroy,
                TAG_SYNC_HEADER => {
                    return Err(SerdeError::MalformedPayload {
                        reason: "duplicate sync header",
                    })
                }
                _ => {
                    return Err(SerdeError::MalformedPayload {
                        reason: "unknown event tag",
                    })
                }
            };
            let event_step = reader.read_u32()?;
            let length = reader.read_u16()? as usize;
            let object_bytes = reader.read_bytes(length)?;

            let mut object_reader = ByteReader::new(object_bytes);
            match registry.decode_object(&mut object_reader) {
                Ok(object) => {
                    sync.objects.entry(object.id()).or_default().push(ObjectEvent {
                        kind,
                        step_count: event_step,
                        object,
                    });
                }
                Err(SerdeError::UnknownClassId { class_id }) => {
                    warn!("dropping sync event for unknown class id {class_id}");
                    sync.dropped_events += 1;
                }
                Err(error) => return Err(error),
            }
        }
        Ok(sync)
    }
}
