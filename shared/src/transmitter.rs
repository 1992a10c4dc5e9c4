use crate::serde::{ByteWriter, SerdeError};
use crate::sync::{SyncEventKind, TAG_SYNC_HEADER};
use crate::types::StepCount;

/// One buffered networked event, holding its instance pre-serialized so the
/// server can byte-diff before committing it to a payload.
pub enum TransmitterEvent {
    Header {
        step_count: StepCount,
        full_update: bool,
    },
    Object {
        kind: SyncEventKind,
        step_count: StepCount,
        object: Vec<u8>,
    },
}

/// Accumulates networked events and frames them into one binary payload:
/// a sync header followed by any number of object create/update/destroy
/// events, each length-prefixed.
pub struct NetworkTransmitter {
    events: Vec<TransmitterEvent>,
}

impl NetworkTransmitter {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn add_event(&mut self, event: TransmitterEvent) {
        self.events.push(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn serialize_payload(&self) -> Result<Vec<u8>, SerdeError> {
        if self.events.len() > usize::from(u16::MAX) {
            return Err(SerdeError::MalformedPayload {
                reason: "too many events for one payload",
            });
        }
        let mut writer = ByteWriter::new();
        writer.write_u16(self.events.len() as u16);
        for event in &self.events {
            match event {
                TransmitterEvent::Header {
                    step_count,
                    full_update,
                } => {
                    writer.write_u8(TAG_SYNC_HEADER);
                    writer.write_u32(*step_count);
                    writer.write_u8(u8::from(*full_update));
                }
                TransmitterEvent::Object {
                    kind,
                    step_count,
                    object,
                } => {
                    if object.len() > usize::from(u16::MAX) {
                        return Err(SerdeError::ObjectTooLarge {
                            size: object.len(),
                        });
                    }
                    writer.write_u8(kind.tag());
                    writer.write_u32(*step_count);
                    writer.write_u16(object.len() as u16);
                    writer.write_bytes(object);
                }
            }
        }
        Ok(writer.to_bytes())
    }

    pub fn clear_payload(&mut self) {
        self.events.clear();
    }
}

impl Default for NetworkTransmitter {
    fn default() -> Self {
        Self::new()
    }
}
