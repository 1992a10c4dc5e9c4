use std::any::Any;
use std::collections::HashMap;

use crate::physical_object::PhysicalObject2D;
use crate::serde::{FieldKind, FieldValue, NetField, SerdeError};
use crate::types::{MessageIndex, ObjectId, PlayerId, DEFAULT_ROOM};

/// State common to every game object: identity, ownership, room membership
/// and attached components.
pub struct GameObjectBase {
    pub id: ObjectId,
    pub player_id: PlayerId,
    /// Pairs a client-predicted shadow with the server object it
    /// foreshadows. `None` for objects that were not input-created.
    pub input_id: Option<MessageIndex>,
    pub room_name: String,
    components: HashMap<String, Box<dyn Any>>,
}

impl GameObjectBase {
    pub fn new() -> Self {
        Self {
            id: 0,
            player_id: 0,
            input_id: None,
            room_name: DEFAULT_ROOM.to_string(),
            components: HashMap::new(),
        }
    }

    // Components are keyed by their type name and opaque to the engine;
    // queries only test for presence.

    pub fn set_component(&mut self, name: impl Into<String>, component: Box<dyn Any>) {
        self.components.insert(name.into(), component);
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn component<T: Any>(&self, name: &str) -> Option<&T> {
        self.components.get(name)?.downcast_ref()
    }

    pub fn component_mut<T: Any>(&mut self, name: &str) -> Option<&mut T> {
        self.components.get_mut(name)?.downcast_mut()
    }

    pub fn remove_component(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.components.remove(name)
    }

    /// Resolves the base portion of a net scheme field. Classes delegate
    /// here from their `get_field` before handling their own fields.
    pub fn get_net_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::I32(self.id as i32)),
            "player_id" => Some(FieldValue::I32(self.player_id as i32)),
            // 0 on the wire means "no input id"; message indices start at 1
            "input_id" => Some(FieldValue::I32(self.input_id.unwrap_or(0) as i32)),
            _ => None,
        }
    }

    /// Counterpart of `get_net_field` for decode and `sync_to`. Returns
    /// whether the field was a base field.
    pub fn set_net_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match (name, value) {
            ("id", FieldValue::I32(v)) => {
                self.id = *v as ObjectId;
                true
            }
            ("player_id", FieldValue::I32(v)) => {
                self.player_id = *v as PlayerId;
                true
            }
            ("input_id", FieldValue::I32(v)) => {
                self.input_id = if *v == 0 {
                    None
                } else {
                    Some(*v as MessageIndex)
                };
                true
            }
            _ => false,
        }
    }
}

impl Default for GameObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Net scheme entries shared by every game object class. Class scheme tables
/// start with these three fields.
pub const BASE_NET_SCHEME: [NetField; 3] = [
    NetField {
        name: "id",
        kind: FieldKind::I32,
    },
    NetField {
        name: "player_id",
        kind: FieldKind::I32,
    },
    NetField {
        name: "input_id",
        kind: FieldKind::I32,
    },
];

/// A synchronized game entity. Implementations declare an ordered net scheme
/// and expose typed field access; the serializer and `sync_to` both walk the
/// scheme, so wire layout and reconciliation never disagree.
pub trait GameObject: Any {
    fn base(&self) -> &GameObjectBase;
    fn base_mut(&mut self) -> &mut GameObjectBase;

    fn class_name(&self) -> &'static str;
    fn net_scheme(&self) -> &'static [NetField];

    fn get_field(&self, name: &str) -> Option<FieldValue>;
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), SerdeError>;

    fn id(&self) -> ObjectId {
        self.base().id
    }

    fn player_id(&self) -> PlayerId {
        self.base().player_id
    }

    fn input_id(&self) -> Option<MessageIndex> {
        self.base().input_id
    }

    fn room_name(&self) -> &str {
        &self.base().room_name
    }

    /// Called after the object is registered in a world.
    fn on_add_to_world(&mut self) {}

    /// Called right before the object leaves its world.
    fn on_remove_from_world(&mut self) {}

    /// Adopts the scalar net scheme fields of `other`. Nested class
    /// instances and lists keep their local identity, and a pruned string
    /// keeps the receiver's existing value.
    fn sync_to(&mut self, other: &dyn GameObject) {
        for field in other.net_scheme() {
            if matches!(field.kind, FieldKind::ClassInstance | FieldKind::List(_)) {
                continue;
            }
            let Some(value) = other.get_field(field.name) else {
                continue;
            };
            if matches!(value, FieldValue::Str(None)) {
                continue;
            }
            let _ = self.set_field(field.name, value);
        }
    }

    /// Snapshots bendable state, either from `from` or from the object
    /// itself. Non-physical objects have nothing to snapshot.
    fn save_state(&mut self, _from: Option<&dyn GameObject>) {}

    /// Schedules a bend from the saved snapshot toward the object's current
    /// state, then reverts to the snapshot. No-op without a saved snapshot.
    fn bend_from_saved_to_current(&mut self, _percent: f32, _is_local: bool, _increments: u32) {}

    /// Applies one scheduled bending increment. Called by the engine on
    /// every non-re-enactment step.
    fn apply_incremental_bending(&mut self, _dt_ms: f64) {}

    /// Access to the physical body, for physics integrators and bending.
    fn physical(&self) -> Option<&PhysicalObject2D> {
        None
    }

    fn physical_mut(&mut self) -> Option<&mut PhysicalObject2D> {
        None
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
