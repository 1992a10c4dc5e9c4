use std::any::Any;

use cadence_shared::{
    FieldKind, FieldValue, GameObject, GameObjectBase, NetField, PhysicalObject2D, SerdeError,
    Vec2,
};

pub const SHIP_CLASS_NAME: &str = "Ship";

pub static SHIP_NET_SCHEME: [NetField; 8] = [
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
    NetField {
        name: "position",
        kind: FieldKind::ClassInstance,
    },
    NetField {
        name: "velocity",
        kind: FieldKind::ClassInstance,
    },
    NetField {
        name: "angle",
        kind: FieldKind::F32,
    },
    NetField {
        name: "angular_velocity",
        kind: FieldKind::F32,
    },
    NetField {
        name: "name",
        kind: FieldKind::Str,
    },
];

/// The game object class used by the end-to-end scenarios: a physical body
/// plus a string field, so prediction, bending and string pruning all get
/// exercised by one class.
#[derive(Default)]
pub struct Ship {
    pub physical: PhysicalObject2D,
    pub name: Option<String>,
}

impl Ship {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameObject for Ship {
    fn base(&self) -> &GameObjectBase {
        self.physical.base()
    }

    fn base_mut(&mut self) -> &mut GameObjectBase {
        self.physical.base_mut()
    }

    fn class_name(&self) -> &'static str {
        SHIP_CLASS_NAME
    }

    fn net_scheme(&self) -> &'static [NetField] {
        &SHIP_NET_SCHEME
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        if name == "name" {
            return Some(FieldValue::Str(self.name.clone()));
        }
        self.physical.get_field(name)
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), SerdeError> {
        if name == "name" {
            let FieldValue::Str(value) = value else {
                return Err(SerdeError::FieldTypeMismatch { field: "name" });
            };
            self.name = value;
            return Ok(());
        }
        self.physical.set_field(name, value)
    }

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
        if let Some(position) = other.get_field("position").as_ref().and_then(Vec2::from_field_value) {
            self.physical.position.copy_from(&position);
        }
        if let Some(velocity) = other.get_field("velocity").as_ref().and_then(Vec2::from_field_value) {
            self.physical.velocity.copy_from(&velocity);
        }
    }

    fn save_state(&mut self, from: Option<&dyn GameObject>) {
        self.physical.save_state(from);
    }

    fn bend_from_saved_to_current(&mut self, percent: f32, is_local: bool, increments: u32) {
        self.physical
            .bend_from_saved_to_current(percent, is_local, increments);
    }

    fn apply_incremental_bending(&mut self, dt_ms: f64) {
        self.physical.apply_incremental_bending(dt_ms);
    }

    fn physical(&self) -> Option<&PhysicalObject2D> {
        Some(&self.physical)
    }

    fn physical_mut(&mut self) -> Option<&mut PhysicalObject2D> {
        Some(&mut self.physical)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
