use std::any::Any;

use crate::game_object::{GameObject, GameObjectBase};
use crate::serde::{FieldKind, FieldValue, NetField, SerdeError};
use crate::vec2::{shortest_angle_delta, wrap_angle, Vec2};

pub const PHYSICAL_OBJECT_2D_CLASS_NAME: &str = "PhysicalObject2D";

pub const PHYSICAL_OBJECT_2D_NET_SCHEME: [NetField; 7] = [
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
];

/// Snapshot of the bendable fields of a physical object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
}

/// Per-field bending behavior. `percent` overrides the strategy-supplied
/// bending percentage; a computed per-increment delta whose magnitude falls
/// outside `[min, max]` collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendingField {
    pub percent: Option<f32>,
    pub min: f32,
    pub max: f32,
}

impl Default for BendingField {
    fn default() -> Self {
        Self {
            percent: None,
            min: 0.0,
            max: f32::INFINITY,
        }
    }
}

/// Bending behavior of a physical object, as data rather than subclassing.
/// The `*_local` entries apply to objects owned by the local player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendingConfig {
    pub position: BendingField,
    pub velocity: BendingField,
    pub angle: BendingField,
    pub angular_velocity: BendingField,
    pub position_local: Option<BendingField>,
    pub velocity_local: Option<BendingField>,
    pub angle_local: Option<BendingField>,
    pub angular_velocity_local: Option<BendingField>,
}

impl Default for BendingConfig {
    fn default() -> Self {
        Self {
            position: BendingField::default(),
            velocity: BendingField::default(),
            angle: BendingField::default(),
            angular_velocity: BendingField::default(),
            position_local: None,
            velocity_local: None,
            // never bend the local player's own aim
            angle_local: Some(BendingField {
                percent: Some(0.0),
                ..BendingField::default()
            }),
            angular_velocity_local: None,
        }
    }
}

/// A game object with a 2D body: position, velocity, angle and angular
/// velocity, plus the transient bending state used to smooth server
/// corrections over multiple steps.
pub struct PhysicalObject2D {
    pub base: GameObjectBase,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub bending: BendingConfig,

    saved_copy: Option<PhysicalState>,
    bending_position_delta: Vec2,
    bending_velocity_delta: Vec2,
    bending_angle_delta: f32,
    bending_av_delta: f32,
    bending_increments: u32,
    bending_target: Option<PhysicalState>,
}

impl PhysicalObject2D {
    pub fn new() -> Self {
        Self {
            base: GameObjectBase::new(),
            position: Vec2::default(),
            velocity: Vec2::default(),
            angle: 0.0,
            angular_velocity: 0.0,
            bending: BendingConfig::default(),
            saved_copy: None,
            bending_position_delta: Vec2::default(),
            bending_velocity_delta: Vec2::default(),
            bending_angle_delta: 0.0,
            bending_av_delta: 0.0,
            bending_increments: 0,
            bending_target: None,
        }
    }

    pub fn state(&self) -> PhysicalState {
        PhysicalState {
            position: self.position,
            velocity: self.velocity,
            angle: self.angle,
            angular_velocity: self.angular_velocity,
        }
    }

    fn set_state(&mut self, state: &PhysicalState) {
        self.position = state.position;
        self.velocity = state.velocity;
        self.angle = state.angle;
        self.angular_velocity = state.angular_velocity;
    }

    pub fn saved_copy(&self) -> Option<&PhysicalState> {
        self.saved_copy.as_ref()
    }

    pub fn bending_increments(&self) -> u32 {
        self.bending_increments
    }

    pub fn bending_position_delta(&self) -> Vec2 {
        self.bending_position_delta
    }

    pub fn bending_target(&self) -> Option<&PhysicalState> {
        self.bending_target.as_ref()
    }

    fn bending_field(&self, field: &BendingField, local: &Option<BendingField>, is_local: bool) -> BendingField {
        if is_local {
            if let Some(local_field) = local {
                return *local_field;
            }
        }
        *field
    }

    /// Schedules a bend: computes per-increment deltas taking `from` to the
    /// object's current values, snapshots the current values as the bending
    /// target, then reverts the object to `from`. Each following
    /// [`apply_incremental_bending`](Self::apply_incremental_bending) call
    /// replays one increment.
    pub fn bend_to_current(
        &mut self,
        from: &PhysicalState,
        percent: f32,
        is_local: bool,
        increments: u32,
    ) {
        let increments = increments.max(1);
        let increments_f = increments as f32;
        let bending = self.bending;

        let field = self.bending_field(&bending.position, &bending.position_local, is_local);
        let mut position_delta =
            (self.position - from.position) * (field.percent.unwrap_or(percent) / increments_f);
        let magnitude = position_delta.length();
        if magnitude < field.min || magnitude > field.max {
            position_delta = Vec2::default();
        }

        let field = self.bending_field(&bending.velocity, &bending.velocity_local, is_local);
        let mut velocity_delta =
            (self.velocity - from.velocity) * (field.percent.unwrap_or(percent) / increments_f);
        let magnitude = velocity_delta.length();
        if magnitude < field.min || magnitude > field.max {
            velocity_delta = Vec2::default();
        }

        let field = self.bending_field(&bending.angle, &bending.angle_local, is_local);
        let mut angle_delta = shortest_angle_delta(from.angle, self.angle)
            * field.percent.unwrap_or(percent)
            / increments_f;
        if angle_delta.abs() < field.min || angle_delta.abs() > field.max {
            angle_delta = 0.0;
        }

        let field = self.bending_field(
            &bending.angular_velocity,
            &bending.angular_velocity_local,
            is_local,
        );
        let mut av_delta = (self.angular_velocity - from.angular_velocity)
            * field.percent.unwrap_or(percent)
            / increments_f;
        if av_delta.abs() < field.min || av_delta.abs() > field.max {
            av_delta = 0.0;
        }

        self.bending_target = Some(self.state());
        self.set_state(from);
        self.bending_position_delta = position_delta;
        self.bending_velocity_delta = velocity_delta;
        self.bending_angle_delta = angle_delta;
        self.bending_av_delta = av_delta;
        self.bending_increments = increments;
    }
}

impl Default for PhysicalObject2D {
    fn default() -> Self {
        Self::new()
    }
}

impl GameObject for PhysicalObject2D {
    fn base(&self) -> &GameObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GameObjectBase {
        &mut self.base
    }

    fn class_name(&self) -> &'static str {
        PHYSICAL_OBJECT_2D_CLASS_NAME
    }

    fn net_scheme(&self) -> &'static [NetField] {
        &PHYSICAL_OBJECT_2D_NET_SCHEME
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        if let Some(value) = self.base.get_net_field(name) {
            return Some(value);
        }
        match name {
            "position" => Some(self.position.to_field_value()),
            "velocity" => Some(self.velocity.to_field_value()),
            "angle" => Some(FieldValue::F32(self.angle)),
            "angular_velocity" => Some(FieldValue::F32(self.angular_velocity)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), SerdeError> {
        if self.base.set_net_field(name, &value) {
            return Ok(());
        }
        match (name, &value) {
            ("position", _) => {
                self.position = Vec2::from_field_value(&value)
                    .ok_or(SerdeError::FieldTypeMismatch { field: "position" })?;
            }
            ("velocity", _) => {
                self.velocity = Vec2::from_field_value(&value)
                    .ok_or(SerdeError::FieldTypeMismatch { field: "velocity" })?;
            }
            ("angle", FieldValue::F32(v)) => self.angle = *v,
            ("angular_velocity", FieldValue::F32(v)) => self.angular_velocity = *v,
            ("angle", _) => return Err(SerdeError::FieldTypeMismatch { field: "angle" }),
            ("angular_velocity", _) => {
                return Err(SerdeError::FieldTypeMismatch {
                    field: "angular_velocity",
                })
            }
            _ => {
                return Err(SerdeError::MissingField {
                    class: PHYSICAL_OBJECT_2D_CLASS_NAME,
                    field: "unknown",
                })
            }
        }
        Ok(())
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
        // vectors keep their identity but adopt the server's values
        if let Some(position) = other.get_field("position").as_ref().and_then(Vec2::from_field_value) {
            self.position.copy_from(&position);
        }
        if let Some(velocity) = other.get_field("velocity").as_ref().and_then(Vec2::from_field_value) {
            self.velocity.copy_from(&velocity);
        }
    }

    fn save_state(&mut self, from: Option<&dyn GameObject>) {
        let snapshot = match from.and_then(|other| other.physical()) {
            Some(other) => other.state(),
            None => self.state(),
        };
        self.saved_copy = Some(snapshot);
    }

    fn bend_from_saved_to_current(&mut self, percent: f32, is_local: bool, increments: u32) {
        let Some(saved) = self.saved_copy.take() else {
            return;
        };
        self.bend_to_current(&saved, percent, is_local, increments);
    }

    fn apply_incremental_bending(&mut self, dt_ms: f64) {
        if self.bending_increments == 0 {
            return;
        }
        let time_factor = (dt_ms / crate::types::DEFAULT_STEP_PERIOD_MS) as f32;
        self.position += self.bending_position_delta * time_factor;
        self.velocity += self.bending_velocity_delta * time_factor;
        self.angle = wrap_angle(self.angle + self.bending_angle_delta * time_factor);
        self.angular_velocity += self.bending_av_delta * time_factor;
        self.bending_increments -= 1;
    }

    fn physical(&self) -> Option<&PhysicalObject2D> {
        Some(self)
    }

    fn physical_mut(&mut self) -> Option<&mut PhysicalObject2D> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
