use std::ops::{Add, AddAssign, Mul, Sub};

use crate::serde::{FieldKind, FieldValue, NetField};

pub const VEC2_CLASS_NAME: &str = "Vec2";

/// Net scheme of the [`Vec2`] value class; registered with
/// `ClassRegistry::register_value` by anyone whose scheme embeds vectors.
pub const VEC2_NET_SCHEME: [NetField; 2] = [
    NetField {
        name: "x",
        kind: FieldKind::F32,
    },
    NetField {
        name: "y",
        kind: FieldKind::F32,
    },
];

/// A 2D vector. Appears on the wire as a nested class instance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn copy_from(&mut self, other: &Vec2) {
        self.x = other.x;
        self.y = other.y;
    }

    pub fn to_field_value(self) -> FieldValue {
        FieldValue::Instance(
            VEC2_CLASS_NAME,
            vec![FieldValue::F32(self.x), FieldValue::F32(self.y)],
        )
    }

    pub fn from_field_value(value: &FieldValue) -> Option<Vec2> {
        let FieldValue::Instance(name, values) = value else {
            return None;
        };
        if *name != VEC2_CLASS_NAME || values.len() != 2 {
            return None;
        }
        match (&values[0], &values[1]) {
            (FieldValue::F32(x), FieldValue::F32(y)) => Some(Vec2::new(*x, *y)),
            _ => None,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Normalizes an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::TAU;
    let mut wrapped = angle % TWO_PI;
    if wrapped < 0.0 {
        wrapped += TWO_PI;
    }
    wrapped
}

/// Signed shortest-path rotation taking `from` to `to`, in `(-π, π]`.
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::TAU;
    let mut delta = wrap_angle(to) - wrap_angle(from);
    if delta > std::f32::consts::PI {
        delta -= TWO_PI;
    } else if delta <= -std::f32::consts::PI {
        delta += TWO_PI;
    }
    delta
}
