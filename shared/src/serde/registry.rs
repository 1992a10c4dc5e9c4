use std::collections::HashMap;

use crate::game_object::GameObject;
use crate::serde::byte_reader::ByteReader;
use crate::serde::byte_writer::ByteWriter;
use crate::serde::error::SerdeError;
use crate::serde::field::{FieldKind, FieldValue, NetField};

/// Stable 8-bit hash of a class name. Both peers must compute identical ids
/// for identical names, across builds and platforms: FNV-1a over the UTF-8
/// bytes, xor-folded down to 8 bits.
pub fn class_id_of(name: &str) -> u8 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    ((hash >> 24) ^ (hash >> 16) ^ (hash >> 8) ^ hash) as u8
}

/// Descriptor for one registered class: enough to decode an instance without
/// any game-engine reference.
pub struct ClassEntry {
    pub name: &'static str,
    pub net_scheme: &'static [NetField],
    create: Option<fn() -> Box<dyn GameObject>>,
}

/// Registry mapping `class_id` to class descriptors. Polymorphic decode is a
/// table lookup; classes contribute by registering at startup. Server and
/// client each build their own registry with the same set of classes.
pub struct ClassRegistry {
    entries: HashMap<u8, ClassEntry>,
    ids_by_name: HashMap<&'static str, u8>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ids_by_name: HashMap::new(),
        }
    }

    /// Registers a constructible game-object class. The probe instance
    /// supplies the class name and net scheme.
    pub fn register(&mut self, create: fn() -> Box<dyn GameObject>) -> Result<u8, SerdeError> {
        let probe = create();
        let name = probe.class_name();
        let net_scheme = probe.net_scheme();
        self.insert(ClassEntry {
            name,
            net_scheme,
            create: Some(create),
        })
    }

    /// Registers a value-only class (one that appears as a nested
    /// `ClassInstance` field but never at payload top level).
    pub fn register_value(
        &mut self,
        name: &'static str,
        net_scheme: &'static [NetField],
    ) -> Result<u8, SerdeError> {
        self.insert(ClassEntry {
            name,
            net_scheme,
            create: None,
        })
    }

    fn insert(&mut self, entry: ClassEntry) -> Result<u8, SerdeError> {
        let class_id = class_id_of(entry.name);
        if let Some(existing) = self.entries.get(&class_id) {
            if existing.name != entry.name {
                return Err(SerdeError::ClassIdCollision {
                    class_id,
                    existing: existing.name,
                    incoming: entry.name,
                });
            }
        }
        self.ids_by_name.insert(entry.name, class_id);
        self.entries.insert(class_id, entry);
        Ok(class_id)
    }

    pub fn entry(&self, class_id: u8) -> Option<&ClassEntry> {
        self.entries.get(&class_id)
    }

    pub fn entry_by_name(&self, name: &str) -> Option<&ClassEntry> {
        self.ids_by_name
            .get(name)
            .and_then(|class_id| self.entries.get(class_id))
    }

    /// Serializes an instance: `class_id: u8` followed by every net scheme
    /// field in order. String fields named in `pruned` are written as the
    /// pruned marker so the recipient keeps its existing value.
    pub fn encode_object(
        &self,
        object: &dyn GameObject,
        pruned: &[&str],
    ) -> Result<Vec<u8>, SerdeError> {
        let mut writer = ByteWriter::new();
        self.write_object(object, pruned, &mut writer)?;
        Ok(writer.to_bytes())
    }

    pub fn write_object(
        &self,
        object: &dyn GameObject,
        pruned: &[&str],
        writer: &mut ByteWriter,
    ) -> Result<(), SerdeError> {
        let class_name = object.class_name();
        writer.write_u8(class_id_of(class_name));
        for field in object.net_scheme() {
            if matches!(field.kind, FieldKind::Str) && pruned.contains(&field.name) {
                writer.write_string(None)?;
                continue;
            }
            let value = object
                .get_field(field.name)
                .ok_or(SerdeError::MissingField {
                    class: class_name,
                    field: field.name,
                })?;
            self.write_value(field, &value, writer)?;
        }
        Ok(())
    }

    /// Reads `class_id`, constructs a bare instance from the registry, and
    /// fills its fields in scheme order.
    pub fn decode_object(&self, reader: &mut ByteReader) -> Result<Box<dyn GameObject>, SerdeError> {
        let class_id = reader.read_u8()?;
        let entry = self
            .entries
            .get(&class_id)
            .ok_or(SerdeError::UnknownClassId { class_id })?;
        let create = entry
            .create
            .ok_or(SerdeError::NotInstantiable { class: entry.name })?;
        let mut object = create();
        for field in entry.net_scheme {
            let value = self.read_value(field, reader)?;
            object.set_field(field.name, value)?;
        }
        Ok(object)
    }

    fn write_value(
        &self,
        field: &NetField,
        value: &FieldValue,
        writer: &mut ByteWriter,
    ) -> Result<(), SerdeError> {
        if !value.matches_kind(&field.kind) {
            return Err(SerdeError::FieldTypeMismatch { field: field.name });
        }
        self.write_kinded_value(field, &field.kind, value, writer)
    }

    fn write_kinded_value(
        &self,
        field: &NetField,
        kind: &FieldKind,
        value: &FieldValue,
        writer: &mut ByteWriter,
    ) -> Result<(), SerdeError> {
        match (kind, value) {
            (FieldKind::U8, FieldValue::U8(v)) => writer.write_u8(*v),
            (FieldKind::I16, FieldValue::I16(v)) => writer.write_i16(*v),
            (FieldKind::I32, FieldValue::I32(v)) => writer.write_i32(*v),
            (FieldKind::F32, FieldValue::F32(v)) => writer.write_f32(*v),
            (FieldKind::Str, FieldValue::Str(v)) => writer.write_string(v.as_deref())?,
            (FieldKind::ClassInstance, FieldValue::Instance(name, values)) => {
                let entry = self
                    .entry_by_name(name)
                    .ok_or(SerdeError::UnregisteredClass { class: name })?;
                if values.len() != entry.net_scheme.len() {
                    return Err(SerdeError::FieldTypeMismatch { field: field.name });
                }
                writer.write_u8(class_id_of(name));
                for (nested_field, nested_value) in entry.net_scheme.iter().zip(values) {
                    self.write_value(nested_field, nested_value, writer)?;
                }
            }
            (FieldKind::List(inner), FieldValue::List(items)) => {
                if items.len() > usize::from(u16::MAX) {
                    return Err(SerdeError::FieldTypeMismatch { field: field.name });
                }
                writer.write_u16(items.len() as u16);
                for item in items {
                    self.write_kinded_value(field, inner, item, writer)?;
                }
            }
            _ => return Err(SerdeError::FieldTypeMismatch { field: field.name }),
        }
        Ok(())
    }

    fn read_value(
        &self,
        field: &NetField,
        reader: &mut ByteReader,
    ) -> Result<FieldValue, SerdeError> {
        self.read_kinded_value(field, &field.kind, reader)
    }

    fn read_kinded_value(
        &self,
        field: &NetField,
        kind: &FieldKind,
        reader: &mut ByteReader,
    ) -> Result<FieldValue, SerdeError> {
        let value = match kind {
            FieldKind::U8 => FieldValue::U8(reader.read_u8()?),
            FieldKind::I16 => FieldValue::I16(reader.read_i16()?),
            FieldKind::I32 => FieldValue::I32(reader.read_i32()?),
            FieldKind::F32 => FieldValue::F32(reader.read_f32()?),
            FieldKind::Str => FieldValue::Str(reader.read_string()?),
            FieldKind::ClassInstance => {
                let class_id = reader.read_u8()?;
                let entry = self
                    .entries
                    .get(&class_id)
                    .ok_or(SerdeError::UnknownClassId { class_id })?;
                let mut values = Vec::with_capacity(entry.net_scheme.len());
                for nested_field in entry.net_scheme {
                    values.push(self.read_value(nested_field, reader)?);
                }
                FieldValue::Instance(entry.name, values)
            }
            FieldKind::List(inner) => {
                let count = reader.read_u16()?;
                let mut items = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    items.push(self.read_kinded_value(field, inner, reader)?);
                }
                FieldValue::List(items)
            }
        };
        Ok(value)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
