/// Wire type of a single net scheme field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    I16,
    I32,
    F32,
    Str,
    /// A nested registered class, encoded as `class_id` followed by its own
    /// scheme fields.
    ClassInstance,
    /// `count: u16` followed by `count` items of the inner kind.
    List(&'static FieldKind),
}

/// One entry of a class's net scheme: an ordered, typed field declaration.
/// Field order is the wire order.
#[derive(Debug, Clone, Copy)]
pub struct NetField {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// A runtime value matching a [`FieldKind`]. Objects hand these to the
/// serializer and receive them back from `set_field` during decode and
/// `sync_to`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    I16(i16),
    I32(i32),
    F32(f32),
    /// `None` is the pruned marker: "keep whatever value you already have".
    Str(Option<String>),
    /// Class name plus field values in that class's scheme order.
    Instance(&'static str, Vec<FieldValue>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Whether this value is legal for the given kind. Used to reject
    /// mismatched `set_field` calls before they corrupt an object.
    pub fn matches_kind(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (FieldValue::U8(_), FieldKind::U8) => true,
            (FieldValue::I16(_), FieldKind::I16) => true,
            (FieldValue::I32(_), FieldKind::I32) => true,
            (FieldValue::F32(_), FieldKind::F32) => true,
            (FieldValue::Str(_), FieldKind::Str) => true,
            (FieldValue::Instance(_, _), FieldKind::ClassInstance) => true,
            (FieldValue::List(items), FieldKind::List(inner)) => {
                items.iter().all(|item| item.matches_kind(inner))
            }
            _ => false,
        }
    }
}
