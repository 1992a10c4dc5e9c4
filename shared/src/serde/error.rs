use thiserror::Error;

/// Errors that can occur during wire serialization/deserialization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeError {
    /// Received a class id with no registered descriptor (possibly a
    /// malformed or stale payload)
    #[error("Unknown class id {class_id} received. The sender's class registry does not match ours")]
    UnknownClassId { class_id: u8 },

    /// Buffer ran out before a read completed
    #[error("Truncated buffer: needed {needed} more byte(s), {remaining} remaining")]
    TruncatedBuffer { needed: usize, remaining: usize },

    /// Two registered class names hash to the same 8-bit class id
    #[error("Class id collision: '{existing}' and '{incoming}' both hash to {class_id}")]
    ClassIdCollision {
        class_id: u8,
        existing: &'static str,
        incoming: &'static str,
    },

    /// Attempted to decode a top-level instance of a value-only class
    /// (registered without a constructor)
    #[error("Class '{class}' is registered as a value class and cannot be decoded at top level")]
    NotInstantiable { class: &'static str },

    /// A class name referenced by a nested instance value was never registered
    #[error("Class '{class}' referenced by a nested instance is not registered")]
    UnregisteredClass { class: &'static str },

    /// An object did not produce a value for a field its net scheme declares
    #[error("Class '{class}' produced no value for net scheme field '{field}'")]
    MissingField {
        class: &'static str,
        field: &'static str,
    },

    /// A field value did not match the kind its net scheme declares
    #[error("Field '{field}' value does not match its declared kind")]
    FieldTypeMismatch { field: &'static str },

    /// String exceeds the 65534 UTF-16 code unit wire limit
    #[error("String of {length} UTF-16 code units exceeds the wire limit of 65534")]
    StringTooLong { length: usize },

    /// Wire bytes did not decode to valid UTF-16
    #[error("String payload is not valid UTF-16")]
    MalformedString,

    /// A serialized object exceeds the payload frame's length prefix
    #[error("Serialized object of {size} bytes exceeds the 65535 byte frame limit")]
    ObjectTooLarge { size: usize },

    /// Structural problem in a sync payload frame
    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: &'static str },
}
