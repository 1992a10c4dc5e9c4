pub mod byte_reader;
pub mod byte_writer;
pub mod error;
pub mod field;
pub mod registry;

pub use byte_reader::ByteReader;
pub use byte_writer::{ByteWriter, MAX_STRING_CODE_UNITS, PRUNED_STRING_MARKER};
pub use error::SerdeError;
pub use field::{FieldKind, FieldValue, NetField};
pub use registry::{class_id_of, ClassEntry, ClassRegistry};
