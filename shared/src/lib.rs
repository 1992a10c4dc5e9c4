//! # Cadence Shared
//! Common functionality shared between cadence-server & cadence-client
//! crates: the object model, wire serialization, the stepped simulation
//! engine, and the transport contracts.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod engine;
mod game_object;
mod input;
mod physical_object;
mod physics;
mod scheduler;
pub mod serde;
mod sync;
mod trace;
mod transmitter;
mod transport;
mod types;
mod vec2;
mod world;

pub use engine::{EngineConfig, EngineError, EngineEvent, GameEngine, InputHandler};
pub use game_object::{GameObject, GameObjectBase, BASE_NET_SCHEME};
pub use input::{InputDescriptor, InputOptions};
pub use physical_object::{
    BendingConfig, BendingField, PhysicalObject2D, PhysicalState,
    PHYSICAL_OBJECT_2D_CLASS_NAME, PHYSICAL_OBJECT_2D_NET_SCHEME,
};
pub use physics::Physics;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerTick};
pub use serde::{
    class_id_of, ByteReader, ByteWriter, ClassEntry, ClassRegistry, FieldKind, FieldValue,
    NetField, SerdeError, MAX_STRING_CODE_UNITS, PRUNED_STRING_MARKER,
};
pub use sync::{
    ObjectEvent, SyncEventKind, WorldSync, TAG_OBJECT_CREATE, TAG_OBJECT_DESTROY,
    TAG_OBJECT_UPDATE, TAG_SYNC_HEADER,
};
pub use trace::{TraceBuffer, TraceEntry};
pub use transmitter::{NetworkTransmitter, TransmitterEvent};
pub use transport::{
    ClientMessage, MessageChannel, MessageReceiver, MessageSender, RecvError, SendError,
    ServerMessage,
};
pub use types::{
    MessageIndex, ObjectId, PlayerId, StepCount, CLIENT_ID_SPACE, DEFAULT_ROOM,
    DEFAULT_STEP_PERIOD_MS,
};
pub use vec2::{shortest_angle_delta, wrap_angle, Vec2, VEC2_CLASS_NAME, VEC2_NET_SCHEME};
pub use world::{ObjectQuery, World};
