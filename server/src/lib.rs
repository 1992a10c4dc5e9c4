//! # Cadence Server
//! The authoritative half of a session: accepts connections, queues inputs
//! per step, runs the authoritative step loop, and emits per-room sync
//! payloads.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod error;
mod events;
mod player;
mod room;
mod server;
mod server_config;

pub use error::ServerError;
pub use events::ServerEvent;
pub use player::{Player, PlayerState};
pub use room::Room;
pub use server::Server;
pub use server_config::ServerConfig;
