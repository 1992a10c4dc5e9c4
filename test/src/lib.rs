//! End-to-end test harness: a shared test object class, a toy integrator,
//! and a server/client pair wired over in-process pipes.

pub mod helpers;

pub use helpers::harness::{test_registry, Session, SimplePhysics};
pub use helpers::test_object::{Ship, SHIP_CLASS_NAME, SHIP_NET_SCHEME};
