//! # Cadence Client
//! The predicting half of a session: the local step loop, input submission,
//! sync intake, drift discipline, and the three reconciliation strategies.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod client;
mod client_config;
mod error;
mod network_monitor;
mod strategy;

pub use client::Client;
pub use client_config::ClientConfig;
pub use error::ClientError;
pub use network_monitor::NetworkMonitor;
pub use strategy::{
    DriftBand, DriftCheck, DriftThresholds, ExtrapolateConfig, ExtrapolateStrategy,
    FrameSyncConfig, FrameSyncStrategy, InterpolateConfig, InterpolateStrategy, SyncOutcome,
    SyncStrategy,
};
