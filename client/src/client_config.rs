use cadence_shared::DEFAULT_STEP_PERIOD_MS;

use crate::strategy::{ExtrapolateConfig, FrameSyncConfig, InterpolateConfig};

/// Contains Config properties which will be used by the Client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Local step period; nominally the same rate the server steps at.
    pub step_period_ms: f64,
    /// Which reconciliation strategy to run: `extrapolate`, `interpolate`
    /// or `frameSync`.
    pub sync_strategy: String,
    /// Artificial delay, in steps, added to every outgoing input. Useful to
    /// rehearse high-latency play on a local connection.
    pub delay_input_count: u32,
    /// Steps between RTT probes.
    pub rtt_query_interval_steps: u32,
    /// Steps between trace batch flushes to the server.
    pub trace_flush_interval_steps: u32,
    pub extrapolate: ExtrapolateConfig,
    pub interpolate: InterpolateConfig,
    pub frame_sync: FrameSyncConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            step_period_ms: DEFAULT_STEP_PERIOD_MS,
            sync_strategy: "extrapolate".to_string(),
            delay_input_count: 0,
            rtt_query_interval_steps: 60,
            trace_flush_interval_steps: 100,
            extrapolate: ExtrapolateConfig::default(),
            interpolate: InterpolateConfig::default(),
            frame_sync: FrameSyncConfig::default(),
        }
    }
}
