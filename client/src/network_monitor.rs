use std::collections::HashMap;

use log::warn;

use cadence_shared::{ClientMessage, MessageSender};

/// Smoothing weight for new RTT samples.
const RTT_SMOOTHING: f64 = 0.1;

/// Measures round-trip time by sending periodic `RttQuery` probes and
/// matching the echoed ids. The estimate is an exponentially smoothed
/// average.
pub struct NetworkMonitor {
    next_query_id: u32,
    outstanding: HashMap<u32, f64>,
    rtt_ms: Option<f64>,
    steps_since_query: u32,
}

impl NetworkMonitor {
    pub fn new() -> Self {
        Self {
            next_query_id: 1,
            outstanding: HashMap::new(),
            rtt_ms: None,
            steps_since_query: 0,
        }
    }

    /// Called once per client step; sends a probe every `interval_steps`.
    pub fn on_step(
        &mut self,
        sender: &dyn MessageSender<ClientMessage>,
        now_ms: f64,
        interval_steps: u32,
    ) {
        self.steps_since_query += 1;
        if self.steps_since_query < interval_steps.max(1) {
            return;
        }
        self.steps_since_query = 0;
        let id = self.next_query_id;
        self.next_query_id += 1;
        self.outstanding.insert(id, now_ms);
        if sender.send(ClientMessage::RttQuery { id }).is_err() {
            warn!("cannot send RTT query: pipe closed");
            self.outstanding.remove(&id);
        }
    }

    pub fn on_response(&mut self, id: u32, now_ms: f64) {
        let Some(sent_ms) = self.outstanding.remove(&id) else {
            return;
        };
        let sample = now_ms - sent_ms;
        self.rtt_ms = Some(match self.rtt_ms {
            Some(previous) => previous * (1.0 - RTT_SMOOTHING) + sample * RTT_SMOOTHING,
            None => sample,
        });
    }

    /// Smoothed round-trip estimate in milliseconds; `None` until the first
    /// probe returns.
    pub fn rtt(&self) -> Option<f64> {
        self.rtt_ms
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_shared::{MessageChannel, MessageReceiver};

    #[test]
    fn probes_on_the_configured_cadence() {
        let (sender, mut receiver) = MessageChannel::unbounded::<ClientMessage>();
        let mut monitor = NetworkMonitor::new();
        for _ in 0..10 {
            monitor.on_step(sender.as_ref(), 0.0, 5);
        }
        let mut probes = 0;
        while let Ok(Some(_)) = receiver.receive() {
            probes += 1;
        }
        assert_eq!(probes, 2);
    }

    #[test]
    fn first_sample_sets_the_estimate() {
        let (sender, _receiver) = MessageChannel::unbounded::<ClientMessage>();
        let mut monitor = NetworkMonitor::new();
        monitor.on_step(sender.as_ref(), 100.0, 1);
        monitor.on_response(1, 140.0);
        assert_eq!(monitor.rtt(), Some(40.0));
    }

    #[test]
    fn unmatched_response_is_ignored() {
        let mut monitor = NetworkMonitor::new();
        monitor.on_response(99, 50.0);
        assert_eq!(monitor.rtt(), None);
    }
}
