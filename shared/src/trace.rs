use crate::types::StepCount;

/// One diagnostic trace record, stamped with the step it was produced at.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub time_ms: f64,
    pub step: StepCount,
    pub data: String,
}

/// Accumulates trace entries between flushes. Clients batch these to the
/// server on a fixed step cadence.
pub struct TraceBuffer {
    entries: Vec<TraceEntry>,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, time_ms: f64, step: StepCount, data: impl Into<String>) {
        self.entries.push(TraceEntry {
            time_ms,
            step,
            data: data.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn take(&mut self) -> Vec<TraceEntry> {
        std::mem::take(&mut self.entries)
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
