/// Fraction of the period past the scheduled time after which a tick counts
/// as late.
const LATE_TICK_FRACTION: f64 = 0.3;

/// Consecutive late ticks before the loop is reported as running slow.
const SLOW_LOOP_STRIKES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Interval between ticks, in milliseconds.
    pub period_ms: f64,
    /// Bias applied to the next tick by `delay_tick` / `hurry_tick`.
    pub delay_ms: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_ms: crate::types::DEFAULT_STEP_PERIOD_MS,
            delay_ms: 10.0,
        }
    }
}

/// Outcome of a fired tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTick {
    /// Ten consecutive ticks arrived late; the caller should log it. The
    /// strike counter resets once reported.
    pub running_slow: bool,
}

/// Cooperative fixed-rate tick driver. The caller supplies the clock (in
/// milliseconds) and polls; the scheduler decides when a tick is due, tracks
/// lateness, and lets the client engine nudge the cadence forward or
/// backward to hold step alignment with the server.
pub struct Scheduler {
    config: SchedulerConfig,
    next_exec_time: f64,
    requested_delay: f64,
    delay_counter: u32,
    started: bool,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            next_exec_time: 0.0,
            requested_delay: 0.0,
            delay_counter: 0,
            started: false,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.next_exec_time = now_ms + self.config.period_ms;
        self.delay_counter = 0;
        self.requested_delay = 0.0;
        self.started = true;
    }

    /// Fires at most one tick. Call in a loop on every wake; a missed
    /// schedule is caught up as soon as the caller polls again.
    pub fn poll(&mut self, now_ms: f64) -> Option<SchedulerTick> {
        if !self.started || now_ms < self.next_exec_time {
            return None;
        }
        if now_ms > self.next_exec_time + self.config.period_ms * LATE_TICK_FRACTION {
            self.delay_counter += 1;
        } else {
            self.delay_counter = 0;
        }
        self.next_exec_time = now_ms + self.config.period_ms + self.requested_delay;
        self.requested_delay = 0.0;

        let mut running_slow = false;
        if self.delay_counter >= SLOW_LOOP_STRIKES {
            running_slow = true;
            self.delay_counter = 0;
        }
        Some(SchedulerTick { running_slow })
    }

    /// Pushes the next tick out by one delay interval.
    pub fn delay_tick(&mut self) {
        self.next_exec_time += self.config.delay_ms;
    }

    /// Pulls the next tick in by one delay interval.
    pub fn hurry_tick(&mut self) {
        self.next_exec_time -= self.config.delay_ms;
    }

    /// Adds a one-shot delay folded into the next tick's schedule.
    pub fn request_delay(&mut self, delay_ms: f64) {
        self.requested_delay += delay_ms;
    }

    /// Milliseconds until the next tick is due. Zero when overdue.
    pub fn next_wake_in(&self, now_ms: f64) -> f64 {
        (self.next_exec_time - now_ms).max(0.0)
    }
}
