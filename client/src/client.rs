use std::collections::VecDeque;

use log::{info, warn};

use cadence_shared::{
    ClassRegistry, ClientMessage, EngineEvent, GameEngine, InputDescriptor, InputOptions,
    MessageIndex, MessageReceiver, MessageSender, PlayerId, Scheduler, SchedulerConfig,
    ServerMessage, StepCount, TraceBuffer, WorldSync,
};

use crate::client_config::ClientConfig;
use crate::network_monitor::NetworkMonitor;
use crate::strategy::{DriftCheck, SyncOutcome, SyncStrategy};
use crate::ClientError;

/// The predicting side of a session. Drives the local step loop, submits
/// inputs, hands arriving syncs to the active strategy, and disciplines its
/// step count against the server's.
pub struct Client {
    config: ClientConfig,
    registry: ClassRegistry,
    game: GameEngine,
    scheduler: Scheduler,
    strategy: SyncStrategy,
    sender: Box<dyn MessageSender<ClientMessage>>,
    receiver: Box<dyn MessageReceiver<ServerMessage>>,
    player_id: Option<PlayerId>,
    room_name: Option<String>,
    next_message_index: MessageIndex,
    pending_syncs: VecDeque<WorldSync>,
    highest_server_step: StepCount,
    received_any_sync: bool,
    network_monitor: NetworkMonitor,
    trace: TraceBuffer,
    steps_since_trace_flush: u32,
}

impl Client {
    /// Create a new Client. Fails if the configured sync strategy name is
    /// unknown.
    pub fn new(
        config: ClientConfig,
        registry: ClassRegistry,
        mut game: GameEngine,
        sender: Box<dyn MessageSender<ClientMessage>>,
        receiver: Box<dyn MessageReceiver<ServerMessage>>,
    ) -> Result<Self, ClientError> {
        let strategy = SyncStrategy::from_name(&config.sync_strategy, &config)?;
        let scheduler = Scheduler::new(SchedulerConfig {
            period_ms: config.step_period_ms,
            ..SchedulerConfig::default()
        });
        // locally created objects draw ids from the shadow space
        let id_base = game.client_id_space();
        game.world_mut().set_id_count(id_base);
        if !strategy.runs_physics() {
            game.set_physics_enabled(false);
        }
        Ok(Self {
            config,
            registry,
            game,
            scheduler,
            strategy,
            sender,
            receiver,
            player_id: None,
            room_name: None,
            next_message_index: 1,
            pending_syncs: VecDeque::new(),
            highest_server_step: 0,
            received_any_sync: false,
            network_monitor: NetworkMonitor::new(),
            trace: TraceBuffer::new(),
            steps_since_trace_flush: 0,
        })
    }

    pub fn start(&mut self, now_ms: f64) {
        self.game.start();
        self.scheduler.start(now_ms);
    }

    /// Must be called regularly with the current time; drains the server
    /// pipe and runs any local steps that are due.
    pub fn tick(&mut self, now_ms: f64) {
        self.receive_messages(now_ms);
        while let Some(tick) = self.scheduler.poll(now_ms) {
            if tick.running_slow {
                warn!("client step loop is running slow");
            }
            self.apply_pending_syncs();
            self.game.step(false, Some(now_ms / 1000.0), None, false);
            self.check_drift(DriftCheck::OnEveryStep);
            self.network_monitor.on_step(
                self.sender.as_ref(),
                now_ms,
                self.config.rtt_query_interval_steps,
            );
            self.flush_traces_on_cadence();
        }
    }

    /// Stamps, buffers, locally applies (when predicting) and transmits one
    /// input.
    pub fn send_input(&mut self, tag: &str, options: InputOptions) {
        let step = self.game.world().step_count + self.config.delay_input_count;
        let input = InputDescriptor {
            input: tag.to_string(),
            message_index: self.next_message_index,
            step,
            options,
        };
        self.next_message_index += 1;
        self.strategy.buffer_input(&input);
        if self.strategy.handles_inputs() {
            let player_id = self.player_id.unwrap_or(0);
            self.game.process_input(&input, player_id, false);
        }
        if self.sender.send(ClientMessage::Move(input)).is_err() {
            warn!("cannot send input to server: pipe closed");
        }
    }

    /// Records a diagnostic entry; batches flush to the server on the
    /// configured step cadence.
    pub fn record_trace(&mut self, data: impl Into<String>) {
        let time_ms = self.game.last_step_time().unwrap_or(0.0) * 1000.0;
        let step = self.game.world().step_count;
        self.trace.record(time_ms, step, data);
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    pub fn room_name(&self) -> Option<&str> {
        self.room_name.as_deref()
    }

    pub fn highest_server_step(&self) -> StepCount {
        self.highest_server_step
    }

    /// Smoothed transport round-trip estimate, in milliseconds.
    pub fn rtt(&self) -> Option<f64> {
        self.network_monitor.rtt()
    }

    pub fn game(&self) -> &GameEngine {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameEngine {
        &mut self.game
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Engine events (step hooks, object lifecycle, input dispatch)
    /// accumulated since the last drain. Drain regularly.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.game.drain_events()
    }

    /// True until the first sync applies. Games should hold off local
    /// object additions that could conflict with server state while this
    /// is set.
    pub fn need_first_sync(&self) -> bool {
        self.strategy.need_first_sync()
    }

    fn receive_messages(&mut self, now_ms: f64) {
        loop {
            match self.receiver.receive() {
                Ok(Some(message)) => match message {
                    ServerMessage::PlayerJoined { player_id, .. } => {
                        info!("joined as player {player_id}");
                        self.player_id = Some(player_id);
                    }
                    ServerMessage::WorldUpdate { payload } => {
                        match WorldSync::deserialize(&payload, &self.registry) {
                            Ok(sync) => {
                                self.highest_server_step =
                                    self.highest_server_step.max(sync.step_count);
                                self.received_any_sync = true;
                                self.pending_syncs.push_back(sync);
                            }
                            Err(error) => {
                                // the next full sync repairs whatever the
                                // lost payload carried
                                warn!("discarding malformed world update: {error}");
                            }
                        }
                    }
                    ServerMessage::RoomUpdate { from, to, .. } => {
                        info!("moved from room '{from}' to '{to}'");
                        self.room_name = Some(to);
                    }
                    ServerMessage::RttResponse { id } => {
                        self.network_monitor.on_response(id, now_ms);
                    }
                },
                Ok(None) => break,
                Err(_) => {
                    warn!("server pipe closed");
                    break;
                }
            }
        }
    }

    /// Applies queued syncs in arrival order. A sync is atomic with respect
    /// to the step loop: it runs between steps or not at all.
    fn apply_pending_syncs(&mut self) {
        while let Some(sync) = self.pending_syncs.pop_front() {
            let required = self.strategy.need_first_sync()
                || self.pending_syncs.len() >= self.strategy.syncs_buffer_length();
            let my_player_id = self.player_id.unwrap_or(0);
            match self
                .strategy
                .apply_sync(&mut self.game, sync, required, my_player_id)
            {
                SyncOutcome::Applied => {
                    self.check_drift(DriftCheck::OnServerSync);
                }
                SyncOutcome::Deferred(sync) => {
                    self.pending_syncs.push_front(sync);
                    break;
                }
                SyncOutcome::Ignored => {}
            }
        }
    }

    /// Compares the local step count against the strategy's target and
    /// nudges the scheduler, or snaps outright when re-enactment could not
    /// bridge the gap.
    fn check_drift(&mut self, check: DriftCheck) {
        if !self.received_any_sync {
            return;
        }
        let server_step = self.highest_server_step;
        let target = self.strategy.target_step(server_step);
        let lead = i64::from(self.game.world().step_count) - target;
        let thresholds = self.strategy.drift_thresholds();
        let band = match check {
            DriftCheck::OnServerSync => thresholds.on_server_sync,
            DriftCheck::OnEveryStep => thresholds.on_every_step,
        };
        if lead > band.max_lead {
            self.scheduler.delay_tick();
        } else if lead < -band.max_lag {
            let lag = -lead;
            if lag > i64::from(thresholds.client_reset) {
                warn!("client lags {lag} steps behind target; snapping to server step {server_step}");
                self.game.world_mut().step_count = server_step;
            } else {
                self.scheduler.hurry_tick();
            }
        }
    }

    fn flush_traces_on_cadence(&mut self) {
        self.steps_since_trace_flush += 1;
        if self.steps_since_trace_flush < self.config.trace_flush_interval_steps.max(1) {
            return;
        }
        self.steps_since_trace_flush = 0;
        if self.trace.is_empty() {
            return;
        }
        let entries = self.trace.take();
        if self.sender.send(ClientMessage::Trace(entries)).is_err() {
            warn!("cannot flush traces: pipe closed");
        }
    }
}
