use std::collections::{BTreeMap, HashMap};

use log::{error, info, trace, warn};

use cadence_shared::{
    ClassRegistry, ClientMessage, EngineEvent, FieldKind, FieldValue, GameEngine, GameObject,
    InputDescriptor, MessageIndex, MessageReceiver, MessageSender, NetworkTransmitter, ObjectId,
    PlayerId, Scheduler, SchedulerConfig, ServerMessage, StepCount, SyncEventKind,
    TransmitterEvent, DEFAULT_ROOM,
};

use crate::events::ServerEvent;
use crate::player::{Player, PlayerState};
use crate::room::Room;
use crate::server_config::ServerConfig;
use crate::ServerError;

/// The authoritative side of a session. Owns the true world, drains player
/// input queues into the step, and emits per-room sync payloads over each
/// player's message pipe.
pub struct Server {
    config: ServerConfig,
    registry: ClassRegistry,
    game: GameEngine,
    scheduler: Scheduler,
    players: HashMap<PlayerId, Player>,
    /// Pending inputs keyed by `(player, step)`; the flat ordered map gives
    /// ascending-step pops per player, and each bucket preserves arrival
    /// order.
    input_queues: BTreeMap<(PlayerId, StepCount), Vec<InputDescriptor>>,
    rooms: HashMap<String, Room>,
    /// Last transmitted bytes per object, compared byte-wise to decide
    /// whether a diff sync can skip the object.
    obj_memory: HashMap<ObjectId, Vec<u8>>,
    /// Last transmitted string field values per object, for pruning.
    sent_strings: HashMap<ObjectId, HashMap<&'static str, String>>,
    /// Destroy events awaiting the next sync of their room, carrying the
    /// last bytes clients saw for the object.
    pending_destroys: HashMap<String, Vec<Vec<u8>>>,
    events: Vec<ServerEvent>,
}

impl Server {
    /// Create a new Server. The registry must hold every class that will
    /// cross the wire; clients build a matching registry of their own.
    pub fn new(config: ServerConfig, registry: ClassRegistry, game: GameEngine) -> Self {
        let scheduler = Scheduler::new(SchedulerConfig {
            period_ms: config.step_period_ms(),
            ..SchedulerConfig::default()
        });
        let mut rooms = HashMap::new();
        rooms.insert(DEFAULT_ROOM.to_string(), Room::new());
        Self {
            config,
            registry,
            game,
            scheduler,
            players: HashMap::new(),
            input_queues: BTreeMap::new(),
            rooms,
            obj_memory: HashMap::new(),
            sent_strings: HashMap::new(),
            pending_destroys: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.game.start();
        self.scheduler.start(now_ms);
    }

    /// Must be called regularly with the current time; receives messages
    /// from all players and runs any authoritative steps that are due.
    pub fn tick(&mut self, now_ms: f64) {
        self.receive_messages(now_ms);
        self.check_timeouts(now_ms);
        while let Some(tick) = self.scheduler.poll(now_ms) {
            if tick.running_slow {
                warn!("server step loop is running slow");
            }
            self.step(now_ms);
        }
    }

    // Connections

    /// Accepts a connection, allocating the next player id.
    pub fn connect_player(
        &mut self,
        sender: Box<dyn MessageSender<ServerMessage>>,
        receiver: Box<dyn MessageReceiver<ClientMessage>>,
        now_ms: f64,
    ) -> PlayerId {
        self.connect_player_with_id(None, sender, receiver, now_ms)
    }

    /// Accepts a connection under an externally assigned player id, or
    /// allocates one by bumping the world's player count.
    pub fn connect_player_with_id(
        &mut self,
        player_id: Option<PlayerId>,
        sender: Box<dyn MessageSender<ServerMessage>>,
        receiver: Box<dyn MessageReceiver<ClientMessage>>,
        now_ms: f64,
    ) -> PlayerId {
        let player_id = player_id.unwrap_or_else(|| {
            self.game.world_mut().player_count += 1;
            self.game.world().player_count
        });
        let player = Player {
            player_id,
            state: PlayerState::New,
            room_name: DEFAULT_ROOM.to_string(),
            join_time_ms: now_ms,
            last_heard_ms: now_ms,
            last_handled_input: None,
            sender,
            receiver,
        };
        if player
            .sender
            .send(ServerMessage::PlayerJoined {
                player_id,
                join_time_ms: now_ms,
                disconnect_time_ms: 0.0,
            })
            .is_err()
        {
            warn!("cannot greet player {player_id}: pipe closed");
        }
        self.players.insert(player_id, player);
        self.events.push(ServerEvent::PlayerJoined { player_id });
        info!("player {player_id} joined");
        player_id
    }

    pub fn disconnect_player(&mut self, player_id: PlayerId) {
        if self.players.remove(&player_id).is_none() {
            return;
        }
        // drop this player's pending inputs
        let stale: Vec<(PlayerId, StepCount)> = self
            .input_queues
            .range((player_id, 0)..=(player_id, StepCount::MAX))
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            self.input_queues.remove(&key);
        }
        self.events
            .push(ServerEvent::PlayerDisconnected { player_id });
        info!("player {player_id} disconnected");
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_room(&self, player_id: PlayerId) -> Option<&str> {
        self.players
            .get(&player_id)
            .map(|player| player.room_name.as_str())
    }

    /// Highest input message index received from the player.
    pub fn last_handled_input(&self, player_id: PlayerId) -> Option<MessageIndex> {
        self.players
            .get(&player_id)
            .and_then(|player| player.last_handled_input)
    }

    // Rooms

    pub fn create_room(&mut self, name: &str) {
        self.rooms.entry(name.to_string()).or_insert_with(Room::new);
    }

    pub fn room_exists(&self, name: &str) -> bool {
        self.rooms.contains_key(name)
    }

    /// Tags an object to a room; from the next sync on it only reaches
    /// players in that room.
    pub fn assign_object_to_room(&mut self, id: ObjectId, room: &str) -> Result<(), ServerError> {
        let object = self
            .game
            .world_mut()
            .get_mut(id)
            .ok_or(ServerError::UnknownObject { id })?;
        object.base_mut().room_name = room.to_string();
        Ok(())
    }

    /// Moves a player between rooms. The destination room immediately gets
    /// a full sync so the player starts from a complete snapshot. Assigning
    /// to an unknown room leaves the player where it is.
    pub fn assign_player_to_room(
        &mut self,
        player_id: PlayerId,
        room: &str,
    ) -> Result<(), ServerError> {
        if !self.rooms.contains_key(room) {
            error!("cannot assign player {player_id} to unknown room '{room}'");
            return Err(ServerError::UnknownRoom {
                room: room.to_string(),
            });
        }
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(ServerError::UnknownPlayer { player_id })?;
        let from = std::mem::replace(&mut player.room_name, room.to_string());
        if player
            .sender
            .send(ServerMessage::RoomUpdate {
                player_id,
                from: from.clone(),
                to: room.to_string(),
            })
            .is_err()
        {
            warn!("cannot notify player {player_id} of room update: pipe closed");
        }
        self.events.push(ServerEvent::RoomUpdate {
            player_id,
            from,
            to: room.to_string(),
        });
        let destination = self.rooms.get_mut(room).expect("room checked above");
        destination.request_immediate_sync = true;
        destination.request_full_sync = true;
        Ok(())
    }

    // Objects

    /// Registers an object with the world; the next sync of its room will
    /// carry an `ObjectCreate` for it.
    pub fn add_object(&mut self, object: Box<dyn GameObject>) -> Option<ObjectId> {
        self.game.add_object_to_world(object)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Result<(), ServerError> {
        self.game.remove_object_from_world(id)?;
        Ok(())
    }

    pub fn game(&self) -> &GameEngine {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameEngine {
        &mut self.game
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn drain_events(&mut self) -> Vec<ServerEvent> {
        std::mem::take(&mut self.events)
    }

    // Inbound path

    fn receive_messages(&mut self, now_ms: f64) {
        let player_ids: Vec<PlayerId> = self.players.keys().copied().collect();
        let mut closed: Vec<PlayerId> = Vec::new();
        for player_id in player_ids {
            loop {
                let Some(player) = self.players.get_mut(&player_id) else {
                    break;
                };
                match player.receiver.receive() {
                    Ok(Some(message)) => {
                        player.last_heard_ms = now_ms;
                        match message {
                            ClientMessage::Move(input) => {
                                player.last_handled_input = Some(input.message_index);
                                let step = input.step;
                                self.input_queues
                                    .entry((player_id, step))
                                    .or_default()
                                    .push(input);
                            }
                            ClientMessage::Trace(entries) => {
                                for entry in entries {
                                    trace!(
                                        "[{}] player {player_id} step {} t={:.1}: {}",
                                        self.config.traces_path,
                                        entry.step,
                                        entry.time_ms,
                                        entry.data
                                    );
                                }
                            }
                            ClientMessage::RttQuery { id } => {
                                if player
                                    .sender
                                    .send(ServerMessage::RttResponse { id })
                                    .is_err()
                                {
                                    warn!("cannot answer RTT query from player {player_id}");
                                }
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(_) => {
                        closed.push(player_id);
                        break;
                    }
                }
            }
        }
        for player_id in closed {
            self.disconnect_player(player_id);
        }
    }

    fn check_timeouts(&mut self, now_ms: f64) {
        if self.config.timeout_interval <= 0.0 {
            return;
        }
        let timeout_ms = self.config.timeout_interval * 1000.0;
        let idle: Vec<PlayerId> = self
            .players
            .values()
            .filter(|player| now_ms - player.last_heard_ms > timeout_ms)
            .map(|player| player.player_id)
            .collect();
        for player_id in idle {
            info!("player {player_id} timed out");
            self.disconnect_player(player_id);
        }
    }

    // Authoritative step

    /// Runs one authoritative step: dispatch due inputs, advance the world,
    /// emit room syncs on the update cadence, prune stale send memory.
    pub fn step(&mut self, now_ms: f64) {
        let upcoming = self.game.world().step_count + 1;
        self.events.push(ServerEvent::PreStep { step: upcoming });

        self.dispatch_due_inputs();

        self.game.step(false, Some(now_ms / 1000.0), None, false);
        let step = self.game.world().step_count;

        self.handle_engine_events();
        self.sync_rooms(step);

        // forget objects that no longer exist
        let world = self.game.world();
        self.obj_memory.retain(|id, _| world.contains(*id));
        self.sent_strings.retain(|id, _| world.contains(*id));

        self.events.push(ServerEvent::PostStep { step });
    }

    /// Pops, per player, the oldest input bucket that is due, and dispatches
    /// its inputs in arrival order. A popped bucket can never be
    /// re-dispatched.
    fn dispatch_due_inputs(&mut self) {
        let current_step = self.game.world().step_count;
        let player_ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for player_id in player_ids {
            let due_key = self
                .input_queues
                .range((player_id, 0)..=(player_id, StepCount::MAX))
                .next()
                .map(|(key, _)| *key)
                .filter(|(_, step)| *step <= current_step);
            let Some(key) = due_key else {
                continue;
            };
            let inputs = self.input_queues.remove(&key).unwrap_or_default();
            for input in inputs {
                self.events.push(ServerEvent::ProcessedInput {
                    player_id,
                    input: input.clone(),
                });
                self.game.process_input(&input, player_id, true);
            }
        }
    }

    fn handle_engine_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                EngineEvent::ObjectAdded { id } => {
                    if !self.config.update_on_object_creation {
                        continue;
                    }
                    let Some(room_name) = self
                        .game
                        .world()
                        .get(id)
                        .map(|object| object.room_name().to_string())
                    else {
                        continue;
                    };
                    if let Some(room) = self.rooms.get_mut(&room_name) {
                        room.request_immediate_sync = true;
                    }
                }
                EngineEvent::ObjectRemoved { id, room_name } => {
                    // clients that never saw the object need no destroy
                    if let Some(bytes) = self.obj_memory.remove(&id) {
                        self.pending_destroys
                            .entry(room_name)
                            .or_default()
                            .push(bytes);
                    }
                    self.sent_strings.remove(&id);
                }
                _ => {}
            }
        }
    }

    fn sync_rooms(&mut self, step: StepCount) {
        let at_update_step = step % self.config.update_rate == 0;
        let room_names: Vec<String> = self.rooms.keys().cloned().collect();
        for room_name in room_names {
            let due = {
                let room = self.rooms.get(&room_name).expect("room listed above");
                at_update_step || room.request_immediate_sync
            };
            if !due {
                continue;
            }
            let new_player = self
                .players
                .values()
                .any(|player| player.room_name == room_name && player.state == PlayerState::New);
            let full = {
                let room = self.rooms.get_mut(&room_name).expect("room listed above");
                let cadence_full = room.sync_counter % self.config.full_sync_rate == 0;
                room.sync_counter += 1;
                let full = cadence_full || room.request_full_sync || new_player;
                room.request_immediate_sync = false;
                room.request_full_sync = false;
                full
            };
            let payload = match self.serialize_room_update(&room_name, full, step) {
                Ok(payload) => payload,
                Err(error) => {
                    error!("cannot serialize update for room '{room_name}': {error}");
                    continue;
                }
            };
            for player in self
                .players
                .values_mut()
                .filter(|player| player.room_name == room_name)
            {
                if player
                    .sender
                    .send(ServerMessage::WorldUpdate {
                        payload: payload.clone(),
                    })
                    .is_err()
                {
                    warn!(
                        "cannot send world update to player {}: pipe closed",
                        player.player_id
                    );
                }
                player.state = PlayerState::Synced;
            }
        }
    }

    /// Builds one room's payload. On a diff sync, objects whose serialized
    /// bytes match the previous transmission are skipped entirely, and
    /// string fields unchanged since the previous send are pruned.
    fn serialize_room_update(
        &mut self,
        room_name: &str,
        full: bool,
        step: StepCount,
    ) -> Result<Vec<u8>, cadence_shared::SerdeError> {
        let mut transmitter = NetworkTransmitter::new();
        transmitter.add_event(TransmitterEvent::Header {
            step_count: step,
            full_update: full,
        });

        let mut ids: Vec<ObjectId> = Vec::new();
        self.game.world().for_each(|id, object| {
            if object.room_name() == room_name {
                ids.push(id);
            }
            true
        });

        for id in ids {
            let Some(object) = self.game.world().get(id) else {
                continue;
            };
            let bytes = self.registry.encode_object(object, &[])?;
            let unchanged = self
                .obj_memory
                .get(&id)
                .is_some_and(|previous| previous == &bytes);
            if unchanged && !full {
                continue;
            }
            let kind = if self.obj_memory.contains_key(&id) {
                SyncEventKind::ObjectUpdate
            } else {
                SyncEventKind::ObjectCreate
            };

            // a full update must be self-contained, so pruning only applies
            // to diff syncs
            let mut pruned: Vec<&str> = Vec::new();
            if !full {
                if let Some(previous) = self.sent_strings.get(&id) {
                    for field in object.net_scheme() {
                        if !matches!(field.kind, FieldKind::Str) {
                            continue;
                        }
                        if let Some(FieldValue::Str(Some(current))) = object.get_field(field.name)
                        {
                            if previous.get(field.name) == Some(&current) {
                                pruned.push(field.name);
                            }
                        }
                    }
                }
            }
            let sent_bytes = if pruned.is_empty() {
                bytes.clone()
            } else {
                self.registry.encode_object(object, &pruned)?
            };
            transmitter.add_event(TransmitterEvent::Object {
                kind,
                step_count: step,
                object: sent_bytes,
            });

            let strings = self.sent_strings.entry(id).or_default();
            for field in object.net_scheme() {
                if !matches!(field.kind, FieldKind::Str) {
                    continue;
                }
                match object.get_field(field.name) {
                    Some(FieldValue::Str(Some(current))) => {
                        strings.insert(field.name, current);
                    }
                    _ => {
                        strings.remove(field.name);
                    }
                }
            }
            self.obj_memory.insert(id, bytes);
        }

        for object_bytes in self.pending_destroys.remove(room_name).unwrap_or_default() {
            transmitter.add_event(TransmitterEvent::Object {
                kind: SyncEventKind::ObjectDestroy,
                step_count: step,
                object: object_bytes,
            });
        }

        transmitter.serialize_payload()
    }
}
