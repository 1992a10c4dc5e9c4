use thiserror::Error;

use crate::game_object::GameObject;
use crate::input::InputDescriptor;
use crate::physics::Physics;
use crate::types::{ObjectId, PlayerId, StepCount, CLIENT_ID_SPACE, DEFAULT_STEP_PERIOD_MS};
use crate::world::World;

/// Errors that can occur during simulation engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Attempted to remove an object that is not registered in the world
    #[error("Cannot remove object {id}: it is not present in the world")]
    RemoveMissingObject { id: ObjectId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// First id of the client-allocated shadow range.
    pub client_id_space: ObjectId,
    /// Step period used when a step is driven without an explicit `dt`.
    pub step_period_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client_id_space: CLIENT_ID_SPACE,
            step_period_ms: DEFAULT_STEP_PERIOD_MS,
        }
    }
}

/// Events emitted by the engine while stepping, drained by the embedding
/// layer after each step.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PreStep {
        step: StepCount,
        is_reenact: bool,
        dt_ms: f64,
    },
    PostStep {
        step: StepCount,
        is_reenact: bool,
    },
    ObjectAdded {
        id: ObjectId,
    },
    ObjectRemoved {
        id: ObjectId,
        room_name: String,
    },
    ProcessedInput {
        player_id: PlayerId,
        input: InputDescriptor,
        from_server: bool,
    },
}

/// Game-specific input application, registered by the embedding game. Runs
/// inside `process_input` with full engine access so handlers can spawn and
/// despawn objects.
pub type InputHandler = Box<dyn FnMut(&mut GameEngine, &InputDescriptor, PlayerId)>;

/// Owns the world and runs one logical step at a time: preStep, physics,
/// postStep. The same engine type runs authoritatively on the server and
/// predictively on clients.
pub struct GameEngine {
    config: EngineConfig,
    world: World,
    physics: Option<Box<dyn Physics>>,
    physics_enabled: bool,
    input_handler: Option<InputHandler>,
    events: Vec<EngineEvent>,
    last_step_time: Option<f64>,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            world: World::new(),
            physics: None,
            physics_enabled: true,
            input_handler: None,
            events: Vec::new(),
            last_step_time: None,
        }
    }

    pub fn set_physics(&mut self, physics: Box<dyn Physics>) {
        self.physics = Some(physics);
    }

    /// Interpolating clients run the step loop with physics disabled;
    /// bending still applies.
    pub fn set_physics_enabled(&mut self, enabled: bool) {
        self.physics_enabled = enabled;
    }

    pub fn set_input_handler(&mut self, handler: InputHandler) {
        self.input_handler = Some(handler);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn client_id_space(&self) -> ObjectId {
        self.config.client_id_space
    }

    /// Time (in seconds) passed to the most recent externally driven step.
    pub fn last_step_time(&self) -> Option<f64> {
        self.last_step_time
    }

    pub fn start(&mut self) {
        self.world.step_count = 0;
        self.events.clear();
    }

    /// Runs one logical step.
    ///
    /// With `physics_only`, only the integrator runs: no step counting, no
    /// hooks, no bending. Otherwise the step count advances, `PreStep` fires,
    /// physics integrates (skipping shadow objects during re-enactment),
    /// scheduled bending increments apply, and `PostStep` fires.
    pub fn step(&mut self, is_reenact: bool, t_seconds: Option<f64>, dt_ms: Option<f64>, physics_only: bool) {
        let dt_ms = dt_ms.unwrap_or(self.config.step_period_ms);
        if let Some(t) = t_seconds {
            self.last_step_time = Some(t);
        }
        if physics_only {
            self.run_physics(dt_ms, is_reenact);
            return;
        }

        self.world.step_count += 1;
        let step = self.world.step_count;
        self.events.push(EngineEvent::PreStep {
            step,
            is_reenact,
            dt_ms,
        });

        if self.physics_enabled {
            self.run_physics(dt_ms, is_reenact);
        }

        // bending is consumed by real steps only; re-enacted steps would
        // otherwise burn increments the player never saw
        if !is_reenact {
            self.world.for_each_mut(|_, object| {
                object.apply_incremental_bending(dt_ms);
                true
            });
        }

        self.events.push(EngineEvent::PostStep { step, is_reenact });
    }

    fn run_physics(&mut self, dt_ms: f64, is_reenact: bool) {
        let Some(mut physics) = self.physics.take() else {
            return;
        };
        let client_id_space = self.config.client_id_space;
        let filter =
            move |object: &dyn GameObject| !(is_reenact && object.id() >= client_id_space);
        physics.step(&mut self.world, (dt_ms / 1000.0) as f32, &filter);
        self.physics = Some(physics);
    }

    /// Registers an object in the world and fires its add hook.
    ///
    /// A shadow object (client id space) whose `input_id` matches any
    /// existing object is refused: its server twin has already arrived.
    pub fn add_object_to_world(&mut self, object: Box<dyn GameObject>) -> Option<ObjectId> {
        let id = object.id();
        if id >= self.config.client_id_space {
            if let Some(input_id) = object.input_id() {
                let mut duplicate = false;
                self.world.for_each(|_, existing| {
                    if existing.input_id() == Some(input_id) {
                        duplicate = true;
                        return false;
                    }
                    true
                });
                if duplicate {
                    return None;
                }
            }
        }
        self.world.insert(object);
        if let Some(object) = self.world.get_mut(id) {
            object.on_add_to_world();
        }
        self.events.push(EngineEvent::ObjectAdded { id });
        Some(id)
    }

    /// Removes an object, firing its remove hook. Removing an id that is not
    /// in the world is a fatal error surfaced to the caller.
    pub fn remove_object_from_world(
        &mut self,
        id: ObjectId,
    ) -> Result<Box<dyn GameObject>, EngineError> {
        let mut object = self
            .world
            .remove(id)
            .ok_or(EngineError::RemoveMissingObject { id })?;
        object.on_remove_from_world();
        self.events.push(EngineEvent::ObjectRemoved {
            id,
            room_name: object.room_name().to_string(),
        });
        Ok(object)
    }

    /// Dispatches one input to the game's handler and records the dispatch.
    pub fn process_input(&mut self, input: &InputDescriptor, player_id: PlayerId, from_server: bool) {
        self.events.push(EngineEvent::ProcessedInput {
            player_id,
            input: input.clone(),
            from_server,
        });
        if let Some(mut handler) = self.input_handler.take() {
            handler(self, input, player_id);
            if self.input_handler.is_none() {
                self.input_handler = Some(handler);
            }
        }
    }

    /// Finds the locally-allocated shadow whose `input_id` matches the
    /// server object's. With duplicate `input_id`s (unsupported), the first
    /// match in iteration order wins.
    pub fn find_local_shadow(&self, server_object: &dyn GameObject) -> Option<ObjectId> {
        let input_id = server_object.input_id()?;
        let mut found = None;
        self.world.for_each(|id, object| {
            if id >= self.config.client_id_space && object.input_id() == Some(input_id) {
                found = Some(id);
                return false;
            }
            true
        });
        found
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
