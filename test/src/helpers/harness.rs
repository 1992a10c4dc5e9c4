use cadence_client::{Client, ClientConfig};
use cadence_server::{Server, ServerConfig};
use cadence_shared::{
    ClassRegistry, EngineConfig, GameEngine, GameObject, MessageChannel, PhysicalObject2D,
    Physics, PlayerId, World, VEC2_CLASS_NAME, VEC2_NET_SCHEME,
};

use crate::helpers::test_object::Ship;

/// Euler integrator over every physical body the filter admits.
pub struct SimplePhysics;

impl Physics for SimplePhysics {
    fn step(&mut self, world: &mut World, dt_seconds: f32, filter: &dyn Fn(&dyn GameObject) -> bool) {
        world.for_each_mut(|_, object| {
            if !filter(object) {
                return true;
            }
            if let Some(body) = object.physical_mut() {
                let velocity = body.velocity;
                let angular_velocity = body.angular_velocity;
                body.position += velocity * dt_seconds;
                body.angle = cadence_shared::wrap_angle(body.angle + angular_velocity * dt_seconds);
            }
            true
        });
    }
}

/// Builds the class registry both peers share.
pub fn test_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register_value(VEC2_CLASS_NAME, &VEC2_NET_SCHEME)
        .expect("register Vec2");
    registry
        .register(|| Box::new(PhysicalObject2D::new()))
        .expect("register PhysicalObject2D");
    registry
        .register(|| Box::new(Ship::new()))
        .expect("register Ship");
    registry
}

fn game_engine() -> GameEngine {
    let mut engine = GameEngine::new(EngineConfig::default());
    engine.set_physics(Box::new(SimplePhysics));
    engine
}

/// One server and one connected client, wired over in-process pipes.
pub struct Session {
    pub server: Server,
    pub client: Client,
    pub player_id: PlayerId,
}

impl Session {
    pub fn connect(server_config: ServerConfig, client_config: ClientConfig) -> Self {
        let mut server = Server::new(server_config, test_registry(), game_engine());

        let (to_server, from_client) = MessageChannel::unbounded();
        let (to_client, from_server) = MessageChannel::unbounded();
        let player_id = server.connect_player(to_client, from_client, 0.0);

        let client = Client::new(
            client_config,
            test_registry(),
            game_engine(),
            to_server,
            from_server,
        )
        .expect("client construction");

        Self {
            server,
            client,
            player_id,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.server.start(now_ms);
        self.client.start(now_ms);
    }

    /// Pumps both peers in lockstep from `from_ms` for `ticks` ticks of
    /// `period_ms`, returning the final timestamp.
    pub fn run(&mut self, from_ms: f64, ticks: u32, period_ms: f64) -> f64 {
        let mut now_ms = from_ms;
        for _ in 0..ticks {
            now_ms += period_ms;
            self.server.tick(now_ms);
            self.client.tick(now_ms);
        }
        now_ms
    }
}
