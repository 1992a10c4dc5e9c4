//! End-to-end prediction flow: object creation reaches the client, the
//! client tracks authoritative movement, and a predicted shadow is
//! reclaimed by its server twin.

use cadence_client::ClientConfig;
use cadence_server::ServerConfig;
use cadence_shared::{
    GameEngine, InputDescriptor, InputHandler, InputOptions, ObjectId, PhysicalObject2D,
    PlayerId, Vec2, CLIENT_ID_SPACE,
};
use cadence_test::{Session, Ship};

const PERIOD_MS: f64 = 20.0;

fn configs() -> (ServerConfig, ClientConfig) {
    let server_config = ServerConfig {
        step_rate: 50,
        update_rate: 6,
        full_sync_rate: 20,
        ..ServerConfig::default()
    };
    let client_config = ClientConfig {
        step_period_ms: PERIOD_MS,
        ..ClientConfig::default()
    };
    (server_config, client_config)
}

fn add_ship(session: &mut Session, player_id: PlayerId, velocity: Vec2) -> ObjectId {
    let id = session.server.game_mut().world_mut().new_id();
    let mut ship = Ship::new();
    ship.physical.base.id = id;
    ship.physical.base.player_id = player_id;
    ship.physical.velocity = velocity;
    ship.name = Some("Aurora".to_string());
    session.server.add_object(Box::new(ship)).unwrap()
}

/// Spawns a missile for every "fire" input, tagged with the input's message
/// index. Installed on both peers: the server spawn is authoritative, the
/// client spawn is the predicted shadow.
fn fire_handler() -> InputHandler {
    Box::new(
        |engine: &mut GameEngine, input: &InputDescriptor, player_id: PlayerId| {
            if input.input != "fire" {
                return;
            }
            let id = engine.world_mut().new_id();
            let mut missile = PhysicalObject2D::new();
            missile.base.id = id;
            missile.base.player_id = player_id;
            missile.base.input_id = Some(input.message_index);
            missile.velocity = Vec2::new(10.0, 0.0);
            engine.add_object_to_world(Box::new(missile));
        },
    )
}

#[test]
fn server_objects_reach_the_client() {
    let (server_config, client_config) = configs();
    let mut session = Session::connect(server_config, client_config);
    let player_id = session.player_id;
    let ship_id = add_ship(&mut session, player_id, Vec2::new(0.0, 0.0));

    session.start(0.0);
    session.run(0.0, 20, PERIOD_MS);

    let world = session.client.game().world();
    assert!(world.contains(ship_id));
    let ship = world.get(ship_id).unwrap().as_any().downcast_ref::<Ship>().unwrap();
    assert_eq!(ship.name.as_deref(), Some("Aurora"));
    assert_eq!(ship.physical.base.player_id, session.player_id);
}

#[test]
fn client_tracks_authoritative_movement() {
    let (server_config, client_config) = configs();
    let mut session = Session::connect(server_config, client_config);
    let player_id = session.player_id;
    let ship_id = add_ship(&mut session, player_id, Vec2::new(60.0, 0.0));

    session.start(0.0);
    session.run(0.0, 150, PERIOD_MS);

    let server_ship = session
        .server
        .game()
        .world()
        .get(ship_id)
        .unwrap()
        .physical()
        .unwrap()
        .position;
    let client_ship = session
        .client
        .game()
        .world()
        .get(ship_id)
        .unwrap()
        .physical()
        .unwrap()
        .position;

    assert!(server_ship.x > 100.0, "server ship moved: {server_ship:?}");
    // prediction plus bending keeps the client within a few steps of truth
    assert!(
        (client_ship.x - server_ship.x).abs() < 10.0,
        "client {client_ship:?} tracks server {server_ship:?}"
    );
}

#[test]
fn predicted_shadow_is_reclaimed_by_the_server_twin() {
    let (server_config, client_config) = configs();
    let mut session = Session::connect(server_config, client_config);
    let player_id = session.player_id;
    add_ship(&mut session, player_id, Vec2::new(0.0, 0.0));

    session.server.game_mut().set_input_handler(fire_handler());
    session.client.game_mut().set_input_handler(fire_handler());

    session.start(0.0);
    // settle the first sync and the player id
    let now = session.run(0.0, 10, PERIOD_MS);

    session.client.send_input("fire", InputOptions::default());
    // the shadow exists immediately, allocated from the client id space
    let shadow_count = {
        let world = session.client.game().world();
        world
            .object_ids()
            .into_iter()
            .filter(|id| *id >= CLIENT_ID_SPACE)
            .count()
    };
    assert_eq!(shadow_count, 1);

    session.run(now, 30, PERIOD_MS);

    // the twin arrived and reclaimed the shadow
    let world = session.client.game().world();
    let shadow_ids: Vec<ObjectId> = world
        .object_ids()
        .into_iter()
        .filter(|id| *id >= CLIENT_ID_SPACE)
        .collect();
    assert!(shadow_ids.is_empty(), "shadows left: {shadow_ids:?}");

    let missiles: Vec<ObjectId> = world
        .object_ids()
        .into_iter()
        .filter(|id| {
            world
                .get(*id)
                .is_some_and(|object| object.input_id().is_some())
        })
        .collect();
    assert_eq!(missiles.len(), 1);
    assert!(missiles[0] < CLIENT_ID_SPACE);
    // and the server agrees
    assert!(session.server.game().world().contains(missiles[0]));
}

#[test]
fn destroyed_server_object_disappears_from_the_client() {
    let (server_config, client_config) = configs();
    let mut session = Session::connect(server_config, client_config);
    let player_id = session.player_id;
    let ship_id = add_ship(&mut session, player_id, Vec2::new(0.0, 0.0));

    session.start(0.0);
    let now = session.run(0.0, 20, PERIOD_MS);
    assert!(session.client.game().world().contains(ship_id));

    session.server.remove_object(ship_id).unwrap();
    session.run(now, 30, PERIOD_MS);
    assert!(!session.client.game().world().contains(ship_id));
}
