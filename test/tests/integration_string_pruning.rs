//! String pruning across the wire: a diff sync omits an unchanged string
//! field (pruned marker) and the receiver keeps its existing value.

use cadence_client::ClientConfig;
use cadence_server::ServerConfig;
use cadence_shared::{
    FieldValue, MessageChannel, MessageReceiver, ObjectId, ServerMessage, Vec2, WorldSync,
};
use cadence_test::{test_registry, Session, Ship};

const PERIOD_MS: f64 = 20.0;

#[test]
fn unchanged_name_is_pruned_but_preserved() {
    let server_config = ServerConfig {
        step_rate: 50,
        full_sync_rate: 1000,
        ..ServerConfig::default()
    };
    let client_config = ClientConfig {
        step_period_ms: PERIOD_MS,
        ..ClientConfig::default()
    };
    let mut session = Session::connect(server_config, client_config);

    // a moving named ship: position changes every step, the name never does
    let ship_id: ObjectId = {
        let id = session.server.game_mut().world_mut().new_id();
        let mut ship = Ship::new();
        ship.physical.base.id = id;
        ship.physical.velocity = Vec2::new(30.0, 0.0);
        ship.name = Some("Aurora".to_string());
        session.server.add_object(Box::new(ship)).unwrap()
    };

    // an observer pipe lets the test read raw payloads
    let (observer_to_server, observer_from_client) = MessageChannel::unbounded();
    let (observer_to_client, mut observer_from_server) = MessageChannel::unbounded();
    session
        .server
        .connect_player(observer_to_client, observer_from_client, 0.0);
    let _hold = observer_to_server;

    session.start(0.0);
    session.run(0.0, 60, PERIOD_MS);

    let registry = test_registry();
    let mut full_names = Vec::new();
    let mut diff_names = Vec::new();
    while let Ok(Some(message)) = observer_from_server.receive() {
        let ServerMessage::WorldUpdate { payload } = message else {
            continue;
        };
        let sync = WorldSync::deserialize(&payload, &registry).unwrap();
        let Some(events) = sync.objects.get(&ship_id) else {
            continue;
        };
        let name = events[0].object.get_field("name").unwrap();
        if sync.full_update {
            full_names.push(name);
        } else {
            diff_names.push(name);
        }
    }

    // the first (full) sync spells the name out
    assert!(full_names
        .iter()
        .all(|name| *name == FieldValue::Str(Some("Aurora".to_string()))));
    assert!(!full_names.is_empty());

    // every diff sync prunes it
    assert!(!diff_names.is_empty());
    assert!(diff_names
        .iter()
        .all(|name| *name == FieldValue::Str(None)));

    // and the client still knows the name
    let world = session.client.game().world();
    let ship = world
        .get(ship_id)
        .unwrap()
        .as_any()
        .downcast_ref::<Ship>()
        .unwrap();
    assert_eq!(ship.name.as_deref(), Some("Aurora"));
}
