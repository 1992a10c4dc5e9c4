//! An interpolating client never simulates; it trails the server and plays
//! bent snapshots forward.

use cadence_client::ClientConfig;
use cadence_server::ServerConfig;
use cadence_shared::Vec2;
use cadence_test::{Session, Ship};

const PERIOD_MS: f64 = 20.0;

#[test]
fn interpolating_client_trails_the_server() {
    let server_config = ServerConfig {
        step_rate: 50,
        ..ServerConfig::default()
    };
    let client_config = ClientConfig {
        step_period_ms: PERIOD_MS,
        sync_strategy: "interpolate".to_string(),
        ..ClientConfig::default()
    };
    let mut session = Session::connect(server_config, client_config);

    let ship_id = {
        let id = session.server.game_mut().world_mut().new_id();
        let mut ship = Ship::new();
        ship.physical.base.id = id;
        ship.physical.velocity = Vec2::new(60.0, 0.0);
        session.server.add_object(Box::new(ship)).unwrap()
    };

    session.start(0.0);
    session.run(0.0, 300, PERIOD_MS);

    let server_step = session.server.game().world().step_count;
    let client_step = session.client.game().world().step_count;
    // the client holds behind the server instead of predicting ahead
    assert!(client_step < server_step, "client {client_step} vs server {server_step}");
    assert!(
        client_step + 30 > server_step,
        "client fell too far behind: {client_step} vs {server_step}"
    );

    let server_x = session
        .server
        .game()
        .world()
        .get(ship_id)
        .unwrap()
        .physical()
        .unwrap()
        .position
        .x;
    let client_x = session
        .client
        .game()
        .world()
        .get(ship_id)
        .unwrap()
        .physical()
        .unwrap()
        .position
        .x;

    // the client's view moves, lags truth, and never overshoots it
    assert!(server_x > 300.0);
    assert!(client_x > 100.0, "client view is moving: {client_x}");
    assert!(client_x <= server_x, "client {client_x} must trail server {server_x}");
}
