//! Full-sync cadence at the default rates: a payload every `update_rate`
//! steps, one full update per `full_sync_rate` syncs.

use cadence_server::{Server, ServerConfig};
use cadence_shared::{
    ClientMessage, EngineConfig, GameEngine, MessageChannel, MessageReceiver, MessageSender,
    ServerMessage, WorldSync,
};
use cadence_test::test_registry;

#[test]
fn full_sync_every_twentieth_payload() {
    let config = ServerConfig::default(); // update_rate 6, full_sync_rate 20
    let mut server = Server::new(config, test_registry(), GameEngine::new(EngineConfig::default()));

    let (_to_server, from_client): (
        Box<dyn MessageSender<ClientMessage>>,
        Box<dyn MessageReceiver<ClientMessage>>,
    ) = MessageChannel::unbounded();
    let (to_client, mut from_server) = MessageChannel::unbounded();
    server.connect_player(to_client, from_client, 0.0);

    server.start(0.0);
    for step in 0..720 {
        server.step(f64::from(step + 1) * (1000.0 / 60.0));
    }

    let registry = test_registry();
    let mut payloads = 0;
    let mut fulls = 0;
    while let Ok(Some(message)) = from_server.receive() {
        if let ServerMessage::WorldUpdate { payload } = message {
            payloads += 1;
            if WorldSync::deserialize(&payload, &registry).unwrap().full_update {
                fulls += 1;
            }
        }
    }

    // one payload every 6 steps
    assert_eq!(payloads, 120);
    // sync counters 0, 20, 40, ... are full updates
    assert_eq!(fulls, 6);
}
