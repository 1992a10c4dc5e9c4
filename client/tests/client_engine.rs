//! Client engine behavior: construction, input stamping, sync intake and
//! the step drift discipline.

use cadence_client::{Client, ClientConfig, ClientError};
use cadence_shared::{
    ClassRegistry, ClientMessage, EngineConfig, GameEngine, InputOptions, MessageChannel,
    MessageReceiver, MessageSender, NetworkTransmitter, PhysicalObject2D, ServerMessage,
    TransmitterEvent, VEC2_CLASS_NAME, VEC2_NET_SCHEME,
};

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register_value(VEC2_CLASS_NAME, &VEC2_NET_SCHEME)
        .unwrap();
    registry
        .register(|| Box::new(PhysicalObject2D::new()))
        .unwrap();
    registry
}

type Harness = (
    Client,
    Box<dyn MessageSender<ServerMessage>>,
    Box<dyn MessageReceiver<ClientMessage>>,
);

fn client_with_pipes(config: ClientConfig) -> Harness {
    let (to_server, from_client) = MessageChannel::unbounded();
    let (to_client, from_server) = MessageChannel::unbounded();
    let client = Client::new(
        config,
        registry(),
        GameEngine::new(EngineConfig::default()),
        to_server,
        from_server,
    )
    .unwrap();
    (client, to_client, from_client)
}

fn header_only_payload(step_count: u32) -> Vec<u8> {
    let mut transmitter = NetworkTransmitter::new();
    transmitter.add_event(TransmitterEvent::Header {
        step_count,
        full_update: false,
    });
    transmitter.serialize_payload().unwrap()
}

#[test]
fn unknown_strategy_refuses_to_start() {
    let (to_server, _from_client) = MessageChannel::unbounded();
    let (_to_client, from_server) = MessageChannel::unbounded();
    let config = ClientConfig {
        sync_strategy: "telepathy".to_string(),
        ..ClientConfig::default()
    };
    let result = Client::new(
        config,
        registry(),
        GameEngine::new(EngineConfig::default()),
        to_server,
        from_server,
    );
    assert!(matches!(
        result.err(),
        Some(ClientError::UnknownSyncStrategy { .. })
    ));
}

#[test]
fn player_id_is_adopted_from_the_greeting() {
    let (mut client, to_client, _from_client) = client_with_pipes(ClientConfig::default());
    client.start(0.0);
    to_client
        .send(ServerMessage::PlayerJoined {
            player_id: 4,
            join_time_ms: 0.0,
            disconnect_time_ms: 0.0,
        })
        .unwrap();
    client.tick(1.0);
    assert_eq!(client.player_id(), Some(4));
}

#[test]
fn inputs_are_stamped_and_transmitted() {
    let config = ClientConfig {
        step_period_ms: 20.0,
        delay_input_count: 2,
        ..ClientConfig::default()
    };
    let (mut client, _to_client, mut from_client) = client_with_pipes(config);
    client.start(0.0);
    client.tick(20.0); // step 1

    client.send_input("up", InputOptions::movement());
    client.send_input("left", InputOptions::movement());

    let mut moves = Vec::new();
    while let Ok(Some(message)) = from_client.receive() {
        if let ClientMessage::Move(input) = message {
            moves.push(input);
        }
    }
    assert_eq!(moves.len(), 2);
    assert_eq!(moves[0].message_index, 1);
    assert_eq!(moves[1].message_index, 2);
    // current step 1, plus the artificial two-step input delay
    assert_eq!(moves[0].step, 3);
    assert_eq!(moves[0].input, "up");
}

#[test]
fn world_updates_raise_the_highest_server_step() {
    let (mut client, to_client, _from_client) = client_with_pipes(ClientConfig {
        step_period_ms: 20.0,
        ..ClientConfig::default()
    });
    client.start(0.0);

    to_client
        .send(ServerMessage::WorldUpdate {
            payload: header_only_payload(12),
        })
        .unwrap();
    client.tick(20.0);
    assert_eq!(client.highest_server_step(), 12);

    // an older sync never lowers it
    to_client
        .send(ServerMessage::WorldUpdate {
            payload: header_only_payload(9),
        })
        .unwrap();
    client.tick(40.0);
    assert_eq!(client.highest_server_step(), 12);
}

#[test]
fn malformed_world_update_is_discarded() {
    let (mut client, to_client, _from_client) = client_with_pipes(ClientConfig {
        step_period_ms: 20.0,
        ..ClientConfig::default()
    });
    client.start(0.0);
    to_client
        .send(ServerMessage::WorldUpdate {
            payload: vec![0x00],
        })
        .unwrap();
    client.tick(20.0);
    // the client keeps running; the next full sync repairs state
    assert_eq!(client.highest_server_step(), 0);
}

#[test]
fn deep_lag_snaps_the_step_count() {
    // extrapolate thresholds: clientReset = 40
    let (mut client, to_client, _from_client) = client_with_pipes(ClientConfig {
        step_period_ms: 20.0,
        ..ClientConfig::default()
    });
    client.start(0.0);

    // settle the first sync so later syncs are no longer forced
    to_client
        .send(ServerMessage::WorldUpdate {
            payload: header_only_payload(1),
        })
        .unwrap();
    client.tick(20.0);

    // pretend the client ran for a while, then a far-future sync arrives
    client.game_mut().world_mut().step_count = 200;
    to_client
        .send(ServerMessage::WorldUpdate {
            payload: header_only_payload(260),
        })
        .unwrap();
    client.tick(40.0);

    // lag 60+ exceeds clientReset: snap to the server step
    assert_eq!(client.game().world().step_count, 260);
}

#[test]
fn rtt_probes_are_sent_and_measured() {
    let config = ClientConfig {
        step_period_ms: 20.0,
        rtt_query_interval_steps: 1,
        ..ClientConfig::default()
    };
    let (mut client, to_client, mut from_client) = client_with_pipes(config);
    client.start(0.0);
    client.tick(20.0);

    let mut query_id = None;
    while let Ok(Some(message)) = from_client.receive() {
        if let ClientMessage::RttQuery { id } = message {
            query_id = Some(id);
        }
    }
    let query_id = query_id.expect("client sent an RTT probe");

    to_client
        .send(ServerMessage::RttResponse { id: query_id })
        .unwrap();
    client.tick(60.0);
    assert_eq!(client.rtt(), Some(40.0));
}

#[test]
fn traces_flush_on_the_configured_cadence() {
    let config = ClientConfig {
        step_period_ms: 20.0,
        trace_flush_interval_steps: 2,
        ..ClientConfig::default()
    };
    let (mut client, _to_client, mut from_client) = client_with_pipes(config);
    client.start(0.0);

    client.record_trace("spawned");
    client.tick(20.0);
    client.tick(40.0);

    let mut batches = Vec::new();
    while let Ok(Some(message)) = from_client.receive() {
        if let ClientMessage::Trace(entries) = message {
            batches.push(entries);
        }
    }
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].data, "spawned");
}
