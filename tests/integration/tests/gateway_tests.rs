//! Gateway session integration tests
//!
//! Drive the client against the in-process gateway and REST API.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;

use chat_client::{ClientError, EventKind};
use chat_gateway::{GatewayError, SessionState, WaiterError};
use integration_tests::{within, TestBed, APPLICATION_ID, SESSION_ID};
use serde_json::json;

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_startup_handshake() {
    let mut bed = TestBed::start().await.unwrap();
    let client = Arc::clone(&bed.client);
    let connecting = tokio::spawn(async move { client.connect().await });

    let uri = bed.gateway.request_uri().await.unwrap();
    assert!(uri.contains("v=9"), "{uri}");
    assert!(uri.contains("encoding=json"), "{uri}");

    bed.gateway.hello(50).unwrap();

    // The heartbeat loop starts before identify, without being asked
    let mut identify = None;
    let mut heartbeat = None;
    while identify.is_none() || heartbeat.is_none() {
        let frame = bed.gateway.recv().await.unwrap();
        match frame["op"].as_u64() {
            Some(2) => identify = Some(frame),
            Some(1) if heartbeat.is_none() => heartbeat = Some(frame),
            _ => {}
        }
    }
    let identify = identify.unwrap();
    assert_eq!(heartbeat.unwrap()["d"], json!(null));
    assert_eq!(identify["d"]["token"], "secret");
    assert_eq!(identify["d"]["intents"], 513);
    assert_eq!(identify["d"]["properties"]["browser"], "chat-sdk");
    assert!(identify["d"]["properties"]["os"].is_string());

    // Identify arrived, so the session is waiting for READY
    assert_eq!(bed.client.session().state(), SessionState::Identifying);

    bed.gateway.dispatch("READY", 1, integration_tests::ready_payload()).unwrap();
    let ready = within("connect", connecting).await.unwrap().unwrap().unwrap();

    assert_eq!(ready.kind(), EventKind::Ready);
    assert_eq!(ready.as_ready().unwrap().session_id, SESSION_ID);
    assert_eq!(bed.client.session().state(), SessionState::Ready);
    assert_eq!(bed.client.session().session_id().as_deref(), Some(SESSION_ID));
    assert_eq!(bed.client.session().last_sequence(), Some(1));
    assert!(bed.client.is_ready());
}

#[tokio::test]
async fn test_malformed_hello_fails_connect() {
    let mut bed = TestBed::start().await.unwrap();
    let client = Arc::clone(&bed.client);
    let connecting = tokio::spawn(async move { client.connect().await });

    bed.gateway.request_uri().await.unwrap();
    bed.gateway.send(json!({"op": 10, "d": {}})).unwrap();

    let err = within("connect", connecting).await.unwrap().unwrap().unwrap_err();
    assert!(
        matches!(
            err,
            ClientError::Gateway(GatewayError::Waiter(WaiterError::Failed { kind: EventKind::Hello, .. }))
        ),
        "{err}"
    );
    assert!(!bed.client.session().is_connected());
    bed.gateway.closed().await.unwrap();
}

#[tokio::test]
async fn test_malformed_ready_fails_connect() {
    let mut bed = TestBed::start().await.unwrap();
    let client = Arc::clone(&bed.client);
    let connecting = tokio::spawn(async move { client.connect().await });

    bed.gateway.hello(45_000).unwrap();
    bed.gateway.recv_op(2).await.unwrap();
    bed.gateway.dispatch("READY", 1, json!({"v": 9})).unwrap();

    let err = within("connect", connecting).await.unwrap().unwrap().unwrap_err();
    assert!(
        matches!(
            err,
            ClientError::Gateway(GatewayError::Waiter(WaiterError::Failed { kind: EventKind::Ready, .. }))
        ),
        "{err}"
    );
    assert_eq!(bed.client.session().state(), SessionState::Closed);
    bed.gateway.closed().await.unwrap();
}

#[tokio::test]
async fn test_ready_callback_runs() {
    let mut bed = TestBed::start().await.unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = parking_lot::Mutex::new(Some(tx));
    bed.client.register(EventKind::Ready, move |event| {
        let user = event.as_ready().map(|r| r.user.username.clone());
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send(user);
        }
        async { Ok(()) }
    });

    bed.connect(45_000).await.unwrap();

    let user = within("ready callback", rx).await.unwrap().unwrap();
    assert_eq!(user.as_deref(), Some("testbot"));
}

// ============================================================================
// Heartbeats
// ============================================================================

#[tokio::test]
async fn test_heartbeat_carries_last_sequence() {
    let mut bed = TestBed::start().await.unwrap();
    let client = Arc::clone(&bed.client);
    let connecting = tokio::spawn(async move { client.connect().await });

    bed.gateway.hello(50).unwrap();
    bed.gateway.recv_op(2).await.unwrap();

    // Nothing sequenced has arrived yet
    bed.gateway.request_heartbeat().unwrap();
    let heartbeat = bed.gateway.recv_op(1).await.unwrap();
    assert_eq!(heartbeat["d"], json!(null));

    bed.gateway.dispatch("READY", 1, integration_tests::ready_payload()).unwrap();
    within("connect", connecting).await.unwrap().unwrap().unwrap();

    // An unregistered event still advances the sequence
    bed.gateway.dispatch("TYPING_START", 5, json!({"channel_id": "8"})).unwrap();

    let mut last = json!(null);
    for _ in 0..20 {
        let heartbeat = bed.gateway.recv_op(1).await.unwrap();
        last = heartbeat["d"].clone();
        assert!(last == json!(null) || last == 1 || last == 5, "unexpected sequence {last}");
        if last == 5 {
            break;
        }
    }
    assert_eq!(last, 5);
    assert_eq!(bed.client.session().last_sequence(), Some(5));
}

#[tokio::test]
async fn test_server_heartbeat_request_is_answered() {
    let mut bed = TestBed::start().await.unwrap();
    bed.connect(45_000).await.unwrap();

    bed.gateway.request_heartbeat().unwrap();
    let heartbeat = bed.gateway.recv_op(1).await.unwrap();
    assert_eq!(heartbeat["d"], 1);
}

// ============================================================================
// Commands and interactions
// ============================================================================

#[tokio::test]
async fn test_commands_pushed_on_ready() {
    use chat_client::{ApplicationCommand, CommandOption};
    use chat_core::Snowflake;

    let mut bed = TestBed::start().await.unwrap();
    let guild = Snowflake::new(7);
    bed.client.register_command(
        ApplicationCommand::slash("c", "third", |_, _| async { Ok(()) }).guild(guild),
    );
    bed.client.register_command(
        ApplicationCommand::slash("a", "first", |_, _| async { Ok(()) })
            .option(CommandOption::string("text", "Some text")),
    );
    bed.client.register_command(
        ApplicationCommand::slash("b", "second", |_, _| async { Ok(()) }).guild(guild),
    );

    bed.connect(45_000).await.unwrap();

    let global_path = format!("/applications/{APPLICATION_ID}/commands");
    let global = bed
        .api
        .wait_for_request("global overwrite", |r| r.method == "PUT" && r.path == global_path)
        .await
        .unwrap();
    let body = global.body.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "a");
    assert_eq!(body[0]["type"], 1);
    assert_eq!(body[0]["options"][0]["name"], "text");

    let guild_path = format!("/applications/{APPLICATION_ID}/guilds/7/commands");
    let guild_put = bed
        .api
        .wait_for_request("guild overwrite", |r| r.method == "PUT" && r.path == guild_path)
        .await
        .unwrap();
    let names: Vec<_> = guild_put
        .body
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["b", "c"]);

    assert_eq!(
        bed.client.http().application_id(),
        Some(Snowflake::new(APPLICATION_ID))
    );
}

#[tokio::test]
async fn test_command_invocation_responds() {
    use chat_client::{ApplicationCommand, CommandOption};
    use chat_core::SendMessage;

    let mut bed = TestBed::start().await.unwrap();
    bed.client.register_command(
        ApplicationCommand::slash("echo", "Repeat text", |ctx, args| async move {
            let text = args[0].as_ref().and_then(|v| v.as_str()).unwrap_or("nothing").to_string();
            ctx.respond(SendMessage::text(text)).await?;
            Ok(())
        })
        .option(CommandOption::string("text", "What to say")),
    );
    bed.connect(45_000).await.unwrap();
    let run = bed.spawn_run();

    let interaction = integration_tests::interaction_payload(
        901,
        "echo",
        json!([{"name": "text", "type": 3, "value": "hello"}]),
    );
    bed.gateway.dispatch("INTERACTION_CREATE", 2, interaction).unwrap();

    let callback = bed
        .api
        .wait_for_request("interaction callback", |r| r.path == "/interactions/901/token-901/callback")
        .await
        .unwrap();
    let body = callback.body.unwrap();
    assert_eq!(body["type"], 4);
    assert_eq!(body["data"]["content"], "hello");

    bed.client.close().await.unwrap();
    within("run", run).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_unknown_option_type_fails_only_its_unit() {
    use chat_client::{ApplicationCommand, CommandOption};
    use chat_core::SendMessage;

    let mut bed = TestBed::start().await.unwrap();
    bed.client.register_command(
        ApplicationCommand::slash("echo", "Repeat text", |ctx, _args| async move {
            ctx.respond(SendMessage::text("ok")).await?;
            Ok(())
        })
        .option(CommandOption::string("text", "What to say").optional()),
    );
    bed.connect(45_000).await.unwrap();
    let run = bed.spawn_run();

    let broken = integration_tests::interaction_payload(
        901,
        "echo",
        json!([{"name": "text", "type": 99, "value": "hello"}]),
    );
    let valid = integration_tests::interaction_payload(902, "echo", json!([]));
    bed.gateway.dispatch("INTERACTION_CREATE", 2, broken).unwrap();
    bed.gateway.dispatch("INTERACTION_CREATE", 3, valid).unwrap();

    bed.api
        .wait_for_request("valid interaction callback", |r| r.path.starts_with("/interactions/902/"))
        .await
        .unwrap();

    let supervisor = Arc::clone(bed.client.supervisor());
    within("failure count", async move {
        while supervisor.failures() < 1 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert!(!bed.api.requests().iter().any(|r| r.path.starts_with("/interactions/901/")));
    assert!(!run.is_finished());
    assert_eq!(bed.client.session().state(), SessionState::Ready);
    assert_eq!(bed.client.supervisor().failures(), 1);

    bed.client.close().await.unwrap();
    within("run", run).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_rate_limited_command_push_aborts_startup() {
    use chat_client::ApplicationCommand;

    let mut bed = TestBed::start().await.unwrap();
    bed.client
        .register_command(ApplicationCommand::slash("ping", "Pong!", |_, _| async { Ok(()) }));

    let client = Arc::clone(&bed.client);
    let connecting = tokio::spawn(async move { client.connect().await });
    bed.gateway.hello(45_000).unwrap();
    bed.gateway.recv_op(2).await.unwrap();

    // The gateway URL has been fetched; the command push is next
    bed.api.set_rate_limited(true);
    bed.gateway.dispatch("READY", 1, integration_tests::ready_payload()).unwrap();
    within("connect", connecting).await.unwrap().unwrap().unwrap();

    let err = within("run", bed.spawn_run()).await.unwrap().unwrap().unwrap_err();
    match err {
        ClientError::Gateway(GatewayError::Supervisor { unit, source }) => {
            assert_eq!(unit, "gateway-ready");
            assert!(source.to_string().starts_with("Rate limited: 429"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_client_close() {
    let mut bed = TestBed::start().await.unwrap();
    bed.connect(45_000).await.unwrap();

    bed.client.close().await.unwrap();
    bed.gateway.closed().await.unwrap();

    assert_eq!(bed.client.session().state(), SessionState::Closed);
    assert!(bed.client.supervisor().is_empty());
    assert!(matches!(
        bed.client.session().close().await,
        Err(GatewayError::NotConnected)
    ));
}

#[tokio::test]
async fn test_server_close_ends_run() {
    let mut bed = TestBed::start().await.unwrap();
    bed.connect(45_000).await.unwrap();
    let run = bed.spawn_run();

    bed.gateway.close(4004, "Authentication failed").unwrap();

    let err = within("run", run).await.unwrap().unwrap().unwrap_err();
    match err {
        ClientError::Gateway(GatewayError::Supervisor { unit, source }) => {
            assert_eq!(unit, "gateway-read");
            assert!(source.to_string().contains("Authentication failed"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(bed.client.session().state(), SessionState::Disconnected);
}
