mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::future::join_all;
use serde_json::{Value, json};
use serversee_client::rpc::signing;
use serversee_client::{
    AgentApi, AgentTransport, ClientError, ConnectionState, TransportError, TransportOptions,
};

use common::{MemoryConnector, spawn_agent};

fn options() -> TransportOptions {
    TransportOptions {
        connect_timeout: Duration::from_secs(2),
        keepalive_interval: Duration::from_secs(30),
        request_timeout: Some(Duration::from_secs(2)),
        push_capacity: 100,
    }
}

fn transport(
    connector: Arc<MemoryConnector>,
    credential: Option<&str>,
    options: TransportOptions,
) -> Arc<AgentTransport> {
    Arc::new(AgentTransport::with_connector(
        "http://agent.local:8080",
        credential.map(String::from),
        connector,
        options,
    ))
}

#[tokio::test]
async fn test_concurrent_cold_requests_share_one_connection() {
    let (connector, peers) = MemoryConnector::new(Duration::from_millis(100));
    spawn_agent(peers, |action, _| Ok(json!({ "action": action })));
    let transport = transport(connector.clone(), None, options());

    let requests = (0..5).map(|_| transport.send_request("status", None));
    let replies = join_all(requests).await;

    assert!(replies.iter().all(Result::is_ok));
    assert_eq!(connector.connects(), 1);
    assert_eq!(transport.state(), ConnectionState::Open);
    assert_eq!(transport.url(), "ws://agent.local:8080/");
}

#[tokio::test]
async fn test_remote_error_clears_pending() {
    let (connector, peers) = MemoryConnector::new(Duration::ZERO);
    spawn_agent(peers, |_, _| Err("boom".to_string()));
    let transport = transport(connector, None, options());

    let err = transport.send_request("metrics", None).await.unwrap_err();
    assert!(matches!(&err, TransportError::RemoteError(message) if message == "boom"), "{err:?}");
    assert_eq!(transport.pending_requests(), 0);
}

#[tokio::test]
async fn test_connection_loss_fails_pending_then_reconnects() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let transport = transport(connector.clone(), None, options());

    let first = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("status", None).await }
    });
    let second = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("metrics", None).await }
    });

    let mut peer = peers.recv().await.unwrap();
    assert!(peer.next_request().await.is_some());
    assert!(peer.next_request().await.is_some());
    assert_eq!(transport.pending_requests(), 2);
    drop(peer);

    for handle in [first, second] {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed), "{err:?}");
    }
    assert_eq!(transport.pending_requests(), 0);
    assert_eq!(transport.state(), ConnectionState::Closed);

    spawn_agent(peers, |_, _| Ok(json!("pong")));
    let reply = transport.send_request("status", None).await.unwrap();
    assert_eq!(reply.data, json!("pong"));
    assert_eq!(connector.connects(), 2);
}

#[tokio::test]
async fn test_connect_failure_is_not_connected() {
    let (connector, peers) = MemoryConnector::new(Duration::ZERO);
    connector.set_refuse(true);
    let transport = transport(connector.clone(), None, options());

    let err = transport.send_request("status", None).await.unwrap_err();
    assert!(matches!(err, TransportError::NotConnected { .. }), "{err:?}");
    assert_eq!(transport.state(), ConnectionState::Unconnected);

    connector.set_refuse(false);
    spawn_agent(peers, |_, _| Ok(Value::Null));
    assert!(transport.send_request("status", None).await.is_ok());
}

#[tokio::test]
async fn test_connect_timeout() {
    let (connector, _peers) = MemoryConnector::new(Duration::from_secs(5));
    let options = TransportOptions {
        connect_timeout: Duration::from_millis(100),
        ..options()
    };
    let transport = transport(connector, None, options);

    let err = transport.send_request("status", None).await.unwrap_err();
    assert!(matches!(err, TransportError::NotConnected { .. }), "{err:?}");
}

#[tokio::test]
async fn test_request_timeout() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let options = TransportOptions {
        request_timeout: Some(Duration::from_millis(200)),
        ..options()
    };
    let transport = transport(connector, None, options);

    let (result, peer) = tokio::join!(transport.send_request("history", None), peers.recv());
    let err = result.unwrap_err();
    assert!(matches!(err, TransportError::Timeout(_)), "{err:?}");
    assert_eq!(transport.pending_requests(), 0);
    drop(peer);
}

#[tokio::test]
async fn test_close() {
    let (connector, peers) = MemoryConnector::new(Duration::ZERO);
    spawn_agent(peers, |_, _| Ok(Value::Null));
    let transport = transport(connector.clone(), None, options());

    transport.send_request("status", None).await.unwrap();
    transport.close().await;
    assert_eq!(transport.state(), ConnectionState::Closed);

    transport.send_request("status", None).await.unwrap();
    assert_eq!(connector.connects(), 2);
}

#[tokio::test]
async fn test_close_fails_in_flight_requests() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let transport = transport(connector, None, options());

    let requests: Vec<_> = ["status", "metrics"]
        .into_iter()
        .map(|action| {
            let transport = transport.clone();
            tokio::spawn(async move { transport.send_request(action, None).await })
        })
        .collect();
    let mut peer = peers.recv().await.unwrap();
    peer.next_frame().await.unwrap();
    peer.next_frame().await.unwrap();
    assert_eq!(transport.pending_requests(), 2);

    transport.close().await;
    for request in requests {
        let err = request.await.unwrap().unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed), "{err:?}");
    }
    assert_eq!(transport.pending_requests(), 0);
    assert_eq!(transport.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_zero_keepalive_interval_is_clamped() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let options = TransportOptions {
        keepalive_interval: Duration::ZERO,
        ..options()
    };
    let transport = transport(connector, None, options);

    let request = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("status", None).await }
    });
    let mut peer = peers.recv().await.unwrap();
    let status = peer.next_frame().await.unwrap();
    peer.respond(&status, Value::Null);
    request.await.unwrap().unwrap();

    let keepalive = peer.next_frame().await.unwrap();
    assert_eq!(keepalive["action"], "ping");
}

#[tokio::test]
async fn test_keepalive_ping() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let options = TransportOptions {
        keepalive_interval: Duration::from_millis(50),
        ..options()
    };
    let transport = transport(connector, None, options);

    let request = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("status", None).await }
    });
    let mut peer = peers.recv().await.unwrap();
    let status = peer.next_frame().await.unwrap();
    peer.respond(&status, Value::Null);
    request.await.unwrap().unwrap();

    let keepalive = peer.next_frame().await.unwrap();
    assert_eq!(keepalive["action"], "ping");
    assert_eq!(keepalive["type"], "request");
    assert!(keepalive["id"].is_string());
}

#[tokio::test]
async fn test_unknown_and_garbage_frames_ignored() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let transport = transport(connector, None, options());

    let request = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("status", None).await }
    });
    let mut peer = peers.recv().await.unwrap();
    let status = peer.next_request().await.unwrap();

    peer.send(json!({ "id": "unknown", "type": "response", "success": true, "data": 1 }));
    peer.send_text("not json at all");
    peer.respond(&status, json!({ "online": true }));

    let reply = request.await.unwrap().unwrap();
    assert_eq!(reply.data, json!({ "online": true }));
    assert_eq!(transport.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_signed_envelope() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let transport = transport(connector, Some("s3cr3t-token"), options());

    let request = tokio::spawn({
        let transport = transport.clone();
        async move {
            transport
                .send_request("history", Some(json!({ "limit": 60 })))
                .await
        }
    });
    let mut peer = peers.recv().await.unwrap();
    let frame = peer.next_request().await.unwrap();

    assert_eq!(frame["type"], "request");
    assert_eq!(frame["action"], "history");
    let timestamp = frame["timestamp"].as_i64().unwrap();
    let nonce = frame["nonce"].as_str().unwrap();
    assert_eq!(nonce.len(), 8);
    let expected = signing::sign(
        "s3cr3t-token",
        "history",
        timestamp,
        nonce,
        Some(&json!({ "limit": 60 })),
    )
    .unwrap();
    assert_eq!(frame["signature"], expected);

    peer.respond(&frame, json!([]));
    request.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unsigned_envelope_has_no_auth_fields() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let transport = transport(connector, None, options());

    let request = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("status", None).await }
    });
    let mut peer = peers.recv().await.unwrap();
    let frame = peer.next_request().await.unwrap();
    assert!(frame.get("signature").is_none());
    assert!(frame.get("nonce").is_none());
    assert!(frame.get("timestamp").is_none());

    peer.respond(&frame, Value::Null);
    request.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_push_overflow_keeps_latest() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let transport = transport(connector, None, options());
    let mut subscription = transport.subscribe();

    let first = tokio::spawn({
        let transport = transport.clone();
        async move { transport.send_request("status", None).await }
    });
    let mut peer = peers.recv().await.unwrap();
    let status = peer.next_request().await.unwrap();
    for i in 0..150 {
        peer.push("metrics", json!(i));
    }
    peer.respond(&status, Value::Null);
    first.await.unwrap().unwrap();

    assert_eq!(subscription.len(), 100);
    assert_eq!(subscription.dropped(), 50);
    let received: Vec<i64> = std::iter::from_fn(|| subscription.try_recv())
        .map(|frame| frame.data.as_i64().unwrap())
        .collect();
    assert_eq!(received, (50..150).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_agent_api_calls() {
    let (connector, peers) = MemoryConnector::new(Duration::ZERO);
    spawn_agent(peers, |action, data| match action {
        "status" => Ok(json!({
            "online": true,
            "motd": "§aLobby",
            "version": "1.21.4",
            "bukkit_version": "1.21.4-R0.1-SNAPSHOT",
            "players": 2,
            "max_players": 20,
            "gamemode": "survival",
            "plugins": ["LuckPerms"],
        })),
        "metrics" => Ok(json!({ "tps_5s": 20.0, "tps_1m": 19.8, "mspt": 12.5 })),
        "history" => Ok(Value::Null),
        "admin/whitelist" => Ok(json!({ "enabled": true, "players": ["Steve"] })),
        "admin/command" => Ok(json!({ "echo": data["command"] })),
        _ => Err(format!("unknown action {action}")),
    });
    let api = AgentApi::new(transport(connector, Some("key"), options()));

    let status = api.status().await.unwrap();
    assert_eq!(status.motd, "§aLobby");
    assert_eq!(status.players, 2);
    assert_eq!(status.plugins, vec!["LuckPerms".to_string()]);

    let metrics = api.metrics().await.unwrap();
    assert_eq!(metrics.tps_1m, 19.8);
    assert_eq!(metrics.disk_total, None);

    assert!(api.history(60).await.unwrap().is_empty());

    let whitelist = api.whitelist().await.unwrap();
    assert!(whitelist.enabled);
    assert_eq!(whitelist.players, vec!["Steve".to_string()]);

    let output = api.execute_command("say hi").await.unwrap();
    assert_eq!(output, json!({ "echo": "say hi" }));

    let err = api.restart().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::RemoteError(_))
    ));
}

#[tokio::test]
async fn test_agent_reports_offline() {
    let (connector, peers) = MemoryConnector::new(Duration::ZERO);
    spawn_agent(peers, |_, _| Ok(json!({ "online": false })));
    let api = AgentApi::new(transport(connector, None, options()));

    assert!(matches!(api.status().await, Err(ClientError::ServerOffline)));
}

#[tokio::test]
async fn test_subscribe_logs() {
    let (connector, mut peers) = MemoryConnector::new(Duration::ZERO);
    let api = AgentApi::new(transport(connector, Some("key"), options()));

    let (logs, _peer) = tokio::join!(api.subscribe_logs(), async {
        let mut peer = peers.recv().await.unwrap();
        let request = peer.next_request().await.unwrap();
        assert_eq!(request["action"], "admin/logs/subscribe");
        peer.respond(&request, Value::Null);
        peer.push("metrics", json!({ "tps_5s": 20.0 }));
        peer.push("log", json!("[Server thread/INFO]: Done (3.2s)!"));
        peer.push("log", json!("[Server thread/INFO]: Steve joined the game"));
        peer
    });

    let lines: Vec<String> = logs.unwrap().take(2).collect().await;
    assert_eq!(
        lines,
        vec![
            "[Server thread/INFO]: Done (3.2s)!".to_string(),
            "[Server thread/INFO]: Steve joined the game".to_string(),
        ]
    );
}
