#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::{Value, json};
use serversee_client::TransportError;
use serversee_client::rpc::{Connector, FrameSink, FrameStream};
use serversee_protocol::minecraft::bedrock::{UNCONNECTED_PONG_ID, UnconnectedPong};
use serversee_protocol::minecraft::java::ServerBoundHandshake;
use serversee_protocol::minecraft::java::status::ClientBoundResponse;
use serversee_protocol::{MAX_FRAME_LEN, Packet, ProtocolString, read_frame, write_packet};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const FAVICON: &str = "data:image/png;base64,iVBORw0KGgo=";

/// How the Java fixture answers a status request.
#[derive(Debug, Clone)]
pub enum JavaReply {
    Json(String),
    WrongPacketId,
    Silent,
}

/// A Java status server on 127.0.0.1 that answers every connection the same
/// way.
pub async fn spawn_java_server(reply: JavaReply) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    serve_java(listener, reply);
    addr
}

fn serve_java(listener: TcpListener, reply: JavaReply) {
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let reply = reply.clone();
            tokio::spawn(async move {
                let packet = read_frame(&mut stream, MAX_FRAME_LEN).await.unwrap();
                let handshake = ServerBoundHandshake::from_packet(&packet).unwrap();
                assert!(handshake.is_status_request());
                let request = read_frame(&mut stream, MAX_FRAME_LEN).await.unwrap();
                assert_eq!(request.id, 0x00);

                match reply {
                    JavaReply::Json(json) => {
                        let packet = ClientBoundResponse::new(json).to_packet().unwrap();
                        write_packet(&mut stream, packet).await.unwrap();
                    }
                    JavaReply::WrongPacketId => {
                        let mut packet = Packet::new(0x01);
                        packet.encode(&ProtocolString::from("{}")).unwrap();
                        write_packet(&mut stream, packet).await.unwrap();
                    }
                    JavaReply::Silent => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            });
        }
    });
}

pub fn java_status_json(motd: &str, online: i64, max: i64, favicon: Option<&str>) -> String {
    let mut json = json!({
        "version": { "name": "1.20.4", "protocol": 765 },
        "players": { "max": max, "online": online },
        "description": { "text": motd },
    });
    if let Some(favicon) = favicon {
        json["favicon"] = Value::from(favicon);
    }
    json.to_string()
}

/// A port on 127.0.0.1 with nothing listening.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// A Bedrock server that answers every ping with `advertisement`, or with
/// `raw` bytes when given.
pub async fn spawn_bedrock_server(advertisement: &str, raw: Option<Vec<u8>>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    serve_bedrock(socket, advertisement, raw);
    addr
}

/// A Bedrock server and a Java server sharing one port number, like a
/// Geyser setup.
pub async fn spawn_crossplay_server(advertisement: &str, java: JavaReply) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let socket = UdpSocket::bind(addr).await.unwrap();
    serve_java(listener, java);
    serve_bedrock(socket, advertisement, None);
    addr
}

fn serve_bedrock(socket: UdpSocket, advertisement: &str, raw: Option<Vec<u8>>) {
    let pong = UnconnectedPong {
        packet_id: UNCONNECTED_PONG_ID,
        advertisement: advertisement.to_string(),
    };

    tokio::spawn(async move {
        let mut buf = [0u8; 1500];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            assert_eq!(len, 33);
            assert_eq!(buf[0], 0x01);
            let mut time = [0u8; 8];
            time.copy_from_slice(&buf[1..9]);

            let reply = match &raw {
                Some(raw) => raw.clone(),
                None => pong.to_bytes(i64::from_be_bytes(time), 0x1234).to_vec(),
            };
            let _ = socket.send_to(&reply, peer).await;
        }
    });
}

/// A UDP socket that swallows everything.
pub async fn spawn_silent_udp() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

/// Test side of one in-memory agent connection.
pub struct AgentPeer {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: mpsc::UnboundedSender<String>,
}

impl AgentPeer {
    /// Next frame from the client, parsed.
    pub async fn next_frame(&mut self) -> Option<Value> {
        let text = tokio::time::timeout(Duration::from_secs(5), self.incoming.recv())
            .await
            .ok()??;
        Some(serde_json::from_str(&text).unwrap())
    }

    /// Next request that is not a keepalive.
    pub async fn next_request(&mut self) -> Option<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["action"] != "ping" {
                return Some(frame);
            }
        }
    }

    pub fn respond(&self, request: &Value, data: Value) {
        self.send(json!({
            "id": request["id"],
            "type": "response",
            "success": true,
            "data": data,
        }));
    }

    pub fn fail(&self, request: &Value, message: &str) {
        self.send(json!({
            "id": request["id"],
            "type": "response",
            "success": false,
            "message": message,
        }));
    }

    pub fn push(&self, action: &str, data: Value) {
        self.send(json!({ "type": "push", "action": action, "data": data }));
    }

    pub fn send(&self, frame: Value) {
        let _ = self.outgoing.send(frame.to_string());
    }

    pub fn send_text(&self, text: &str) {
        let _ = self.outgoing.send(text.to_string());
    }
}

/// Connects transports to in-memory agents handed out through `peers`.
pub struct MemoryConnector {
    connects: AtomicUsize,
    refuse: AtomicBool,
    delay: Duration,
    peers: mpsc::UnboundedSender<AgentPeer>,
}

impl MemoryConnector {
    pub fn new(delay: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<AgentPeer>) {
        let (peers, accepted) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            connects: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
            delay,
            peers,
        });
        (connector, accepted)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected {
                url: url.to_string(),
                reason: "refused".to_string(),
            });
        }

        let (to_agent, incoming) = mpsc::unbounded_channel::<String>();
        let (outgoing, from_agent) = mpsc::unbounded_channel::<String>();

        let sink = futures_util::sink::unfold(to_agent, |to_agent, text: String| async move {
            to_agent
                .send(text)
                .map_err(|_| TransportError::ConnectionClosed)?;
            Ok::<_, TransportError>(to_agent)
        });
        let stream = UnboundedReceiverStream::new(from_agent).map(Ok);

        let _ = self.peers.send(AgentPeer { incoming, outgoing });
        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

/// Answers every request on every accepted connection with `handler`.
pub fn spawn_agent<F>(mut peers: mpsc::UnboundedReceiver<AgentPeer>, handler: F)
where
    F: Fn(&str, &Value) -> Result<Value, String> + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    tokio::spawn(async move {
        while let Some(mut peer) = peers.recv().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                while let Some(request) = peer.next_request().await {
                    let action = request["action"].as_str().unwrap_or_default().to_string();
                    match handler(&action, &request["data"]) {
                        Ok(data) => peer.respond(&request, data),
                        Err(message) => peer.fail(&request, &message),
                    }
                }
            });
        }
    });
}

/// A one-shot HTTP/1.1 server replying `status` with `body`. The request
/// head is sent back through the returned channel.
pub async fn spawn_http_server(status: u16, body: &str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (heads, received) = mpsc::unbounded_channel();
    let body = body.to_string();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = heads.send(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });
    (addr, received)
}
