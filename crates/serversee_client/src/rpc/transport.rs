use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use serversee_config::{ClientConfig, LogType};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

use super::connector::{Connector, FrameSink, FrameStream, WebSocketConnector, websocket_url};
use super::envelope::{InboundFrame, RequestEnvelope};
use super::push::{PushHub, PushSubscription};
use super::signing;
use crate::error::TransportError;

type Completion = oneshot::Sender<Result<InboundFrame, TransportError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Unconnected,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Unconnected => "unconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Floor for `keepalive_interval`; a zero period is not a valid ticker.
pub const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub keepalive_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub push_capacity: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for TransportOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            keepalive_interval: config.keepalive_interval,
            request_timeout: config.request_timeout,
            push_capacity: config.push_capacity,
        }
    }
}

/// Tasks and outbound queue of one established connection.
struct Link {
    generation: u64,
    outbound: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
    keepalive: JoinHandle<()>,
}

struct Inner {
    state: ConnectionState,
    link: Option<Link>,
    pending: HashMap<String, Completion>,
}

/// Bookkeeping shared with the connection tasks. Never locked across an
/// `.await`.
struct Shared {
    inner: Mutex<Inner>,
    generations: AtomicU64,
    url: String,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_generation(&self) -> Option<u64> {
        let inner = self.lock();
        match (&inner.link, inner.state) {
            (Some(link), ConnectionState::Open) => Some(link.generation),
            _ => None,
        }
    }

    /// Registers the completion, then queues the frame on the connection it
    /// was built for.
    fn dispatch(
        &self,
        generation: u64,
        id: String,
        completion: Completion,
        text: String,
    ) -> Result<(), TransportError> {
        let mut inner = self.lock();
        let outbound = match &inner.link {
            Some(link) if link.generation == generation => link.outbound.clone(),
            _ => return Err(TransportError::ConnectionClosed),
        };

        inner.pending.insert(id.clone(), completion);
        if outbound.send(text).is_err() {
            inner.pending.remove(&id);
            return Err(TransportError::SendFailed);
        }
        Ok(())
    }

    fn forget(&self, id: &str) {
        self.lock().pending.remove(id);
    }

    fn route(&self, text: &str, push: &PushHub) {
        let frame = match InboundFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    log_type = LogType::Transport.as_str(),
                    url = %self.url,
                    error = %e,
                    "Ignoring unparsable frame"
                );
                return;
            }
        };

        if frame.is_push() {
            push.publish(frame);
            return;
        }

        let Some(id) = frame.id.clone() else {
            trace!(log_type = LogType::Transport.as_str(), "Dropping frame without id");
            return;
        };
        let completion = self.lock().pending.remove(&id);
        match completion {
            Some(completion) => {
                let _ = completion.send(Ok(frame));
            }
            None => trace!(
                log_type = LogType::Transport.as_str(),
                id = %id,
                "Dropping reply with no pending request"
            ),
        }
    }

    /// Detaches the link of `generation` and fails every pending request.
    /// Stale generations are ignored so a late task cannot tear down a newer
    /// connection.
    fn detach(&self, generation: Option<u64>, state: ConnectionState) -> Option<Link> {
        let (link, pending) = {
            let mut inner = self.lock();
            let current = inner.link.as_ref().map(|link| link.generation);
            if current.is_none() || (generation.is_some() && generation != current) {
                if generation.is_none() {
                    inner.state = state;
                }
                return None;
            }
            inner.state = state;
            (inner.link.take(), std::mem::take(&mut inner.pending))
        };

        if !pending.is_empty() {
            debug!(
                log_type = LogType::Transport.as_str(),
                url = %self.url,
                count = pending.len(),
                "Failing pending requests"
            );
        }
        for (_, completion) in pending {
            let _ = completion.send(Err(TransportError::ConnectionClosed));
        }
        link
    }

    /// Connection lost: every task of the link is stopped.
    fn teardown(&self, generation: u64) {
        if let Some(link) = self.detach(Some(generation), ConnectionState::Closed) {
            link.keepalive.abort();
            link.reader.abort();
            link.writer.abort();
        }
    }

    /// Local close: the writer is left to flush and send a close frame once
    /// its queue is dropped.
    fn shutdown(&self) {
        if let Some(link) = self.detach(None, ConnectionState::Closing) {
            link.keepalive.abort();
            link.reader.abort();
            drop(link.outbound);
        }
        self.lock().state = ConnectionState::Closed;
    }
}

/// A persistent, multiplexed connection to one agent.
///
/// The socket is opened lazily by the first request and reopened by the
/// first request after it drops. Concurrent callers share one connection
/// attempt.
pub struct AgentTransport {
    endpoint: String,
    credential: Option<String>,
    connector: Arc<dyn Connector>,
    options: TransportOptions,
    connect_lock: tokio::sync::Mutex<()>,
    shared: Arc<Shared>,
    push: PushHub,
}

impl AgentTransport {
    pub fn new(endpoint: impl Into<String>, credential: Option<String>) -> Self {
        Self::with_connector(
            endpoint,
            credential,
            Arc::new(WebSocketConnector),
            TransportOptions::default(),
        )
    }

    pub fn with_connector(
        endpoint: impl Into<String>,
        credential: Option<String>,
        connector: Arc<dyn Connector>,
        options: TransportOptions,
    ) -> Self {
        let endpoint = endpoint.into();
        let url = websocket_url(&endpoint);
        let push = PushHub::new(options.push_capacity);
        Self {
            endpoint,
            credential: credential.filter(|c| !c.is_empty()),
            connector,
            options,
            connect_lock: tokio::sync::Mutex::new(()),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: ConnectionState::Unconnected,
                    link: None,
                    pending: HashMap::new(),
                }),
                generations: AtomicU64::new(0),
                url,
            }),
            push,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Whether requests carry an HMAC signature.
    pub fn is_signed(&self) -> bool {
        self.credential.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn pending_requests(&self) -> usize {
        self.shared.lock().pending.len()
    }

    pub fn subscribe(&self) -> PushSubscription {
        self.push.subscribe()
    }

    /// Sends `action` and waits for the reply with the same correlation id.
    pub async fn send_request(
        &self,
        action: &str,
        data: Option<Value>,
    ) -> Result<InboundFrame, TransportError> {
        let generation = self.ensure_connected().await?;

        let mut envelope = RequestEnvelope::new(action, data);
        if let Some(credential) = &self.credential {
            envelope = envelope.sign(
                credential,
                Utc::now().timestamp(),
                signing::generate_nonce(),
            )?;
        }
        let text = envelope.to_text()?;
        let id = envelope.id;

        let (completion, reply) = oneshot::channel();
        self.shared.dispatch(generation, id.clone(), completion, text)?;
        debug!(
            log_type = LogType::Transport.as_str(),
            url = %self.shared.url,
            action,
            id = %id,
            "Request sent"
        );

        let reply = match self.options.request_timeout {
            Some(limit) => match time::timeout(limit, reply).await {
                Ok(reply) => reply,
                Err(_) => {
                    self.shared.forget(&id);
                    warn!(
                        log_type = LogType::Transport.as_str(),
                        url = %self.shared.url,
                        action,
                        "Request timed out"
                    );
                    return Err(TransportError::Timeout(limit));
                }
            },
            None => reply.await,
        };

        reply.map_err(|_| TransportError::ConnectionClosed)??.into_result()
    }

    /// Releases the socket. Pending requests fail with
    /// [`TransportError::ConnectionClosed`]; the next request reconnects.
    pub async fn close(&self) {
        let _guard = self.connect_lock.lock().await;
        self.shared.shutdown();
        debug!(
            log_type = LogType::Transport.as_str(),
            url = %self.shared.url,
            "Transport closed"
        );
    }

    async fn ensure_connected(&self) -> Result<u64, TransportError> {
        if let Some(generation) = self.shared.open_generation() {
            return Ok(generation);
        }

        let _guard = self.connect_lock.lock().await;
        if let Some(generation) = self.shared.open_generation() {
            return Ok(generation);
        }

        self.shared.lock().state = ConnectionState::Connecting;
        let url = self.shared.url.clone();
        debug!(log_type = LogType::Transport.as_str(), url = %url, "Connecting");

        let attempt =
            time::timeout(self.options.connect_timeout, self.connector.connect(&url)).await;
        let (sink, stream) = match attempt {
            Ok(Ok(halves)) => halves,
            Ok(Err(e)) => return Err(self.connect_failed(url, e.to_string())),
            Err(_) => {
                let reason = format!("timed out after {:?}", self.options.connect_timeout);
                return Err(self.connect_failed(url, reason));
            }
        };

        let generation = self.attach(sink, stream);
        info!(log_type = LogType::Transport.as_str(), url = %url, "Connected to agent");
        Ok(generation)
    }

    fn connect_failed(&self, url: String, reason: String) -> TransportError {
        self.shared.lock().state = ConnectionState::Unconnected;
        warn!(
            log_type = LogType::Transport.as_str(),
            url = %url,
            reason = %reason,
            "Connection failed"
        );
        TransportError::NotConnected { url, reason }
    }

    /// Spawns the writer, reader and keepalive tasks and publishes the link.
    /// The bookkeeping lock is held throughout so no task can observe the
    /// connection before it is registered.
    fn attach(&self, sink: FrameSink, stream: FrameStream) -> u64 {
        let generation = self.shared.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let (outbound, queue) = mpsc::unbounded_channel();

        let mut inner = self.shared.lock();
        let writer = tokio::spawn(write_loop(sink, queue, self.shared.clone(), generation));
        let reader = tokio::spawn(read_loop(
            stream,
            self.shared.clone(),
            self.push.clone(),
            generation,
        ));
        let keepalive = tokio::spawn(keepalive_loop(
            outbound.clone(),
            self.options.keepalive_interval,
        ));

        inner.link = Some(Link {
            generation,
            outbound,
            writer,
            reader,
            keepalive,
        });
        inner.state = ConnectionState::Open;
        generation
    }
}

impl Drop for AgentTransport {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

impl fmt::Debug for AgentTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentTransport")
            .field("url", &self.shared.url)
            .field("signed", &self.credential.is_some())
            .field("state", &self.state())
            .finish()
    }
}

async fn write_loop(
    mut sink: FrameSink,
    mut queue: mpsc::UnboundedReceiver<String>,
    shared: Arc<Shared>,
    generation: u64,
) {
    while let Some(text) = queue.recv().await {
        if let Err(e) = sink.send(text).await {
            warn!(
                log_type = LogType::Transport.as_str(),
                url = %shared.url,
                error = %e,
                "Write failed"
            );
            shared.teardown(generation);
            return;
        }
    }
    let _ = sink.close().await;
}

async fn read_loop(mut stream: FrameStream, shared: Arc<Shared>, push: PushHub, generation: u64) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(text) => shared.route(&text, &push),
            Err(e) => {
                warn!(
                    log_type = LogType::Transport.as_str(),
                    url = %shared.url,
                    error = %e,
                    "Connection error"
                );
                break;
            }
        }
    }
    debug!(
        log_type = LogType::Transport.as_str(),
        url = %shared.url,
        "Connection closed by peer"
    );
    shared.teardown(generation);
}

async fn keepalive_loop(outbound: mpsc::UnboundedSender<String>, interval: Duration) {
    let interval = interval.max(MIN_KEEPALIVE_INTERVAL);
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    loop {
        ticker.tick().await;
        let text = match RequestEnvelope::keepalive().to_text() {
            Ok(text) => text,
            Err(_) => continue,
        };
        if outbound.send(text).is_err() {
            break;
        }
        trace!(log_type = LogType::Transport.as_str(), "Keepalive sent");
    }
}
