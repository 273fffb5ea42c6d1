use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serversee_config::{LogType, ServerConfig};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::{ServerMetrics, ServerStatus};
use crate::service::StatusService;

/// Latest known state of one server.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    /// The server's display name, which also keys the snapshot map.
    pub name: String,
    /// The error message when the last refresh failed.
    pub status: Result<ServerStatus, String>,
    pub metrics: Option<ServerMetrics>,
    pub refreshed_at: DateTime<Utc>,
}

impl ServerSnapshot {
    pub fn is_online(&self) -> bool {
        matches!(&self.status, Ok(status) if status.online)
    }
}

/// Keeps the snapshots of a set of servers fresh.
///
/// A server is refreshed by at most one task at a time; a refresh that comes
/// due while the previous one is still running is skipped.
pub struct Monitor {
    service: Arc<StatusService>,
    servers: Vec<ServerConfig>,
    locks: HashMap<String, Arc<Mutex<()>>>,
    snapshots: watch::Sender<HashMap<String, ServerSnapshot>>,
}

impl Monitor {
    pub fn new(service: Arc<StatusService>, servers: Vec<ServerConfig>) -> Self {
        let locks = servers
            .iter()
            .map(|server| (server.display_name().to_string(), Arc::new(Mutex::new(()))))
            .collect();
        let (snapshots, _) = watch::channel(HashMap::new());
        Self {
            service,
            servers,
            locks,
            snapshots,
        }
    }

    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }

    /// Receives the whole snapshot map after every refresh.
    pub fn subscribe(&self) -> watch::Receiver<HashMap<String, ServerSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn snapshots(&self) -> HashMap<String, ServerSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn snapshot(&self, name: &str) -> Option<ServerSnapshot> {
        self.snapshots.borrow().get(name).cloned()
    }

    /// Refreshes one server. Returns `false` when a refresh of it is already
    /// running.
    pub async fn refresh(&self, server: &ServerConfig) -> bool {
        let name = server.display_name();
        let lock = match self.locks.get(name) {
            Some(lock) => lock.clone(),
            None => Arc::new(Mutex::new(())),
        };
        let Ok(_guard) = lock.try_lock() else {
            debug!(
                log_type = LogType::Monitor.as_str(),
                server = name,
                "Refresh already running, skipping"
            );
            return false;
        };

        let status = self
            .service
            .status(server)
            .await
            .map_err(|e| e.to_string());

        let metrics = match (&status, server.credential()) {
            (Ok(status), Some(_)) if status.online => self.service.metrics(server).await.ok(),
            _ => None,
        };

        if let Err(e) = &status {
            debug!(
                log_type = LogType::Monitor.as_str(),
                server = name,
                error = %e,
                "Server unreachable"
            );
        }

        let snapshot = ServerSnapshot {
            name: name.to_string(),
            status,
            metrics,
            refreshed_at: Utc::now(),
        };
        self.snapshots.send_modify(|snapshots| {
            snapshots.insert(name.to_string(), snapshot);
        });
        true
    }

    pub async fn refresh_all(&self) {
        let refreshes = self.servers.iter().map(|server| self.refresh(server));
        futures_util::future::join_all(refreshes).await;
    }

    /// Refreshes every server each `interval` until `cancel` fires.
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        info!(
            log_type = LogType::Monitor.as_str(),
            servers = self.servers.len(),
            interval = ?interval,
            "Monitor started"
        );

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    for index in 0..self.servers.len() {
                        let monitor = self.clone();
                        tasks.spawn(async move {
                            monitor.refresh(&monitor.servers[index]).await;
                        });
                    }
                }
            }

            while let Some(result) = tasks.try_join_next() {
                if let Err(e) = result {
                    warn!(
                        log_type = LogType::Monitor.as_str(),
                        error = %e,
                        "Refresh task failed"
                    );
                }
            }
        }

        tasks.shutdown().await;
        info!(log_type = LogType::Monitor.as_str(), "Monitor stopped");
    }
}
