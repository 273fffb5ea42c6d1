use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::stream;
use futures_util::Stream;
use serde_json::{Value, json};

use crate::error::Result;
use crate::model::{ServerMetrics, ServerStatus, WhitelistResponse};
use crate::normalize;
use crate::rpc::{AgentTransport, InboundFrame};

pub const DEFAULT_HISTORY_LIMIT: u32 = 60;

const LOG_ACTION: &str = "log";

/// Console lines pushed by the agent after `admin/logs/subscribe`.
pub type LogStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Typed calls over an agent transport.
#[derive(Debug, Clone)]
pub struct AgentApi {
    transport: Arc<AgentTransport>,
}

impl AgentApi {
    pub fn new(transport: Arc<AgentTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<AgentTransport> {
        &self.transport
    }

    async fn call(&self, action: &str, data: Option<Value>) -> Result<Value> {
        Ok(self.transport.send_request(action, data).await?.data)
    }

    pub async fn status(&self) -> Result<ServerStatus> {
        normalize::from_agent(&self.call("status", None).await?)
    }

    /// The `status` payload as the agent sent it, re-serialized.
    pub async fn status_raw(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.call("status", None).await?)?)
    }

    pub async fn metrics(&self) -> Result<ServerMetrics> {
        Ok(serde_json::from_value(self.call("metrics", None).await?)?)
    }

    pub async fn metrics_raw(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.call("metrics", None).await?)?)
    }

    pub async fn history(&self, limit: u32) -> Result<Vec<ServerMetrics>> {
        let data = self.call("history", Some(json!({ "limit": limit }))).await?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(data)?)
    }

    pub async fn execute_command(&self, command: &str) -> Result<Value> {
        self.call("admin/command", Some(json!({ "command": command })))
            .await
    }

    pub async fn restart(&self) -> Result<Value> {
        self.call("admin/restart", None).await
    }

    pub async fn shutdown(&self) -> Result<Value> {
        self.call("admin/shutdown", None).await
    }

    pub async fn whitelist(&self) -> Result<WhitelistResponse> {
        Ok(serde_json::from_value(self.call("admin/whitelist", None).await?)?)
    }

    pub async fn toggle_whitelist(&self, enabled: bool) -> Result<()> {
        self.call("admin/whitelist/toggle", Some(json!({ "enabled": enabled })))
            .await?;
        Ok(())
    }

    pub async fn add_whitelist(&self, name: &str) -> Result<()> {
        self.call("admin/whitelist/add", Some(json!({ "name": name })))
            .await?;
        Ok(())
    }

    pub async fn remove_whitelist(&self, name: &str) -> Result<()> {
        self.call("admin/whitelist/remove", Some(json!({ "name": name })))
            .await?;
        Ok(())
    }

    /// Subscribes to the console and yields each pushed line.
    ///
    /// The push subscription is taken before the request goes out, so no
    /// line sent right after the acknowledgement is missed.
    pub async fn subscribe_logs(&self) -> Result<LogStream> {
        let mut subscription = self.transport.subscribe();
        self.call("admin/logs/subscribe", None).await?;

        Ok(Box::pin(stream! {
            while let Some(frame) = subscription.recv().await {
                if let Some(line) = log_line(&frame) {
                    yield line;
                }
            }
        }))
    }

    /// Round trip time of a `ping` request.
    pub async fn ping(&self) -> Result<Duration> {
        let started = Instant::now();
        self.call("ping", None).await?;
        Ok(started.elapsed())
    }
}

fn log_line(frame: &InboundFrame) -> Option<String> {
    if frame.action.as_deref() != Some(LOG_ACTION) {
        return None;
    }
    Some(match &frame.data {
        Value::String(line) => line.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
