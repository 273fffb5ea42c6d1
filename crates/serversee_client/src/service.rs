use std::sync::Arc;
use std::time::Duration;

use serversee_config::{ClientConfig, LogType, ServerConfig, ServerMode};
use tracing::debug;

use crate::api::AgentApi;
use crate::error::{ClientError, Result};
use crate::model::{ServerMetrics, ServerStatus};
use crate::ping::{bedrock, icon, java, split_host_port};
use crate::public_api::{Edition, PublicStatusClient};
use crate::rpc::TransportRegistry;

/// Routes a configured server to the source that can describe it.
pub struct StatusService {
    registry: Arc<TransportRegistry>,
    config: ClientConfig,
    public: Option<PublicStatusClient>,
}

impl StatusService {
    pub fn new(registry: Arc<TransportRegistry>, config: ClientConfig) -> Self {
        Self {
            registry,
            config,
            public: None,
        }
    }

    pub fn with_public_api(mut self, client: PublicStatusClient) -> Self {
        self.public = Some(client);
        self
    }

    pub fn registry(&self) -> &Arc<TransportRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn probe_timeout(&self) -> Duration {
        self.config.probe_timeout
    }

    /// Agent calls for a server in agent mode.
    pub fn agent(&self, server: &ServerConfig) -> Result<AgentApi> {
        if server.mode != ServerMode::AgentApi {
            return Err(ClientError::Unsupported(format!(
                "'{}' is not managed by an agent",
                server.display_name()
            )));
        }
        let transport = self
            .registry
            .get_or_create(&server.endpoint, server.credential());
        Ok(AgentApi::new(transport))
    }

    /// Like [`agent`](Self::agent), also requiring a credential.
    pub fn admin(&self, server: &ServerConfig) -> Result<AgentApi> {
        if server.credential().is_none() {
            return Err(ClientError::Unsupported(format!(
                "'{}' has no credential configured",
                server.display_name()
            )));
        }
        self.agent(server)
    }

    pub async fn status(&self, server: &ServerConfig) -> Result<ServerStatus> {
        let status = match server.mode {
            ServerMode::AgentApi => self.agent(server)?.status().await?,
            ServerMode::JavaDirect => {
                let (host, port) = endpoint(server)?;
                java::probe(&host, port, self.probe_timeout()).await?
            }
            ServerMode::BedrockDirect => {
                let (host, port) = endpoint(server)?;
                let status = bedrock::probe(&host, port, self.probe_timeout()).await?;
                icon::with_fallback_icon(status, &host, port, self.probe_timeout()).await
            }
        };
        Ok(self.apply_address_icon(server, status).await)
    }

    async fn apply_address_icon(
        &self,
        server: &ServerConfig,
        mut status: ServerStatus,
    ) -> ServerStatus {
        if status.icon.is_some() {
            return status;
        }
        if let Some(address) = server.icon_address() {
            status.icon = icon::icon_from_address(address, self.probe_timeout()).await;
            debug!(
                log_type = LogType::Ping.as_str(),
                server = server.display_name(),
                found = status.icon.is_some(),
                "Icon lookup on server address"
            );
        }
        status
    }

    /// Only agent-mode servers with a credential report metrics.
    pub async fn metrics(&self, server: &ServerConfig) -> Result<ServerMetrics> {
        self.admin(server)?.metrics().await
    }

    /// Status through the public API. Agent-mode servers are looked up by
    /// their `server_address`.
    pub async fn public_status(&self, server: &ServerConfig) -> Result<ServerStatus> {
        let Some(client) = &self.public else {
            return Err(ClientError::Unsupported(
                "public status API is not configured".to_string(),
            ));
        };
        let (address, edition) = match server.mode {
            ServerMode::JavaDirect => (server.endpoint.trim(), Edition::Java),
            ServerMode::BedrockDirect => (server.endpoint.trim(), Edition::Bedrock),
            ServerMode::AgentApi => match server.server_address.as_deref() {
                Some(address) if !address.trim().is_empty() => (address.trim(), Edition::Java),
                _ => {
                    return Err(ClientError::Unsupported(format!(
                        "'{}' has no public server address",
                        server.display_name()
                    )));
                }
            },
        };
        client.status(address, edition).await
    }

    /// Closes the server's transport, if it has one.
    pub async fn forget(&self, server: &ServerConfig) -> bool {
        match server.mode {
            ServerMode::AgentApi => {
                self.registry
                    .remove(&server.endpoint, server.credential())
                    .await
            }
            _ => false,
        }
    }
}

fn endpoint(server: &ServerConfig) -> Result<(String, u16)> {
    split_host_port(&server.endpoint, server.mode.default_port())
        .ok_or_else(|| ClientError::InvalidEndpoint(server.endpoint.clone()))
}
