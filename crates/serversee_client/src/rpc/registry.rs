use std::sync::Arc;

use dashmap::DashMap;
use serversee_config::LogType;
use tracing::debug;

use super::connector::{Connector, WebSocketConnector};
use super::transport::{AgentTransport, TransportOptions};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransportKey {
    endpoint: String,
    credential: Option<String>,
}

impl TransportKey {
    fn new(endpoint: &str, credential: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            credential: credential.filter(|c| !c.is_empty()).map(String::from),
        }
    }
}

/// One shared transport per exact (endpoint, credential) pair.
pub struct TransportRegistry {
    transports: DashMap<TransportKey, Arc<AgentTransport>>,
    connector: Arc<dyn Connector>,
    options: TransportOptions,
}

impl TransportRegistry {
    pub fn new(options: TransportOptions) -> Self {
        Self::with_connector(Arc::new(WebSocketConnector), options)
    }

    pub fn with_connector(connector: Arc<dyn Connector>, options: TransportOptions) -> Self {
        Self {
            transports: DashMap::new(),
            connector,
            options,
        }
    }

    pub fn get_or_create(&self, endpoint: &str, credential: Option<&str>) -> Arc<AgentTransport> {
        let key = TransportKey::new(endpoint, credential);
        let credential = key.credential.clone();
        self.transports
            .entry(key)
            .or_insert_with(|| {
                debug!(
                    log_type = LogType::Registry.as_str(),
                    endpoint,
                    signed = credential.is_some(),
                    "Creating transport"
                );
                Arc::new(AgentTransport::with_connector(
                    endpoint,
                    credential,
                    self.connector.clone(),
                    self.options.clone(),
                ))
            })
            .value()
            .clone()
    }

    /// Closes and evicts the transport for this pair, if any.
    pub async fn remove(&self, endpoint: &str, credential: Option<&str>) -> bool {
        let key = TransportKey::new(endpoint, credential);
        match self.transports.remove(&key) {
            Some((_, transport)) => {
                transport.close().await;
                debug!(log_type = LogType::Registry.as_str(), endpoint, "Transport removed");
                true
            }
            None => false,
        }
    }

    pub async fn close_all(&self) {
        let transports: Vec<Arc<AgentTransport>> = self
            .transports
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.transports.clear();

        for transport in transports {
            transport.close().await;
        }
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new(TransportOptions::default())
    }
}
