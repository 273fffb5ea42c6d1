use std::time::Duration;

use serde_json::Value;
use serversee_config::LogType;
use tracing::{debug, instrument};

use crate::error::{ClientError, Result};
use crate::model::ServerStatus;
use crate::normalize;
use crate::rpc::connector::USER_AGENT_VALUE;

pub const DEFAULT_BASE_URL: &str = "https://api.mcsrvstat.us";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edition {
    Java,
    Bedrock,
}

/// Client of the public mcsrvstat.us status API, for servers reachable
/// from the internet but not from here.
#[derive(Debug, Clone)]
pub struct PublicStatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl PublicStatusClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn status_url(&self, address: &str, edition: Edition) -> String {
        match edition {
            Edition::Java => format!("{}/3/{}", self.base_url, address),
            Edition::Bedrock => format!("{}/bedrock/3/{}", self.base_url, address),
        }
    }

    /// The response body as returned by the API.
    #[instrument(name = "public_api: fetch", skip(self))]
    pub async fn fetch_raw(&self, address: &str, edition: Edition) -> Result<String> {
        let url = self.status_url(address, edition);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            log_type = LogType::PublicApi.as_str(),
            %url,
            status = status.as_u16(),
            "Public status response"
        );
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    pub async fn status(&self, address: &str, edition: Edition) -> Result<ServerStatus> {
        let body = self.fetch_raw(address, edition).await?;
        let json: Value = serde_json::from_str(&body)?;
        normalize::from_public_api(&json)
    }
}
