use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::signing;
use crate::error::TransportError;

pub const FRAME_TYPE_REQUEST: &str = "request";
pub const FRAME_TYPE_RESPONSE: &str = "response";
pub const FRAME_TYPE_PUSH: &str = "push";
pub const KEEPALIVE_ACTION: &str = "ping";

/// Outbound request frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RequestEnvelope {
    /// A fresh request with a random v4 correlation id.
    pub fn new(action: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: FRAME_TYPE_REQUEST,
            action: action.into(),
            timestamp: None,
            nonce: None,
            signature: None,
            data,
        }
    }

    /// Unsigned, untracked liveness probe.
    pub fn keepalive() -> Self {
        Self::new(KEEPALIVE_ACTION, None)
    }

    pub fn sign(
        mut self,
        credential: &str,
        timestamp: i64,
        nonce: String,
    ) -> Result<Self, TransportError> {
        let signature = signing::sign(
            credential,
            &self.action,
            timestamp,
            &nonce,
            self.data.as_ref(),
        )?;
        self.timestamp = Some(timestamp);
        self.nonce = Some(nonce);
        self.signature = Some(signature);
        Ok(self)
    }

    pub fn to_text(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::InvalidFrame(e.to_string()))
    }
}

fn default_frame_type() -> String {
    FRAME_TYPE_RESPONSE.to_string()
}

/// Any frame received from the agent: a response or a push.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default = "default_frame_type")]
    pub kind: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl InboundFrame {
    pub fn parse(text: &str) -> Result<Self, TransportError> {
        serde_json::from_str(text).map_err(|e| TransportError::InvalidFrame(e.to_string()))
    }

    pub fn is_push(&self) -> bool {
        self.kind == FRAME_TYPE_PUSH
    }

    /// Turns an explicit `success: false` into [`TransportError::RemoteError`].
    pub fn into_result(self) -> Result<Self, TransportError> {
        if self.success == Some(false) {
            let message = self
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(TransportError::RemoteError(message));
        }
        Ok(self)
    }
}
