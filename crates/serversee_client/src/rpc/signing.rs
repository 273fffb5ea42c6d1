use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{Rng, distributions::Alphanumeric};
use serde_json::Value;
use sha2::Sha256;

use crate::error::TransportError;

type HmacSha256 = Hmac<Sha256>;

pub const NONCE_LEN: usize = 8;

/// The string the agent recomputes: `action ++ timestamp ++ nonce ++ data`,
/// where `data` is the compact JSON of the payload or empty when absent.
pub fn signing_input(action: &str, timestamp: i64, nonce: &str, data: Option<&Value>) -> String {
    let data = data.map(Value::to_string).unwrap_or_default();
    format!("{action}{timestamp}{nonce}{data}")
}

/// Base64 HMAC-SHA256 of [`signing_input`] keyed with the credential.
pub fn sign(
    credential: &str,
    action: &str,
    timestamp: i64,
    nonce: &str,
    data: Option<&Value>,
) -> Result<String, TransportError> {
    let mut mac = HmacSha256::new_from_slice(credential.as_bytes())
        .map_err(|e| TransportError::InvalidFrame(format!("signing key rejected: {e}")))?;
    mac.update(signing_input(action, timestamp, nonce, data).as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
