use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning shared by the probers, the agent transport and the monitor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Bound on a TCP or UDP status probe (connect and exchange each).
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub keepalive_interval: Duration,

    /// `None` lets a request wait until the connection drops.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,

    /// Events retained per push subscriber before the oldest is dropped.
    pub push_capacity: usize,

    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_PUSH_CAPACITY: usize = 100;
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    pub fn validate(&self) -> Result<(), String> {
        let durations = [
            ("probe_timeout", Some(self.probe_timeout)),
            ("connect_timeout", Some(self.connect_timeout)),
            ("keepalive_interval", Some(self.keepalive_interval)),
            ("request_timeout", self.request_timeout),
            ("poll_interval", Some(self.poll_interval)),
        ];
        for (name, value) in durations {
            if value.is_some_and(|d| d.is_zero()) {
                return Err(format!("client.{name} must be greater than zero"));
            }
        }
        if self.push_capacity == 0 {
            return Err("client.push_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            keepalive_interval: Self::DEFAULT_KEEPALIVE_INTERVAL,
            request_timeout: Some(Self::DEFAULT_REQUEST_TIMEOUT),
            push_capacity: Self::DEFAULT_PUSH_CAPACITY,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}
