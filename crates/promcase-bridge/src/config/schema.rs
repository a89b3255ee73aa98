use std::net::SocketAddr;

use serde::Deserialize;
use promcase_core::error::{PromcaseError, Result};

use crate::registry::{validate_bounds, DEFAULT_BUCKETS};

/// Largest UDP payload over IPv4.
const MAX_UDP_PAYLOAD: usize = 65507;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub udp: UdpSection,

    #[serde(default)]
    pub http: HttpSection,

    #[serde(default)]
    pub queue: QueueSection,

    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub log: LogSection,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            udp: UdpSection::default(),
            http: HttpSection::default(),
            queue: QueueSection::default(),
            registry: RegistrySection::default(),
            log: LogSection::default(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PromcaseError::UnsupportedVersion);
        }
        self.udp.validate()?;
        self.http.validate()?;
        self.queue.validate()?;
        self.registry.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UdpSection {
    #[serde(default = "default_udp_listen")]
    pub listen: String,

    /// Receive buffer size; longer datagrams are truncated by the socket.
    #[serde(default = "default_max_datagram_bytes")]
    pub max_datagram_bytes: usize,
}

impl Default for UdpSection {
    fn default() -> Self {
        Self {
            listen: default_udp_listen(),
            max_datagram_bytes: default_max_datagram_bytes(),
        }
    }
}

impl UdpSection {
    pub fn validate(&self) -> Result<()> {
        parse_listen("udp.listen", &self.listen)?;
        if !(1..=MAX_UDP_PAYLOAD).contains(&self.max_datagram_bytes) {
            return Err(PromcaseError::Config(format!(
                "udp.max_datagram_bytes must be between 1 and {MAX_UDP_PAYLOAD}"
            )));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen("udp.listen", &self.listen)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    #[serde(default = "default_http_listen")]
    pub listen: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
        }
    }
}

impl HttpSection {
    pub fn validate(&self) -> Result<()> {
        parse_listen("http.listen", &self.listen).map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen("http.listen", &self.listen)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSection {
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

impl QueueSection {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(PromcaseError::Config("queue.capacity must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Histogram bounds used when an update carries no `b` arg.
    #[serde(default = "default_buckets")]
    pub default_buckets: Vec<f64>,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            default_buckets: default_buckets(),
        }
    }
}

impl RegistrySection {
    pub fn validate(&self) -> Result<()> {
        validate_bounds(&self.default_buckets)
            .map_err(|e| PromcaseError::Config(format!("registry.default_buckets: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn parse_listen(field: &str, s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| PromcaseError::Config(format!("{field} must be a valid SocketAddr ({s:?}): {e}")))
}

fn default_udp_listen() -> String {
    "0.0.0.0:10001".into()
}
fn default_max_datagram_bytes() -> usize {
    1024
}
fn default_http_listen() -> String {
    "0.0.0.0:10002".into()
}
fn default_queue_capacity() -> usize {
    10000
}
fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
fn default_log_level() -> String {
    "info".into()
}
