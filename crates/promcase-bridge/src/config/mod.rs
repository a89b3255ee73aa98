//! Bridge config loader (strict YAML + environment overrides).
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file named by
//! `PROMCASE_CONFIG` (if set), then the environment variables below.
//!
//! | env | field |
//! |---|---|
//! | `QUEUE_LEN` | `queue.capacity` |
//! | `UDP_PORT` | port of `udp.listen` |
//! | `UDP_MESSAGE_MAX_LEN` | `udp.max_datagram_bytes` |
//! | `TCP_PORT` | port of `http.listen` |

pub mod schema;

use std::fs;
use std::net::SocketAddr;

use promcase_core::error::{PromcaseError, Result};

pub use schema::{BridgeConfig, HttpSection, LogFormat, LogSection, QueueSection, RegistrySection, UdpSection};

/// Env var naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "PROMCASE_CONFIG";

pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PromcaseError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig = serde_yaml::from_str(s)
        .map_err(|e| PromcaseError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from the process environment.
pub fn load() -> Result<BridgeConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using `lookup` for environment access.
pub fn load_with<F>(lookup: F) -> Result<BridgeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match lookup(CONFIG_PATH_ENV) {
        Some(path) => load_from_file(&path)?,
        None => BridgeConfig::default(),
    };
    apply_env_overrides(&mut cfg, lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply the environment overrides from the table above.
pub fn apply_env_overrides<F>(cfg: &mut BridgeConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("QUEUE_LEN") {
        cfg.queue.capacity = parse_env("QUEUE_LEN", &v)?;
    }
    if let Some(v) = lookup("UDP_MESSAGE_MAX_LEN") {
        cfg.udp.max_datagram_bytes = parse_env("UDP_MESSAGE_MAX_LEN", &v)?;
    }
    if let Some(v) = lookup("UDP_PORT") {
        cfg.udp.listen = with_port(&cfg.udp.listen, parse_env("UDP_PORT", &v)?)?;
    }
    if let Some(v) = lookup("TCP_PORT") {
        cfg.http.listen = with_port(&cfg.http.listen, parse_env("TCP_PORT", &v)?)?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, v: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    v.trim()
        .parse()
        .map_err(|e| PromcaseError::Config(format!("{key}={v:?}: {e}")))
}

fn with_port(listen: &str, port: u16) -> Result<String> {
    let mut addr: SocketAddr = listen
        .parse()
        .map_err(|e| PromcaseError::Config(format!("listen address {listen:?}: {e}")))?;
    addr.set_port(port);
    Ok(addr.to_string())
}
