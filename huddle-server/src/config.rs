use crate::ConfigError;
use huddle_core::IceServerConfig;
use huddle_core::utils::default_ice_servers;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// How many recent messages a joining connection receives.
    pub history_limit: usize,
    /// Handed to every client in its `welcome` event.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            history_limit: DEFAULT_HISTORY_LIMIT,
            ice_servers: default_ice_servers(),
        }
    }
}

impl ServerConfig {
    /// Reads `HUDDLE_BIND`, `HUDDLE_HISTORY_LIMIT`, `TURN_URL`, `TURN_USERNAME`
    /// and `TURN_CREDENTIAL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("HUDDLE_BIND") {
            config.bind_addr = parse("HUDDLE_BIND", raw)?;
        }

        if let Some(raw) = lookup("HUDDLE_HISTORY_LIMIT") {
            config.history_limit = parse("HUDDLE_HISTORY_LIMIT", raw)?;
        }

        if let Some(turn_url) = lookup("TURN_URL").filter(|url| !url.is_empty()) {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: lookup("TURN_USERNAME"),
                credential: lookup("TURN_CREDENTIAL"),
            });
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = raw.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value: raw,
    })
}
