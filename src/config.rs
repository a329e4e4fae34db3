//! Command-line and environment configuration.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum TransportMode {
    /// A fresh server per request, no session tracking.
    Stateless,
    /// Server-issued session ids, each bound to its own transport.
    Session,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stateless => "stateless",
            Self::Session => "session",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("invalid listen address {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "mcu-mcp",
    about = "Weather and Material Design color tools over MCP",
    version,
    long_about = None
)]
pub struct Config {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// How HTTP requests are mapped onto MCP transports.
    #[arg(long, env = "MCP_MODE", value_enum, default_value_t = TransportMode::Stateless)]
    pub mode: TransportMode,

    /// Seconds a session may sit idle before it is evicted (session mode).
    #[arg(long, env = "MCP_SESSION_IDLE_TIMEOUT", default_value_t = 1800)]
    pub session_idle_timeout: u64,

    /// Seconds between idle-session sweeps (session mode).
    #[arg(long, env = "MCP_SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,

    /// Answer `GET /mcp` with a keep-alive event stream (stateless mode).
    #[arg(long, env = "MCP_SSE_COMPAT")]
    pub sse_compat: bool,

    /// National Weather Service API base URL.
    #[arg(long, env = "NWS_API_BASE", default_value = rmcp_weather::NWS_API_BASE)]
    pub nws_base_url: String,

    /// Serve MCP on stdio instead of HTTP.
    #[arg(long)]
    pub stdio: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            mode: TransportMode::Stateless,
            session_idle_timeout: 1800,
            sweep_interval: 60,
            sse_compat: false,
            nws_base_url: rmcp_weather::NWS_API_BASE.to_string(),
            stdio: false,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_idle_timeout == 0 {
            return Err(ConfigError::ZeroDuration("session idle timeout"));
        }
        if self.sweep_interval == 0 {
            return Err(ConfigError::ZeroDuration("sweep interval"));
        }
        self.listen_addr().map(|_| ())
    }

    /// Resolve `host:port`. Hostnames such as `localhost` go through the
    /// system resolver and the first address wins.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port));
        let host = self.host.trim();
        if host.is_empty() {
            return Err(invalid());
        }
        (host, self.port)
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout)
    }

    pub fn sweep_every(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}
