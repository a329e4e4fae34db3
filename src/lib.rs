//! mcu-mcp - Weather and Material Design color tools over MCP
//!
//! A unified MCP server that exposes the `rmcp-weather` and `rmcp-material`
//! tools in one binary, over Streamable HTTP or stdio.

pub mod config;
pub mod http;
pub mod server;

pub use config::{Config, ConfigError, LogFormat, TransportMode};
pub use server::McuServer;
