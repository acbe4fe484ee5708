//! HTTP server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Lowest port that doesn't need elevated privileges.
const MIN_UNPRIVILEGED_PORT: u16 = 1024;

/// Longest accepted drain period, in seconds.
const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 300;

/// Listening address and drain period.
///
/// ```bash
/// HOST=0.0.0.0 PORT=8080 SHUTDOWN_TIMEOUT=45 tabby
/// ```
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to listen on; `0.0.0.0` exposes the API on every interface.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on, 1024 or above.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds in-flight scans get to finish after a shutdown signal (1-300).
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn default_host() -> IpAddr {
    Ipv4Addr::LOCALHOST.into()
}

impl ServerConfig {
    /// Rejects privileged ports and out-of-range drain periods.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.port >= MIN_UNPRIVILEGED_PORT,
            "port {} is privileged; choose one from {MIN_UNPRIVILEGED_PORT} upwards",
            self.port
        );
        ensure!(
            (1..=MAX_SHUTDOWN_TIMEOUT_SECS).contains(&self.shutdown_timeout),
            "shutdown timeout must be 1-{MAX_SHUTDOWN_TIMEOUT_SECS} seconds, got {}",
            self.shutdown_timeout
        );
        Ok(())
    }

    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Whether `host` is the unspecified address.
    #[must_use]
    pub const fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}
