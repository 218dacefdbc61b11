//! Server configuration for Vega Video.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `VEGA_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use vega_core::config::GenerationSettings;

const DEFAULT_PORT: u16 = 8300;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// JSON avatar catalog. `None` uses the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// Idle time after which a wizard session is discarded.
    pub session_ttl: Duration,
    /// How often the expiry worker scans sessions.
    pub session_sweep_interval: Duration,
    /// Vendor endpoint, credential source, and request constants.
    pub generation: GenerationSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (binds to `0.0.0.0`)
    /// - `VEGA_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `VEGA_LOG_LEVEL`: log filter (default: `info`)
    /// - `VEGA_CATALOG`: path to a JSON avatar catalog (optional)
    /// - `VEGA_SESSION_TTL`: idle seconds before a session expires (default: `1800`)
    /// - `VEGA_SESSION_SWEEP_INTERVAL`: seconds between expiry scans (default: `60`)
    ///
    /// Vendor settings are read by [`GenerationSettings::from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: VEGA_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Some(addr) = lookup("VEGA_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Some(port_str) = lookup("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        let log_level = lookup("VEGA_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let catalog_path = lookup("VEGA_CATALOG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .map_or(Duration::from_secs(default), Duration::from_secs)
        };

        Self {
            bind_addr,
            log_level,
            catalog_path,
            session_ttl: secs("VEGA_SESSION_TTL", 1800),
            session_sweep_interval: secs("VEGA_SESSION_SWEEP_INTERVAL", 60),
            generation: GenerationSettings::from_lookup(&lookup),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ServerConfig::from_lookup(|key| map.get(key).map(|v| (*v).to_owned()))
    }

    #[test]
    fn defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8300)));
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.catalog_path.is_none());
        assert_eq!(cfg.session_ttl, Duration::from_secs(1800));
        assert_eq!(cfg.session_sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn port_binds_all_interfaces() {
        let cfg = config_from(&[("PORT", "9000")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
    }

    #[test]
    fn bind_addr_overrides_port() {
        let cfg = config_from(&[("PORT", "9000"), ("VEGA_BIND_ADDR", "127.0.0.1:7777")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 7777)));
    }

    #[test]
    fn session_timings_and_generation_settings_are_read() {
        let cfg = config_from(&[
            ("VEGA_SESSION_TTL", "30"),
            ("VEGA_SESSION_SWEEP_INTERVAL", "0"),
            ("VEGA_CATALOG", "/etc/vega/avatars.json"),
            ("VEGA_TTS_PROVIDER", "ELEVEN_LABS"),
        ]);
        assert_eq!(cfg.session_ttl, Duration::from_secs(30));
        assert_eq!(cfg.session_sweep_interval, Duration::from_secs(60));
        assert_eq!(cfg.catalog_path, Some(PathBuf::from("/etc/vega/avatars.json")));
        assert_eq!(cfg.generation.defaults.tts_provider, "ELEVEN_LABS");
    }
}
