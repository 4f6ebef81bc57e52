use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(&key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split .env content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            if !key.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
    }

    pairs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub bridge: BridgeConfig,
}

/// Connection details for the deCONZ gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    /// Bridge id; scopes the new-device signal names of this session.
    pub bridge_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// JSON fixture with the devices the in-memory gateway starts with.
    pub devices_file: Option<PathBuf>,
    /// JSON list of push events replayed after setup.
    pub events_file: Option<PathBuf>,
    /// Echo every acknowledged command back as a state push.
    pub echo_commands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                host: "127.0.0.1".to_string(),
                port: 80,
                api_key: None,
                bridge_id: "00212EFFFF000000".to_string(),
            },
            bridge: BridgeConfig {
                devices_file: None,
                events_file: None,
                echo_commands: true,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("DECONZ_HOST") {
            config.gateway.host = host;
        }
        if let Ok(port) = std::env::var("DECONZ_PORT")
            && let Ok(p) = port.parse()
        {
            config.gateway.port = p;
        }
        if let Ok(api_key) = std::env::var("DECONZ_API_KEY") {
            config.gateway.api_key = Some(api_key);
        }
        if let Ok(bridge_id) = std::env::var("DECONZ_BRIDGE_ID") {
            config.gateway.bridge_id = bridge_id;
        }

        if let Ok(path) = std::env::var("BRIDGE_DEVICES_FILE") {
            config.bridge.devices_file = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("BRIDGE_EVENTS_FILE") {
            config.bridge.events_file = Some(PathBuf::from(path));
        }
        if let Ok(echo) = std::env::var("BRIDGE_ECHO_COMMANDS")
            && let Ok(e) = echo.parse()
        {
            config.bridge.echo_commands = e;
        }

        config
    }

    /// Reject values the gateway could never accept.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.bridge_id.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "bridge id must not be empty".to_string(),
            ));
        }
        if self.gateway.port == 0 {
            return Err(BridgeError::InvalidConfig(
                "gateway port must not be 0".to_string(),
            ));
        }
        Ok(())
    }
}
