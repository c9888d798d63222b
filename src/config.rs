//! Configuration management for voicegen.
//!
//! Loads config from YAML files in standard locations. Every field has a
//! default matching the public upstream services, so running without a
//! config file works out of the box.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cache::EvictionPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for paths no route matches.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub endpoint: String,
    pub origin: String,
    pub referer: String,
    pub timeout_secs: Option<u64>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.openai.fm/api/generate".into(),
            origin: "https://www.openai.fm".into(),
            referer: "https://www.openai.fm/".into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub endpoint: String,
    pub referer: String,
    /// Host-root prefix of returned page URLs; rewritten to `{public_root}dl/`.
    pub public_root: String,
    pub filename: String,
    pub timeout_secs: Option<u64>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://tmpfiles.org/api/v1/upload".into(),
            referer: "https://tmpfiles.org/".into(),
            public_root: "https://tmpfiles.org/".into(),
            filename: "voicegen.mp3".into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub user_agent: String,
    pub default_content_type: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".into(),
            default_content_type: "audio/mpeg".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum text length in UTF-16 code units.
    pub max_text_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_text_len: 1003 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub eviction: EvictionPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tts: TtsConfig,
    pub upload: UploadConfig,
    pub proxy: ProxyConfig,
    pub limits: LimitsConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/voicegen/config.yaml
    /// 3. /etc/voicegen/config.yaml
    ///
    /// The `PORT` environment variable overrides `server.port`.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::load_file(path);
        config.apply_port_override(std::env::var("PORT").ok().as_deref());
        config
    }

    fn load_file(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/voicegen/config.yaml")),
                Some(PathBuf::from("/etc/voicegen/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }

    fn apply_port_override(&mut self, port: Option<&str>) {
        let Some(raw) = port else { return };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.server.port = port,
            Err(_) => tracing::warn!("Ignoring invalid PORT value {raw:?}"),
        }
    }

    /// Address the listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
