use anyhow::Context as _;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

pub const ADDR_ENV: &str = "CLASSY_ADDR";
pub const LOG_ENV: &str = "CLASSY_LOG";

/// Server settings, read from TOML:
///
/// ```toml
/// addr = "127.0.0.1:5001"
/// log = "classy_api=debug,info"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub addr: String,
    /// `tracing_subscriber::EnvFilter` directives.
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: "127.0.0.1:5001".to_owned(),
            log: "info".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid config")
    }

    /// Read `path` when it exists, fall back to defaults otherwise, then
    /// apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?
        } else {
            Config::default()
        };
        Ok(config.with_env())
    }

    pub fn with_env(self) -> Self {
        self.with_overrides(std::env::var(ADDR_ENV).ok(), std::env::var(LOG_ENV).ok())
    }

    fn with_overrides(mut self, addr: Option<String>, log: Option<String>) -> Self {
        if let Some(addr) = addr {
            self.addr = addr;
        }
        if let Some(log) = log {
            self.log = log;
        }
        self
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.addr
            .parse()
            .with_context(|| format!("bad listen address {:?}", self.addr))
    }
}
