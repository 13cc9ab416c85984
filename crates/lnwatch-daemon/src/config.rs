use anyhow::{anyhow, Context, Result};
use lnwatch_wallets::BackendConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DaemonConfig {
    pub port: u16,
    pub poll_interval_secs: u64,
    pub backend: BackendConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: 7010,
            poll_interval_secs: 5,
            backend: BackendConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg: DaemonConfig = toml::from_str(&data)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    /// Reads `LNWATCH_CONFIG` if set, then applies the `LNWATCH_PORT`,
    /// `LNWATCH_POLL_INTERVAL_SECS` and `LNWATCH_BACKEND` overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var("LNWATCH_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(port) = env::var("LNWATCH_PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("invalid LNWATCH_PORT {port}"))?;
        }
        if let Ok(secs) = env::var("LNWATCH_POLL_INTERVAL_SECS") {
            cfg.poll_interval_secs = secs
                .parse()
                .with_context(|| format!("invalid LNWATCH_POLL_INTERVAL_SECS {secs}"))?;
        }
        if let Ok(kind) = env::var("LNWATCH_BACKEND") {
            cfg.backend = BackendConfig::from_kind(&kind)
                .ok_or_else(|| anyhow!("unknown backend {kind}"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(anyhow!("poll_interval_secs must be > 0"));
        }
        Ok(())
    }
}
