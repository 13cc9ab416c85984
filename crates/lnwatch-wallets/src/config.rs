use crate::fake::{FakeConfig, FakeWallet};
use crate::void::VoidWallet;
use lnwatch_core::lightning::LightningBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which backend to run, and its settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    #[default]
    Void,
    Fake(FakeConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Void => "void",
            BackendConfig::Fake(_) => "fake",
        }
    }

    /// Parses the short backend names accepted on the command line and in
    /// the environment, using default settings for the backend.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "void" => Some(BackendConfig::Void),
            "fake" => Some(BackendConfig::Fake(FakeConfig::default())),
            _ => None,
        }
    }

    pub fn build(&self) -> Arc<dyn LightningBackend> {
        info!("using {} lightning backend", self.kind());
        match self {
            BackendConfig::Void => Arc::new(VoidWallet::new()),
            BackendConfig::Fake(config) => Arc::new(FakeWallet::new(config.clone())),
        }
    }
}
