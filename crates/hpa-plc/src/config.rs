//! Controller configuration

use anyhow::Result;
use serde::Deserialize;

/// HPA placement controller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the per-kind JSON schemas; compiled-in copies are
    /// used when unset
    #[serde(default)]
    pub schema_dir: Option<String>,
}

fn default_api_port() -> u16 {
    9042
}

impl ControllerConfig {
    /// Load configuration from `HPAPLC_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("HPAPLC"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ControllerConfig {
            api_port: default_api_port(),
            schema_dir: None,
        }))
    }
}
