//! Adapter configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::render_mode::RenderMode;

/// Prefix for generated element ids.
pub const DEFAULT_ID_PREFIX: &str = "tether";

/// Settings for one adapter instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Whether the adapter runs without a rendering surface.
    pub headless: bool,
    /// Prefix used when the identity service generates an id.
    pub id_prefix: String,
    /// Render mode to resolve on startup, if any.
    pub render_mode: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            headless: false,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            render_mode: None,
        }
    }
}

impl AdapterConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        if let Some(mode) = &config.render_mode {
            if !mode.trim().is_empty() {
                mode.parse::<RenderMode>()?;
            }
        }
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
