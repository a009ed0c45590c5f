//! Rasterization engine configuration.

use serde::{Deserialize, Serialize};

/// Rasterization engine selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine provider: `"native"` (shared library) or `"mock"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Path to the native rasterizer shared library.
    ///
    /// Required when the provider is `"native"`.
    #[serde(default)]
    pub library_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            library_path: String::new(),
        }
    }
}

fn default_provider() -> String {
    "mock".to_string()
}
