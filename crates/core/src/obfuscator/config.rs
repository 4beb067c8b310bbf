//! Configuration for the obfuscator module.

use serde::{Deserialize, Serialize};

use crate::naming::DEFAULT_MARKER;

/// Configuration for the obfuscation pass.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObfuscationConfig {
    /// AES-256 key as 64 hex characters.
    pub key_hex: String,

    /// CBC IV as 32 hex characters.
    pub iv_hex: String,

    /// Prefix marking obfuscated title names.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Digits used for page ordinals.
    #[serde(default = "default_ordinal_width")]
    pub ordinal_width: usize,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_ordinal_width() -> usize {
    3
}

impl ObfuscationConfig {
    /// Creates a configuration with the default marker and padding.
    pub fn new(key_hex: impl Into<String>, iv_hex: impl Into<String>) -> Self {
        Self {
            key_hex: key_hex.into(),
            iv_hex: iv_hex.into(),
            marker: default_marker(),
            ordinal_width: default_ordinal_width(),
        }
    }
}

// Key material stays out of logs.
impl std::fmt::Debug for ObfuscationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObfuscationConfig")
            .field("key_hex", &"[REDACTED]")
            .field("iv_hex", &"[REDACTED]")
            .field("marker", &self.marker)
            .field("ordinal_width", &self.ordinal_width)
            .finish()
    }
}
