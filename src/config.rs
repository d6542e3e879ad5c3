//! Nodenet configuration.
//!
//! ```rust
//! use nodenet_rs::{NetConfig, ChannelDefault};
//!
//! let cfg = NetConfig::from_json(r#"{
//!     "name": "braitenberg",
//!     "gate_defaults": { "threshold": 0.1 },
//!     "unbound_channels": "closed"
//! }"#).unwrap();
//! assert_eq!(cfg.unbound_channels, ChannelDefault::Closed);
//! assert_eq!(cfg.gate_defaults.max, 1.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::model::GateParameters;
use crate::{Error, Result};

/// How a directional channel behaves while no Activator gates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelDefault {
    /// Coupled Pipe logic runs.
    #[default]
    Open,
    /// Channel behaves as if its Activator were at zero.
    Closed,
}

/// Configuration for a nodenet instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub name: String,
    /// Parameters given to every gate at node creation.
    pub gate_defaults: GateParameters,
    pub unbound_channels: ChannelDefault,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            name: "nodenet".into(),
            gate_defaults: GateParameters::default(),
            unbound_channels: ChannelDefault::Open,
        }
    }
}

impl NetConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: NetConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("name must not be empty".into()));
        }
        self.gate_defaults
            .validate()
            .map_err(|e| Error::Config(format!("gate_defaults: {e}")))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_unbound_channels(mut self, policy: ChannelDefault) -> Self {
        self.unbound_channels = policy;
        self
    }
}
