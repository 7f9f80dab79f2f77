use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Frame-wide behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameConfig {
    /// Upper bound for a single show/hide animation. `None` waits forever.
    #[serde(default)]
    pub transition_timeout_ms: Option<u64>,

    /// Capacity of the lifecycle event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Drive the input surface while views are transitioning
    #[serde(default = "default_block_input")]
    pub block_input: bool,
}

fn default_event_capacity() -> usize {
    64
}

fn default_block_input() -> bool {
    true
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            transition_timeout_ms: None,
            event_capacity: default_event_capacity(),
            block_input: default_block_input(),
        }
    }
}

impl FrameConfig {
    pub fn builder() -> FrameConfigBuilder {
        FrameConfigBuilder::new()
    }

    /// Default settings plus a timeout so a stuck animation cannot lock input forever
    pub fn guarded() -> Self {
        Self {
            transition_timeout_ms: Some(2000),
            ..Self::default()
        }
    }

    /// Tracks transitions without touching the input surface
    pub fn headless() -> Self {
        Self {
            block_input: false,
            ..Self::default()
        }
    }

    pub fn transition_timeout(&self) -> Option<Duration> {
        self.transition_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FrameConfig =
            toml::from_str(content).context("Failed to parse frame config")?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading frame config from: {:?}", path);

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        info!(
            "Loaded frame config (timeout: {:?}, block_input: {})",
            config.transition_timeout(),
            config.block_input
        );
        Ok(config)
    }
}

/// Builder for [`FrameConfig`]
#[derive(Debug, Clone, Default)]
pub struct FrameConfigBuilder {
    config: FrameConfig,
}

impl FrameConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition_timeout(mut self, timeout: Duration) -> Self {
        self.config.transition_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    pub fn block_input(mut self, enabled: bool) -> Self {
        self.config.block_input = enabled;
        self
    }

    pub fn build(self) -> FrameConfig {
        self.config
    }
}
