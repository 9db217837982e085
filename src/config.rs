//! Configuration for the runtime components.
//!
//! Every field has a default matching the reference page behavior, so an
//! empty (or missing) config file yields a working setup:
//!
//! ```json
//! {
//!   "reveal": { "threshold": 0.1, "root_margin": "0px 0px -40px 0px" },
//!   "ticker": { "clock_period_ms": 1000, "rotation_period_ms": 4000 }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FolioError, Result};
use crate::types::Edges;

// =============================================================================
// Reveal
// =============================================================================

/// Intersection options for a reveal region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    /// Fraction of the region (0.0..=1.0) that must be visible to count.
    pub threshold: f32,
    /// Offsets applied to the viewport before intersecting. A negative
    /// bottom edge makes regions clear the bottom edge before they count.
    pub root_margin: Edges,
}

impl RevealOptions {
    pub const DEFAULT_THRESHOLD: f32 = 0.1;
    pub const DEFAULT_ROOT_MARGIN: Edges = Edges::new(0.0, 0.0, -40.0, 0.0);

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: Edges) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(FolioError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            root_margin: Self::DEFAULT_ROOT_MARGIN,
        }
    }
}

// =============================================================================
// Ticker
// =============================================================================

/// Periods of the two ticker triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// How often the wall clock is re-read.
    pub clock_period_ms: u64,
    /// How often the highlighted item advances.
    pub rotation_period_ms: u64,
}

impl TickerConfig {
    pub const DEFAULT_CLOCK_PERIOD_MS: u64 = 1000;
    pub const DEFAULT_ROTATION_PERIOD_MS: u64 = 4000;

    pub fn clock_period(&self) -> Duration {
        Duration::from_millis(self.clock_period_ms)
    }

    pub fn rotation_period(&self) -> Duration {
        Duration::from_millis(self.rotation_period_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.clock_period_ms == 0 {
            return Err(FolioError::InvalidPeriod { name: "clock" });
        }
        if self.rotation_period_ms == 0 {
            return Err(FolioError::InvalidPeriod { name: "rotation" });
        }
        Ok(())
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            clock_period_ms: Self::DEFAULT_CLOCK_PERIOD_MS,
            rotation_period_ms: Self::DEFAULT_ROTATION_PERIOD_MS,
        }
    }
}

// =============================================================================
// FolioConfig
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub reveal: RevealOptions,
    pub ticker: TickerConfig,
}

impl FolioConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reveal.validate()?;
        self.ticker.validate()
    }
}
