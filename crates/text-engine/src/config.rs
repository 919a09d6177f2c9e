//! Tuning parameters for buffers.
//!
//! Defaults reproduce the classic gap-buffer policy: load with 20% headroom, grow by 1.2x
//! whenever an edit would push usage past 90% of capacity, keep an unbounded undo history.
//! Hosts can override any field from JSON; missing fields keep their defaults.

use crate::error::{BufferError, Result};
use serde::Deserialize;

/// Gap buffer sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Capacity multiplier applied to the initial text length.
    pub initial_headroom: f64,
    /// Multiplicative growth step.
    pub growth_factor: f64,
    /// Fraction of capacity that triggers growth.
    pub grow_threshold: f64,
    /// Lower bound for any allocation.
    pub min_capacity: usize,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            initial_headroom: 1.2,
            growth_factor: 1.2,
            grow_threshold: 0.9,
            min_capacity: 16,
        }
    }
}

impl GapConfig {
    /// Check the invariants the storage layer relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_headroom >= 1.0) {
            return Err(BufferError::Config(format!(
                "initial_headroom must be >= 1.0, got {}",
                self.initial_headroom
            )));
        }
        if !(self.growth_factor > 1.0) {
            return Err(BufferError::Config(format!(
                "growth_factor must be > 1.0, got {}",
                self.growth_factor
            )));
        }
        if !(self.grow_threshold > 0.0 && self.grow_threshold <= 1.0) {
            return Err(BufferError::Config(format!(
                "grow_threshold must be in (0, 1], got {}",
                self.grow_threshold
            )));
        }
        if self.min_capacity == 0 {
            return Err(BufferError::Config("min_capacity must be > 0".to_string()));
        }
        Ok(())
    }

    /// Initial capacity for a text of `len` characters.
    pub fn initial_capacity(&self, len: usize) -> usize {
        let wanted = (len as f64 * self.initial_headroom).ceil() as usize;
        wanted.max(len + 1).max(self.min_capacity)
    }

    /// Returns `true` if holding `used` characters in `capacity` slots needs growth.
    pub fn needs_growth(&self, used: usize, capacity: usize) -> bool {
        used as f64 > self.grow_threshold * capacity as f64 || used > capacity
    }
}

/// Per-buffer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Gap buffer sizing.
    pub gap: GapConfig,
    /// Optional cap on undo history; the oldest events are evicted past it.
    pub max_undo: Option<usize>,
}

impl BufferConfig {
    /// Parse and validate a JSON object such as `{"gap": {"growth_factor": 1.5}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| BufferError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check all fields.
    pub fn validate(&self) -> Result<()> {
        self.gap.validate()?;
        if self.max_undo == Some(0) {
            return Err(BufferError::Config(
                "max_undo must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
