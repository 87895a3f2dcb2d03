//! Host configuration.
//!
//! Loaded once at startup from a TOML file. Every field has a default so
//! an empty document is a valid configuration.

use serde::{Deserialize, Serialize};

use vantage_protocol::MAX_STRING_LEN;
use vantage_ui::{Canvas, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};

/// Default simulation ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document failed to parse.
    #[error("configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Canvas dimensions must be positive.
    #[error("canvas dimensions must be positive, got {width}x{height}")]
    InvalidCanvas {
        /// Configured canvas width.
        width: i32,
        /// Configured canvas height.
        height: i32,
    },

    /// The string cap must stay within the wire format's limit.
    #[error("max string length must be in 1..={max}, got {0}", max = MAX_STRING_LEN)]
    InvalidStringCap(i32),

    /// A zero tick rate would stall the session.
    #[error("tick rate must be positive")]
    InvalidTickRate,
}

/// Host-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VantageConfig {
    /// Virtual canvas width in scaled pixels.
    pub canvas_width: i32,
    /// Virtual canvas height in scaled pixels.
    pub canvas_height: i32,
    /// Longest string accepted from the wire, in code units.
    pub max_string_len: i32,
    /// Simulation ticks per second.
    pub tick_rate: u32,
}

impl Default for VantageConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            max_string_len: MAX_STRING_LEN,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl VantageConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML, unknown fields, or
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width <= 0 || self.canvas_height <= 0 {
            return Err(ConfigError::InvalidCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if self.max_string_len <= 0 || self.max_string_len > MAX_STRING_LEN {
            return Err(ConfigError::InvalidStringCap(self.max_string_len));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        Ok(())
    }

    /// The virtual canvas this configuration describes.
    #[must_use]
    pub const fn canvas(&self) -> Canvas {
        Canvas::new(self.canvas_width, self.canvas_height)
    }
}
