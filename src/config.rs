//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Only the SPI transport is configurable; protocol timing, channels and
//! constant blocks are part of the Hubsan wire protocol and compiled in.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub spi: SpiConfig,
}

/// SPI transport configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SpiConfig {
    /// Spidev device node
    #[serde(default = "default_spi_device")]
    pub device: String,

    /// Sysfs GPIO number driving the A7105 chip select
    #[serde(default = "default_cs_gpio")]
    pub cs_gpio: u32,

    /// SPI clock in Hz
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            device: default_spi_device(),
            cs_gpio: default_cs_gpio(),
            clock_hz: default_clock_hz(),
        }
    }
}

// Default value functions
fn default_spi_device() -> String { "/dev/spidev0.0".to_string() }
fn default_cs_gpio() -> u32 { 25 }
fn default_clock_hz() -> u32 { 10_000_000 }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.spi.device.is_empty() {
            return Err(crate::error::HubsanError::Config(
                toml::de::Error::custom("spi device cannot be empty")
            ));
        }

        // The A7105 tops out at 10 MHz on its SPI interface
        if self.spi.clock_hz == 0 || self.spi.clock_hz > 10_000_000 {
            return Err(crate::error::HubsanError::Config(
                toml::de::Error::custom("clock_hz must be between 1 and 10000000")
            ));
        }

        Ok(())
    }
}
