//! # Spidev Transport
//!
//! Real [`BusTransport`] over a Linux spidev node.
//!
//! The A7105 needs chip select held low across a whole register transaction,
//! so the spidev is opened with `SPI_NO_CS` and chip select is driven
//! manually through a sysfs GPIO.

use super::BusTransport;
use crate::config::SpiConfig;
use spidev::{SpiModeFlags, Spidev, SpidevOptions};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sysfs GPIO root
const GPIO_ROOT: &str = "/sys/class/gpio";

/// Spidev-backed SPI bus with a sysfs GPIO chip select.
pub struct SpidevBus {
    /// Spidev handle
    spi: Spidev,
    /// Path to the chip-select GPIO value file
    cs_value_path: PathBuf,
}

impl std::fmt::Debug for SpidevBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpidevBus")
            .field("cs_value_path", &self.cs_value_path)
            .finish_non_exhaustive()
    }
}

impl SpidevBus {
    /// Open the spidev node and claim the chip-select GPIO.
    ///
    /// Configures the port for 8 bits per word, MSB first, SPI mode 0 at the
    /// configured clock, with the kernel's own chip select disabled. The
    /// GPIO is exported, set as an output, and driven high (deselected).
    ///
    /// # Arguments
    ///
    /// * `config` - SPI transport configuration (device path, CS GPIO, clock)
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the spidev node cannot be opened or the GPIO
    /// cannot be exported.
    pub fn open(config: &SpiConfig) -> io::Result<Self> {
        debug!("opening spidev at {}", config.device);
        let mut spi = Spidev::open(&config.device)?;

        let options = SpidevOptions::new()
            .bits_per_word(8)
            .lsb_first(false)
            .max_speed_hz(config.clock_hz)
            .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
            .build();
        spi.configure(&options)?;

        let cs_value_path = export_output_gpio(config.cs_gpio)?;
        // Deselected until the first transaction opens
        fs::write(&cs_value_path, "1")?;

        info!(
            "opened A7105 bus at {} ({} Hz, CS on GPIO {})",
            config.device, config.clock_hz, config.cs_gpio
        );

        Ok(Self { spi, cs_value_path })
    }
}

impl BusTransport for SpidevBus {
    fn begin_exclusive(&mut self) -> io::Result<()> {
        // Chip select is active low
        fs::write(&self.cs_value_path, "0")
    }

    fn end_exclusive(&mut self) -> io::Result<()> {
        fs::write(&self.cs_value_path, "1")
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.spi.write_all(data)
    }

    fn read(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.spi.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Export a sysfs GPIO as an output and return its value file path.
///
/// Re-exporting an already exported pin fails with EBUSY; that case is
/// tolerated so a restart after an unclean exit still works.
fn export_output_gpio(pin: u32) -> io::Result<PathBuf> {
    let gpio_dir = Path::new(GPIO_ROOT).join(format!("gpio{}", pin));

    if !gpio_dir.exists() {
        fs::write(Path::new(GPIO_ROOT).join("export"), pin.to_string())?;
    }

    fs::write(gpio_dir.join("direction"), "out")?;
    Ok(gpio_dir.join("value"))
}
