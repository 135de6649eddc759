//! # A7105 Analog Calibration
//!
//! IF filter bank and VCO calibration sequences.
//!
//! Both follow the same shape: select the calibration in the calibration
//! register, poll that register until the chip clears the busy bit, then
//! check the per-sequence status register for a chip-reported failure.
//! Either failure mode is fatal to session initialization; the caller may
//! rerun the whole sequence.

use super::{A7105, Register, POLL_INTERVAL};
use crate::bus::BusTransport;
use crate::error::{CalibrationKind, HubsanError, Result};
use std::thread;
use tracing::{debug, info};

/// Calibration register bit selecting (and reporting busy for) the IF
/// filter bank calibration
const IF_CAL_BUSY: u8 = 0x01;

/// Calibration register bit selecting (and reporting busy for) the VCO
/// calibration
const VCO_CAL_BUSY: u8 = 0x02;

/// IF calibration status register failure flag (FBCF)
const IF_CAL_FAILED: u8 = 0x10;

/// VCO calibration status register failure flag (VBCF)
const VCO_CAL_FAILED: u8 = 0x08;

/// Poll attempts before a calibration is declared stuck
pub const CALIBRATION_MAX_CHECKS: usize = 3;

impl<B: BusTransport> A7105<B> {
    /// Run the IF filter bank calibration.
    ///
    /// # Errors
    ///
    /// * `HubsanError::CalibrationTimeout` if the busy bit does not clear
    ///   within [`CALIBRATION_MAX_CHECKS`] polls at 1 ms spacing.
    /// * `HubsanError::CalibrationFailed` if the chip sets its FBCF flag.
    pub fn calibrate_if(&mut self) -> Result<()> {
        debug!("starting IF filter calibration");
        self.write_register(Register::Calibration, IF_CAL_BUSY)?;
        self.poll_calibration(IF_CAL_BUSY, CalibrationKind::IfFilter)?;

        let status = self.read_register(Register::IfCalibration)?;
        if status & IF_CAL_FAILED != 0 {
            return Err(HubsanError::CalibrationFailed(CalibrationKind::IfFilter));
        }

        info!("IF filter calibration complete");
        Ok(())
    }

    /// Run the VCO calibration against a target channel.
    ///
    /// Called once per boundary channel during initialization to
    /// characterize the PLL across its range.
    ///
    /// # Arguments
    ///
    /// * `channel` - PLL channel value the VCO is calibrated against
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`calibrate_if`](Self::calibrate_if), against the
    /// VCO busy and failure flags.
    pub fn calibrate_vco(&mut self, channel: u8) -> Result<()> {
        debug!("starting VCO calibration for channel {:#04x}", channel);
        self.write_register(Register::PllChannel, channel)?;
        self.write_register(Register::Calibration, VCO_CAL_BUSY)?;
        self.poll_calibration(VCO_CAL_BUSY, CalibrationKind::Vco)?;

        let status = self.read_register(Register::VcoCalibration)?;
        if status & VCO_CAL_FAILED != 0 {
            return Err(HubsanError::CalibrationFailed(CalibrationKind::Vco));
        }

        info!("VCO calibration complete for channel {:#04x}", channel);
        Ok(())
    }

    /// Poll the calibration register until `busy_bit` clears.
    fn poll_calibration(&mut self, busy_bit: u8, kind: CalibrationKind) -> Result<()> {
        for _ in 0..CALIBRATION_MAX_CHECKS {
            if self.read_register(Register::Calibration)? & busy_bit == 0 {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        Err(HubsanError::CalibrationTimeout(kind))
    }
}
