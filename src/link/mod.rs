//! # Link Module
//!
//! Session initialization, the bind handshake and the control-frame loop,
//! built on the A7105 driver.
//!
//! Lifecycle is strictly sequential: [`Link::initialize`] writes the
//! baseline register configuration and runs calibration once,
//! [`Link::bind`] pairs with a receiver, [`Link::arm`] satisfies the
//! receiver's safety interlock, and [`Link::send_control`] runs for the
//! rest of the session.

mod bind;
mod control;

pub use control::{ARMING_CYCLES, CONTROL_REPEATS, INTER_SEND_DELAY, SECONDARY_CHANNEL_OFFSET};

use crate::a7105::{Register, Strobe, A7105};
use crate::bus::BusTransport;
use crate::error::Result;
use crate::protocol::session::Session;
use tracing::info;

/// Baseline register configuration written before calibration.
///
/// Values lifted from captures of the stock transmitter; several are
/// documented only as reserved constants.
const BASE_CONFIG: [(Register, u8); 11] = [
    (Register::ModeControl, 0x63),
    (Register::FifoEnd, 0x0F), // FIFO end pointer: 16-byte packets
    (Register::Clock, 0x05),
    (Register::DataRate, 0x04),
    (Register::TxDeviation, 0x2B),
    (Register::Rx, 0x62),
    (Register::RxGain1, 0x80),
    (Register::RxGain4, 0x0A),
    (Register::Code1, 0x07),
    (Register::Code2, 0x17),
    (Register::RxDemodTest, 0x47),
];

/// Boundary channels the VCO is calibrated against to characterize the PLL
/// across its range
const VCO_CAL_CHANNELS: [u8; 2] = [0x00, 0xA0];

/// One transmitter-side Hubsan link over an A7105.
pub struct Link<B: BusTransport> {
    radio: A7105<B>,
    session: Session,
}

impl<B: BusTransport> Link<B> {
    /// Wrap an already constructed radio and session.
    pub fn new(radio: A7105<B>, session: Session) -> Self {
        Self { radio, session }
    }

    /// The session this link operates under.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Program the baseline configuration and run calibration.
    ///
    /// Writes the receiver device ID and the base register table, runs the
    /// IF filter calibration once and the VCO calibration against both
    /// boundary channels, then parks the chip in standby.
    ///
    /// # Errors
    ///
    /// Calibration errors are fatal to initialization; the caller may call
    /// `initialize` again to restart the whole sequence.
    pub fn initialize(&mut self) -> Result<()> {
        info!(
            "initializing A7105 for session channel {:#04x}",
            self.session.channel
        );

        self.radio.write_id(self.session.device_id)?;
        for (reg, value) in BASE_CONFIG {
            self.radio.write_register(reg, value)?;
        }

        self.radio.calibrate_if()?;
        for channel in VCO_CAL_CHANNELS {
            self.radio.calibrate_vco(channel)?;
        }

        self.radio.strobe(Strobe::Standby)?;
        info!("A7105 initialized and calibrated");
        Ok(())
    }
}
