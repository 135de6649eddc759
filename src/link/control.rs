//! # Control Loop
//!
//! Periodic control-frame transmission after binding.
//!
//! Each logical frame goes out four times on the session channel and once
//! more on a secondary channel offset by 0x23, fire-and-forget: no
//! completion polling and no acknowledgement. Whether the secondary send is
//! frequency-hop redundancy or a distinct logical channel is unresolved;
//! two transmissions on two channel values is what the receiver expects.

use super::Link;
use crate::a7105::Strobe;
use crate::bus::BusTransport;
use crate::error::Result;
use crate::protocol::codec::{build_control_packet, ControlSetpoint};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Sends of each frame on the primary channel
pub const CONTROL_REPEATS: usize = 4;

/// Offset of the secondary channel from the session channel
pub const SECONDARY_CHANNEL_OFFSET: u8 = 0x23;

/// Delay after each control send
pub const INTER_SEND_DELAY: Duration = Duration::from_millis(3);

/// Neutral frames the receiver must see before honoring real commands
pub const ARMING_CYCLES: usize = 100;

impl<B: BusTransport> Link<B> {
    /// Encode and transmit one control frame with redundancy.
    ///
    /// # Arguments
    ///
    /// * `setpoint` - Logical throttle/rudder/elevator/aileron values
    ///
    /// # Errors
    ///
    /// Only `HubsanError::Bus`; the control path never waits on the chip.
    pub fn send_control(&mut self, setpoint: &ControlSetpoint) -> Result<()> {
        let packet = build_control_packet(setpoint);
        debug!("sending control packet: {:02x?}", packet);

        for _ in 0..CONTROL_REPEATS {
            self.radio.strobe(Strobe::Standby)?;
            self.radio
                .load_and_strobe_tx(&packet, self.session.channel)?;
            thread::sleep(INTER_SEND_DELAY);
        }

        // Same frame once more on the offset channel
        self.radio.strobe(Strobe::Standby)?;
        self.radio.load_and_strobe_tx(
            &packet,
            self.session.channel.wrapping_add(SECONDARY_CHANNEL_OFFSET),
        )?;
        thread::sleep(INTER_SEND_DELAY);

        Ok(())
    }

    /// Send the neutral arming sequence.
    ///
    /// The receiver will not act on non-neutral commands until it has seen
    /// zero throttle for [`ARMING_CYCLES`] frames; this must run
    /// unconditionally between binding and normal control.
    pub fn arm(&mut self) -> Result<()> {
        info!("sending arming sequence ({} neutral frames)", ARMING_CYCLES);
        let neutral = ControlSetpoint::neutral();
        for _ in 0..ARMING_CYCLES {
            self.send_control(&neutral)?;
        }
        info!("arming sequence complete");
        Ok(())
    }
}
