//! # Bind Handshake
//!
//! The multi-stage exchange that pairs this transmitter with a receiver.
//!
//! The radio layer has no acknowledgements, so individual stages time out
//! routinely on a lossy channel. A stage timeout restarts its enclosing
//! phase from the first packet; the retry is unbounded and there is no
//! overall deadline. All other errors abort the handshake.

use super::Link;
use crate::a7105::Strobe;
use crate::bus::BusTransport;
use crate::error::{HubsanError, Result};
use crate::protocol::codec::build_bind_packet;
use crate::protocol::PACKET_LEN;
use tracing::{debug, info, warn};

/// Handshake stage numbers the receiver understands
const STAGE_ANNOUNCE: u8 = 1;
const STAGE_ASSIGN: u8 = 3;
const STAGE_PHASE2: u8 = 9;

/// Second byte of a phase-2 response that acknowledges the handshake
const PHASE2_ACK: u8 = 0x09;

impl<B: BusTransport> Link<B> {
    /// Run the full bind handshake to completion.
    ///
    /// Phase 1 (announce, assign, confirm) learns the peer-assigned device
    /// ID and reprograms the chip with it; phase 2 repeats stage-9 packets
    /// until the receiver acknowledges. Each phase retries indefinitely on
    /// stage timeouts. On completion the chip's encoding register is
    /// switched to CRC with 4-byte ID and preamble codes.
    ///
    /// # Errors
    ///
    /// `HubsanError::Bus` and `HubsanError::TransmitTimeout` abort the
    /// handshake; only stage timeouts are retried.
    pub fn bind(&mut self) -> Result<()> {
        info!("binding started on channel {:#04x}", self.session.channel);

        loop {
            match self.bind_phase1() {
                Ok(()) => break,
                Err(HubsanError::BindStageTimeout) => {
                    warn!("bind phase 1 stage timed out, restarting phase");
                }
                Err(e) => return Err(e),
            }
        }

        loop {
            match self.bind_phase2() {
                Ok(true) => break,
                Ok(false) => debug!("phase 2 response without acknowledgement"),
                Err(HubsanError::BindStageTimeout) => {
                    warn!("bind phase 2 stage timed out, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        // Enable CRC, id code length 4, preamble length 4
        self.radio
            .write_register(crate::a7105::Register::Code1, 0x0F)?;

        info!("bind complete, device id {:02x?}", self.session.device_id);
        Ok(())
    }

    /// Announce, receive the assigned device ID, reprogram it, confirm.
    fn bind_phase1(&mut self) -> Result<()> {
        self.bind_stage(STAGE_ANNOUNCE)?;

        let response = self.bind_stage(STAGE_ASSIGN)?;
        let mut device_id = [0u8; 4];
        device_id.copy_from_slice(&response[2..6]);

        self.radio.write_id(device_id)?;
        self.session.set_device_id(device_id);
        debug!("receiver assigned device id {:02x?}", device_id);

        self.bind_stage(STAGE_ANNOUNCE)?;
        Ok(())
    }

    /// One phase-2 round trip; true when the receiver acknowledged.
    fn bind_phase2(&mut self) -> Result<bool> {
        let response = self.bind_stage(STAGE_PHASE2)?;
        Ok(response[1] == PHASE2_ACK)
    }

    /// Send one bind packet and wait for the matching response.
    ///
    /// The transmit must complete (or time out fatally) before the chip is
    /// switched into RX for the response.
    fn bind_stage(&mut self, stage: u8) -> Result<Vec<u8>> {
        debug!("bind stage {}", stage);

        let packet = build_bind_packet(stage, &self.session);
        self.radio.transmit(&packet, self.session.channel)?;

        self.radio.strobe(Strobe::Rx)?;
        let response = self.radio.receive_wait(PACKET_LEN)?;
        debug!("bind stage {} response: {:02x?}", stage, response);
        Ok(response)
    }
}
