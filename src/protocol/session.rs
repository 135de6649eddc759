//! # Link Session State
//!
//! Per-run session identity plus the fixed protocol constants the Hubsan
//! receiver expects. A session is created once at startup and is immutable
//! except for the device ID the receiver assigns during binding.

use rand::seq::SliceRandom;
use rand::Rng;

/// Device ID the receiver answers to before binding.
///
/// Byte order not confirmed; kept as an opaque block. The receiver does not
/// respond without it.
pub const RECEIVER_ID: [u8; 4] = [0x55, 0x20, 0x10, 0x41];

/// Channels the protocol is allowed to operate on
pub const ALLOWED_CHANNELS: [u8; 12] = [
    0x14, 0x1E, 0x28, 0x32, 0x3C, 0x46, 0x50, 0x5A, 0x64, 0x6E, 0x78, 0x82,
];

/// Constant block carried in every bind packet.
///
/// Semantics unknown; the receiver has been observed to respond without it,
/// but it is kept byte-for-byte for protocol fidelity.
pub const MYSTERY_CONSTANTS: [u8; 5] = [0x08, 0xE4, 0xEA, 0x9E, 0x50];

/// Fixed transmitter identity carried in bind and control packets
pub const TX_ID: [u8; 4] = [0xDB, 0x04, 0x26, 0x79];

/// One pairing session between this transmitter and a receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Randomly generated 4-byte session identifier
    pub session_id: [u8; 4],
    /// Channel selected for this session, one of [`ALLOWED_CHANNELS`]
    pub channel: u8,
    /// Device ID currently programmed into the chip; starts as
    /// [`RECEIVER_ID`] and is replaced by the peer-assigned ID during bind
    pub device_id: [u8; 4],
}

impl Session {
    /// Generate a fresh session from the given random source.
    ///
    /// The RNG is injected so tests can supply a seeded generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubsan_link::protocol::session::{Session, ALLOWED_CHANNELS};
    ///
    /// let session = Session::generate(&mut rand::thread_rng());
    /// assert!(ALLOWED_CHANNELS.contains(&session.channel));
    /// ```
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut session_id = [0u8; 4];
        rng.fill(&mut session_id);

        // ALLOWED_CHANNELS is non-empty, so choose cannot fail
        let channel = *ALLOWED_CHANNELS
            .choose(rng)
            .unwrap_or(&ALLOWED_CHANNELS[0]);

        Self {
            session_id,
            channel,
            device_id: RECEIVER_ID,
        }
    }

    /// Record the device ID the receiver assigned during binding
    pub fn set_device_id(&mut self, id: [u8; 4]) {
        self.device_id = id;
    }
}
