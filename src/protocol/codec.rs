//! # Hubsan Packet Codec
//!
//! Builds the two Hubsan wire packet shapes and their checksum.
//!
//! **Checksum**: for payload bytes P, `(256 - sum(P) mod 256) mod 256`;
//! appending it makes the full packet sum to 0 mod 256.

use super::session::{Session, MYSTERY_CONSTANTS, TX_ID};
use super::PACKET_LEN;

/// Command byte opening every control packet
pub const CONTROL_COMMAND: u8 = 0x20;

/// Fixed trailer bytes following the four control channels
pub const CONTROL_TRAILER: [u8; 2] = [0x02, 0x64];

/// Calibrated rudder byte range
pub const RUDDER_RANGE: (u8, u8) = (0x34, 0xCC);

/// Calibrated elevator byte range
pub const ELEVATOR_RANGE: (u8, u8) = (0x3E, 0xBC);

/// Calibrated aileron byte range (applied after sign inversion)
pub const AILERON_RANGE: (u8, u8) = (0x45, 0xC3);

/// Compute the packet checksum over all bytes before the checksum byte.
///
/// # Examples
///
/// ```
/// use hubsan_link::protocol::codec::checksum;
///
/// let payload = [0x01, 0x02, 0x03];
/// let sum: u32 = payload.iter().map(|&b| b as u32).sum::<u32>() + checksum(&payload) as u32;
/// assert_eq!(sum % 256, 0);
/// ```
pub fn checksum(payload: &[u8]) -> u8 {
    let total: u32 = payload.iter().map(|&b| b as u32).sum();
    ((256 - (total % 256)) % 256) as u8
}

/// Check that a full packet (checksum byte included) sums to 0 mod 256.
///
/// The transmitter never needs this; it exists for tests and for inspecting
/// captured receiver responses.
pub fn verify_checksum(packet: &[u8]) -> bool {
    let total: u32 = packet.iter().map(|&b| b as u32).sum();
    total % 256 == 0
}

/// Linear interpolation from `t` in `[0, 1]` to the byte range `[min, max]`.
///
/// Rounds half away from zero and clamps the result to a byte.
pub fn lerp(t: f64, min: u8, max: u8) -> u8 {
    let value = min as f64 + t * (max as f64 - min as f64);
    value.round().clamp(0.0, 255.0) as u8
}

/// Build a bind packet for one handshake stage.
///
/// Layout: stage, channel, 4-byte session id, 5-byte constant block,
/// 4-byte transmitter id, checksum — 16 bytes total.
pub fn build_bind_packet(stage: u8, session: &Session) -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = stage;
    packet[1] = session.channel;
    packet[2..6].copy_from_slice(&session.session_id);
    packet[6..11].copy_from_slice(&MYSTERY_CONSTANTS);
    packet[11..15].copy_from_slice(&TX_ID);
    packet[15] = checksum(&packet[..15]);
    packet
}

/// Logical control values for one frame.
///
/// Throttle ranges over `[0, 1]`; rudder, elevator and aileron over
/// `[-1, 1]`. Values outside the logical range are clamped before scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSetpoint {
    pub throttle: f64,
    pub rudder: f64,
    pub elevator: f64,
    pub aileron: f64,
}

impl ControlSetpoint {
    /// All-neutral frame: zero throttle, centered sticks
    pub fn neutral() -> Self {
        Self {
            throttle: 0.0,
            rudder: 0.0,
            elevator: 0.0,
            aileron: 0.0,
        }
    }
}

impl Default for ControlSetpoint {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Build a 16-byte control packet from logical control values.
///
/// Throttle scales over the full byte range; the stick axes scale into
/// their calibrated sub-ranges, aileron with its sign flipped first.
pub fn build_control_packet(setpoint: &ControlSetpoint) -> [u8; PACKET_LEN] {
    let throttle = lerp(setpoint.throttle.clamp(0.0, 1.0), 0x00, 0xFF);
    let rudder = lerp(to_unit(setpoint.rudder), RUDDER_RANGE.0, RUDDER_RANGE.1);
    let elevator = lerp(to_unit(setpoint.elevator), ELEVATOR_RANGE.0, ELEVATOR_RANGE.1);
    let aileron = lerp(to_unit(-setpoint.aileron), AILERON_RANGE.0, AILERON_RANGE.1);

    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CONTROL_COMMAND;
    // Each channel is a zero pad byte followed by the scaled value
    packet[2] = throttle;
    packet[4] = rudder;
    packet[6] = elevator;
    packet[8] = aileron;
    packet[9..11].copy_from_slice(&CONTROL_TRAILER);
    packet[11..15].copy_from_slice(&TX_ID);
    packet[15] = checksum(&packet[..15]);
    packet
}

/// Map a `[-1, 1]` axis to `[0, 1]`, clamping out-of-range input
fn to_unit(value: f64) -> f64 {
    (value.clamp(-1.0, 1.0) + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::session::RECEIVER_ID;

    fn session() -> Session {
        Session {
            session_id: [0x01, 0x02, 0x03, 0x04],
            channel: 0x1E,
            device_id: RECEIVER_ID,
        }
    }

    // ==================== Checksum Tests ====================

    #[test]
    fn test_checksum_zero_sum_property() {
        let payloads: [&[u8]; 5] = [
            &[0x00],
            &[0xFF],
            &[0x01, 0x02, 0x03],
            &[0xFF; 15],
            &[0x20, 0x00, 0x80, 0x00, 0x34],
        ];
        for payload in payloads {
            let mut packet = payload.to_vec();
            packet.push(checksum(payload));
            let total: u32 = packet.iter().map(|&b| b as u32).sum();
            assert_eq!(total % 256, 0, "payload {:02x?}", payload);
            assert!(verify_checksum(&packet));
        }
    }

    #[test]
    fn test_checksum_of_zero_sum_payload() {
        assert_eq!(checksum(&[0x00, 0x00]), 0x00);
        assert_eq!(checksum(&[0x80, 0x80]), 0x00);
    }

    #[test]
    fn test_verify_rejects_corrupt_packet() {
        let mut packet = build_bind_packet(1, &session()).to_vec();
        packet[3] ^= 0x01;
        assert!(!verify_checksum(&packet));
    }

    // ==================== Lerp Tests ====================

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(0.0, 0x00, 0xFF), 0);
        assert_eq!(lerp(1.0, 0x00, 0xFF), 255);
    }

    #[test]
    fn test_lerp_midpoint() {
        // (0x34 + 0xCC) / 2 == 0x80 exactly
        assert_eq!(lerp(0.5, 0x34, 0xCC), 0x80);
    }

    #[test]
    fn test_lerp_sub_range_endpoints() {
        assert_eq!(lerp(0.0, 0x3E, 0xBC), 0x3E);
        assert_eq!(lerp(1.0, 0x3E, 0xBC), 0xBC);
    }

    // ==================== Bind Packet Tests ====================

    #[test]
    fn test_bind_packet_length_for_any_stage() {
        for stage in [1u8, 3, 9, 0xFF] {
            let packet = build_bind_packet(stage, &session());
            assert_eq!(packet.len(), PACKET_LEN);
            assert_eq!(packet[0], stage);
        }
    }

    #[test]
    fn test_bind_packet_layout() {
        let packet = build_bind_packet(1, &session());

        assert_eq!(&packet[..6], &[0x01, 0x1E, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&packet[6..11], &MYSTERY_CONSTANTS);
        assert_eq!(&packet[11..15], &TX_ID);
        assert!(verify_checksum(&packet));
    }

    #[test]
    fn test_bind_packet_checksum_recomputes() {
        let packet = build_bind_packet(9, &session());
        assert_eq!(packet[15], checksum(&packet[..15]));
    }

    // ==================== Control Packet Tests ====================

    #[test]
    fn test_control_packet_layout() {
        let packet = build_control_packet(&ControlSetpoint::neutral());

        assert_eq!(packet.len(), PACKET_LEN);
        assert_eq!(packet[0], CONTROL_COMMAND);
        // Zero pad bytes before each channel
        assert_eq!(packet[1], 0x00);
        assert_eq!(packet[3], 0x00);
        assert_eq!(packet[5], 0x00);
        assert_eq!(packet[7], 0x00);
        assert_eq!(&packet[9..11], &CONTROL_TRAILER);
        assert_eq!(&packet[11..15], &TX_ID);
        assert_eq!(packet[15], checksum(&packet[..15]));
    }

    #[test]
    fn test_neutral_frame_values() {
        let packet = build_control_packet(&ControlSetpoint::neutral());

        assert_eq!(packet[2], 0x00); // zero throttle
        assert_eq!(packet[4], 0x80); // rudder centered
        assert_eq!(packet[6], 0x7D); // elevator centered: round((0x3E+0xBC)/2)
        assert_eq!(packet[8], 0x84); // aileron centered: round((0x45+0xC3)/2)
    }

    #[test]
    fn test_throttle_scales_full_range() {
        let mut setpoint = ControlSetpoint::neutral();
        setpoint.throttle = 1.0;
        assert_eq!(build_control_packet(&setpoint)[2], 0xFF);

        setpoint.throttle = 0.5;
        assert_eq!(build_control_packet(&setpoint)[2], 0x80);
    }

    #[test]
    fn test_axes_scale_into_sub_ranges() {
        let mut setpoint = ControlSetpoint::neutral();
        setpoint.rudder = -1.0;
        setpoint.elevator = 1.0;
        let packet = build_control_packet(&setpoint);

        assert_eq!(packet[4], RUDDER_RANGE.0);
        assert_eq!(packet[6], ELEVATOR_RANGE.1);
    }

    #[test]
    fn test_aileron_is_inverted() {
        let mut setpoint = ControlSetpoint::neutral();
        setpoint.aileron = 1.0;
        assert_eq!(build_control_packet(&setpoint)[8], AILERON_RANGE.0);

        setpoint.aileron = -1.0;
        assert_eq!(build_control_packet(&setpoint)[8], AILERON_RANGE.1);
    }

    #[test]
    fn test_scaling_is_monotonic() {
        let steps: Vec<f64> = (0..=20).map(|i| -1.0 + i as f64 / 10.0).collect();

        let mut last_rudder = 0u8;
        let mut last_aileron = 0xFFu8;
        for &v in &steps {
            let mut setpoint = ControlSetpoint::neutral();
            setpoint.rudder = v;
            setpoint.aileron = v;
            let packet = build_control_packet(&setpoint);

            assert!(packet[4] >= last_rudder, "rudder decreased at {}", v);
            assert!(packet[8] <= last_aileron, "aileron increased at {}", v);
            last_rudder = packet[4];
            last_aileron = packet[8];
        }
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let setpoint = ControlSetpoint {
            throttle: 2.0,
            rudder: -5.0,
            elevator: 5.0,
            aileron: 0.0,
        };
        let packet = build_control_packet(&setpoint);

        assert_eq!(packet[2], 0xFF);
        assert_eq!(packet[4], RUDDER_RANGE.0);
        assert_eq!(packet[6], ELEVATOR_RANGE.1);
    }
}
