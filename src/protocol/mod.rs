//! # Hubsan Protocol Module
//!
//! Wire packet construction and session state for the Hubsan X4 link.

pub mod codec;
pub mod session;

/// Every Hubsan packet is exactly 16 bytes, matching the FIFO end pointer
/// the chip is configured with (15 + 1)
pub const PACKET_LEN: usize = 16;
