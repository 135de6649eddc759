//! # Hubsan Link Library
//!
//! Fly a Hubsan X4 quadcopter from a Linux host via an A7105 2.4GHz transceiver.
//!
//! This library provides the register-level A7105 driver, the chip's analog
//! calibration sequences, and the Hubsan bind handshake / control-frame
//! protocol built on top of it.

pub mod config;
pub mod error;
pub mod bus;
pub mod a7105;
pub mod protocol;
pub mod link;
