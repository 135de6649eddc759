//! # Hubsan Link
//!
//! Fly a Hubsan X4 quadcopter from a Linux host via an A7105 2.4GHz transceiver.
//!
//! Binds to the first receiver that answers, runs the mandatory arming
//! sequence, then holds the quadcopter at neutral controls until the
//! process is killed (the protocol has no teardown; stopping the frame
//! stream is the disconnect).

use anyhow::Result;
use std::path::Path;
use tracing::info;
use tracing_subscriber;

mod config;
mod error;
mod bus;
mod a7105;
mod protocol;
mod link;

use a7105::A7105;
use bus::SpidevBus;
use config::Config;
use link::Link;
use protocol::codec::ControlSetpoint;
use protocol::session::Session;

/// Configuration file consulted when present
const CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for Hubsan Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (or fall back to defaults)
///    - Open the SPI bus and bring up the A7105: baseline registers,
///      IF and VCO calibration
///
/// 2. **Bind**
///    - Generate a random session and run the bind handshake until the
///      receiver acknowledges
///
/// 3. **Control**
///    - Send the 100-frame neutral arming sequence
///    - Hold neutral control frames indefinitely
///
/// # Errors
///
/// Returns error if the SPI bus cannot be opened, calibration fails, or a
/// fatal protocol error occurs during binding.
fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Hubsan Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = if Path::new(CONFIG_PATH).exists() {
        Config::load(CONFIG_PATH)?
    } else {
        Config::default()
    };

    let bus = SpidevBus::open(&config.spi)?;
    let radio = A7105::new(bus)?;

    let session = Session::generate(&mut rand::thread_rng());
    info!(
        "session id {:02x?} on channel {:#04x}",
        session.session_id, session.channel
    );

    let mut link = Link::new(radio, session);
    link.initialize()?;
    link.bind()?;
    link.arm()?;

    info!("bound and armed, holding neutral controls");

    // Real flight control would feed setpoints here; until then the
    // receiver is kept alive with neutral frames.
    let neutral = ControlSetpoint::neutral();
    loop {
        link.send_control(&neutral)?;
    }
}
