//! # SPI Bus Module
//!
//! Transaction-scoped access to the synchronous SPI link the A7105 hangs off.
//!
//! The chip requires chip-select to stay asserted for the whole of each
//! register transaction (address byte plus data bytes), so the transport is
//! modelled as an exclusive begin/end pair around plain write/read calls.
//! [`BusGuard`] wraps the pair in a scope that releases the bus on every exit
//! path, including early `?` returns.

mod spi;

pub use spi::SpidevBus;

use std::io;
use tracing::debug;

/// Trait for exclusive SPI bus transactions.
///
/// One transaction corresponds to one chip-select assertion. Writes and reads
/// are only meaningful between `begin_exclusive` and `end_exclusive`.
pub trait BusTransport {
    /// Assert chip select, opening an exclusive transaction
    fn begin_exclusive(&mut self) -> io::Result<()>;

    /// Release chip select, closing the transaction
    fn end_exclusive(&mut self) -> io::Result<()>;

    /// Clock out bytes within the current transaction
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Clock in `len` bytes within the current transaction
    fn read(&mut self, len: usize) -> io::Result<Vec<u8>>;
}

/// Scoped exclusive bus acquisition.
///
/// Opens a transaction on construction and closes it on drop, so a register
/// operation can bail out with `?` at any point without leaving chip select
/// asserted.
///
/// # Examples
///
/// ```no_run
/// use hubsan_link::bus::{BusGuard, BusTransport};
///
/// fn strobe_standby<B: BusTransport>(bus: &mut B) -> std::io::Result<()> {
///     let mut txn = BusGuard::begin(bus)?;
///     txn.write(&[0xA0])?;
///     Ok(())
/// }
/// ```
pub struct BusGuard<'a, B: BusTransport + ?Sized> {
    bus: &'a mut B,
}

impl<'a, B: BusTransport + ?Sized> BusGuard<'a, B> {
    /// Open an exclusive transaction on `bus`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if chip select cannot be asserted.
    pub fn begin(bus: &'a mut B) -> io::Result<Self> {
        bus.begin_exclusive()?;
        Ok(Self { bus })
    }

    /// Write bytes within this transaction
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.bus.write(data)
    }

    /// Read `len` bytes within this transaction
    pub fn read(&mut self, len: usize) -> io::Result<Vec<u8>> {
        self.bus.read(len)
    }
}

impl<B: BusTransport + ?Sized> Drop for BusGuard<'_, B> {
    fn drop(&mut self) {
        // Release failure on the drop path cannot be propagated; the next
        // begin_exclusive will surface a stuck bus anyway.
        if let Err(e) = self.bus.end_exclusive() {
            debug!("failed to release bus transaction: {}", e);
        }
    }
}
