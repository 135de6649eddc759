//! # A7105 Driver Module
//!
//! Typed register access and transmit/receive primitives for the AMICCOM
//! A7105 transceiver.
//!
//! Every operation opens one scoped bus transaction, performs its register
//! traffic, and releases the bus on all exit paths. Timeouts are counted in
//! poll iterations with fixed sleeps rather than wall-clock deadlines; the
//! receiver's own timing expectations are tied to these budgets.

pub mod calibration;
pub mod registers;

pub use registers::{Register, Strobe, ENABLE_4WIRE, READ_FLAG};

use crate::bus::{BusGuard, BusTransport};
use crate::error::{HubsanError, Result};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Mode register bit that reads 1 while the chip is busy transmitting or
/// has no received packet ready
pub const TRX_BUSY: u8 = 0x01;

/// Poll attempts while waiting for a transmit to complete
pub const TRANSMIT_POLLS: usize = 4;

/// Poll attempts while waiting for a received packet
pub const RECEIVE_POLLS: usize = 100;

/// Spacing between poll attempts
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A7105 transceiver driver over a [`BusTransport`].
///
/// Construction enables 4-wire SPI signalling, which must happen before any
/// other register access.
pub struct A7105<B: BusTransport> {
    bus: B,
}

impl<B: BusTransport> A7105<B> {
    /// Take ownership of the bus and enable 4-wire SPI.
    ///
    /// # Errors
    ///
    /// Returns `HubsanError::Bus` if the enabling write fails.
    pub fn new(bus: B) -> Result<Self> {
        let mut radio = Self { bus };
        radio.write_register(Register::Gio1Select, ENABLE_4WIRE)?;
        Ok(radio)
    }

    /// Write one register.
    pub fn write_register(&mut self, reg: Register, value: u8) -> Result<()> {
        debug!("write_register({:?}, {:#04x})", reg, value);
        let mut txn = BusGuard::begin(&mut self.bus)?;
        txn.write(&[reg.write_addr(), value])?;
        Ok(())
    }

    /// Read one register.
    pub fn read_register(&mut self, reg: Register) -> Result<u8> {
        let value = {
            let mut txn = BusGuard::begin(&mut self.bus)?;
            txn.write(&[reg.read_addr()])?;
            txn.read(1)?[0]
        };
        debug!("read_register({:?}) == {:#04x}", reg, value);
        Ok(value)
    }

    /// Issue a state strobe command.
    pub fn strobe(&mut self, state: Strobe) -> Result<()> {
        debug!("strobe({:?})", state);
        let mut txn = BusGuard::begin(&mut self.bus)?;
        txn.write(&[state as u8])?;
        Ok(())
    }

    /// Burst-write the 4-byte device ID code.
    pub fn write_id(&mut self, id: [u8; 4]) -> Result<()> {
        debug!("write_id({:02x?})", id);
        let mut txn = BusGuard::begin(&mut self.bus)?;
        txn.write(&[Register::Id.write_addr()])?;
        txn.write(&id)?;
        Ok(())
    }

    /// Burst-write a packet into the TX FIFO.
    pub fn write_fifo(&mut self, data: &[u8]) -> Result<()> {
        let mut txn = BusGuard::begin(&mut self.bus)?;
        txn.write(&[Register::FifoData.write_addr()])?;
        txn.write(data)?;
        Ok(())
    }

    /// Burst-read `len` bytes from the RX FIFO.
    pub fn read_fifo(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut txn = BusGuard::begin(&mut self.bus)?;
        txn.write(&[Register::FifoData.read_addr()])?;
        Ok(txn.read(len)?)
    }

    /// Load a packet and transmit it on `channel`, waiting for completion.
    ///
    /// Sequence: standby, reset write pointer, FIFO load, channel select,
    /// TX strobe; then poll the mode register until the busy bit clears.
    ///
    /// # Errors
    ///
    /// * `HubsanError::TransmitTimeout` if the busy bit does not clear
    ///   within [`TRANSMIT_POLLS`] attempts (fatal for this send).
    /// * `HubsanError::Bus` on transport failure.
    pub fn transmit(&mut self, packet: &[u8], channel: u8) -> Result<()> {
        self.strobe(Strobe::Standby)?;
        self.load_and_strobe_tx(packet, channel)?;

        // The last attempt slot is the failure check: a 4-iteration budget
        // yields 3 real reads
        for _ in 0..(TRANSMIT_POLLS - 1) {
            if self.read_register(Register::Mode)? & TRX_BUSY == 0 {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        Err(HubsanError::TransmitTimeout)
    }

    /// Load a packet and strobe TX without waiting for completion.
    ///
    /// The control path fires frames back to back and never checks the busy
    /// bit; only the bind handshake needs [`transmit`](Self::transmit).
    pub fn load_and_strobe_tx(&mut self, packet: &[u8], channel: u8) -> Result<()> {
        self.strobe(Strobe::ResetWritePointer)?;
        self.write_fifo(packet)?;
        self.write_register(Register::PllChannel, channel)?;
        self.strobe(Strobe::Tx)?;
        Ok(())
    }

    /// Test-only view of the underlying bus.
    #[cfg(test)]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Test-only mutable view of the underlying bus.
    #[cfg(test)]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Wait for a received packet and read it out of the FIFO.
    ///
    /// The caller must already have strobed the chip into RX. Polls the mode
    /// register up to [`RECEIVE_POLLS`] times at [`POLL_INTERVAL`]; on data
    /// ready, resets the read pointer and reads `len` bytes.
    ///
    /// # Errors
    ///
    /// * `HubsanError::BindStageTimeout` if no packet arrives within the
    ///   poll budget (recoverable; the bind phase retries).
    pub fn receive_wait(&mut self, len: usize) -> Result<Vec<u8>> {
        for _ in 0..RECEIVE_POLLS {
            if self.read_register(Register::Mode)? & TRX_BUSY == 0 {
                self.strobe(Strobe::ResetReadPointer)?;
                return self.read_fifo(len);
            }
            thread::sleep(POLL_INTERVAL);
        }
        Err(HubsanError::BindStageTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mocks::ScriptedBus;

    fn radio() -> A7105<ScriptedBus> {
        A7105::new(ScriptedBus::new()).unwrap()
    }

    /// Writes after the 4-wire enable that construction performs
    fn writes_after_init(radio: &A7105<ScriptedBus>) -> Vec<Vec<u8>> {
        radio.bus.written[1..].to_vec()
    }

    // ==================== Register Access Tests ====================

    #[test]
    fn test_new_enables_4wire_first() {
        let radio = radio();
        assert_eq!(radio.bus.written[0], vec![0x0B, 0x19]);
        assert_eq!(radio.bus.transactions_closed, 1);
    }

    #[test]
    fn test_write_register_wire_bytes() {
        let mut radio = radio();
        radio.write_register(Register::ModeControl, 0x63).unwrap();
        assert_eq!(writes_after_init(&radio), vec![vec![0x01, 0x63]]);
        assert_eq!(radio.bus.transactions_closed, 2);
    }

    #[test]
    fn test_read_register_sets_read_flag() {
        let mut radio = radio();
        radio.bus.queue_read(&[0x5A]);

        let value = radio.read_register(Register::Mode).unwrap();
        assert_eq!(value, 0x5A);
        assert_eq!(writes_after_init(&radio), vec![vec![0x40]]);
    }

    #[test]
    fn test_strobe_single_byte() {
        let mut radio = radio();
        radio.strobe(Strobe::Standby).unwrap();
        assert_eq!(writes_after_init(&radio), vec![vec![0xA0]]);
    }

    #[test]
    fn test_write_id_burst() {
        let mut radio = radio();
        radio.write_id([0x55, 0x20, 0x10, 0x41]).unwrap();
        assert_eq!(
            writes_after_init(&radio),
            vec![vec![0x06], vec![0x55, 0x20, 0x10, 0x41]]
        );
        // Single transaction for the whole burst
        assert_eq!(radio.bus.transactions_closed, 2);
    }

    #[test]
    fn test_fifo_round_trip_addressing() {
        let mut radio = radio();
        radio.write_fifo(&[0xAA, 0xBB]).unwrap();
        radio.bus.queue_read(&[0x01, 0x02, 0x03]);
        let data = radio.read_fifo(3).unwrap();

        assert_eq!(data, vec![0x01, 0x02, 0x03]);
        let writes = writes_after_init(&radio);
        assert_eq!(writes[0], vec![0x05]); // FIFO write address
        assert_eq!(writes[1], vec![0xAA, 0xBB]);
        assert_eq!(writes[2], vec![0x45]); // FIFO read address (flag set)
    }

    #[test]
    fn test_bus_error_propagates() {
        let mut radio = radio();
        radio.bus.write_error = Some(std::io::ErrorKind::BrokenPipe);

        let result = radio.write_register(Register::Clock, 0x05);
        assert!(matches!(result, Err(HubsanError::Bus(_))));
        // Transaction still released
        assert_eq!(radio.bus.transactions_closed, 2);
    }

    // ==================== Transmit Tests ====================

    #[test]
    fn test_transmit_sequence_and_completion() {
        let mut radio = radio();
        // Busy once, then complete
        radio.bus.queue_read(&[0x01]);
        radio.bus.queue_read(&[0x00]);

        let packet = [0x20u8; 16];
        radio.transmit(&packet, 0x1E).unwrap();

        let writes = writes_after_init(&radio);
        assert_eq!(writes[0], vec![0xA0]); // standby
        assert_eq!(writes[1], vec![0xE0]); // reset write pointer
        assert_eq!(writes[2], vec![0x05]); // FIFO address
        assert_eq!(writes[3], packet.to_vec());
        assert_eq!(writes[4], vec![0x0F, 0x1E]); // channel select
        assert_eq!(writes[5], vec![0xD0]); // TX strobe
        assert_eq!(writes[6], vec![0x40]); // mode poll
        assert_eq!(writes[7], vec![0x40]); // mode poll
    }

    #[test]
    fn test_transmit_timeout_after_budget() {
        let mut radio = radio();
        // Never clears: 3 reads within a 4-iteration budget
        radio.bus.queue_reads(0x01, TRANSMIT_POLLS - 1);

        let result = radio.transmit(&[0u8; 16], 0x14);
        assert!(matches!(result, Err(HubsanError::TransmitTimeout)));
        assert!(radio.bus.read_queue.is_empty());
    }

    // ==================== Receive Tests ====================

    #[test]
    fn test_receive_wait_reads_fifo_on_ready() {
        let mut radio = radio();
        radio.bus.queue_read(&[0x01]); // still busy
        radio.bus.queue_read(&[0x00]); // data ready
        radio.bus.queue_read(&[0xCC; 16]);

        let packet = radio.receive_wait(16).unwrap();
        assert_eq!(packet, vec![0xCC; 16]);

        let writes = writes_after_init(&radio);
        // Poll, poll, reset read pointer, FIFO read address
        assert_eq!(writes[0], vec![0x40]);
        assert_eq!(writes[1], vec![0x40]);
        assert_eq!(writes[2], vec![0xF0]);
        assert_eq!(writes[3], vec![0x45]);
    }

    #[test]
    fn test_receive_wait_times_out() {
        let mut radio = radio();
        radio.bus.queue_reads(0x01, RECEIVE_POLLS);

        let result = radio.receive_wait(16);
        assert!(matches!(result, Err(HubsanError::BindStageTimeout)));
        assert!(radio.bus.read_queue.is_empty());
    }
}
