//! # A7105 Register Map and Strobe Commands
//!
//! Register addresses and state-machine strobes for the AMICCOM A7105.
//! Reads set the high read flag bit on the address byte.

/// Flag bit specifying a register should be read
pub const READ_FLAG: u8 = 0x40;

/// Value written to GIO1S to enable 4-wire SPI
pub const ENABLE_4WIRE: u8 = 0x19;

/// A7105 register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Reset and mode flags; bit0 doubles as the TRX busy flag
    Mode = 0x00,
    /// Transmitter options
    ModeControl = 0x01,
    /// Calibration mode select and busy flags
    Calibration = 0x02,
    /// FIFO end pointer (fixes the packet length)
    FifoEnd = 0x03,
    /// FIFO data port (burst access)
    FifoData = 0x05,
    /// Device ID code (4-byte burst access)
    Id = 0x06,
    /// GIO1 pin select; enables 4-wire SPI
    Gio1Select = 0x0B,
    /// Clock settings
    Clock = 0x0D,
    /// Data rate division
    DataRate = 0x0E,
    /// PLL channel number
    PllChannel = 0x0F,
    /// TX frequency deviation
    TxDeviation = 0x15,
    /// Receiver settings
    Rx = 0x18,
    /// Receiver gain settings
    RxGain1 = 0x19,
    /// Reserved receiver gain constants
    RxGain4 = 0x1C,
    /// Encoding settings: CRC, id code length, preamble length
    Code1 = 0x1F,
    /// More encoding settings
    Code2 = 0x20,
    /// IF calibration result, including the failure flag
    IfCalibration = 0x22,
    /// VCO calibration result, including the failure flag
    VcoCalibration = 0x25,
    /// RX demodulator settings
    RxDemodTest = 0x29,
}

impl Register {
    /// Address byte for a write access
    pub fn write_addr(self) -> u8 {
        self as u8
    }

    /// Address byte for a read access (read flag set)
    pub fn read_addr(self) -> u8 {
        self as u8 | READ_FLAG
    }
}

/// A7105 strobe commands.
///
/// A single-byte command triggering an immediate state transition; the chip
/// holds exactly one state at a time and transitions are fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Strobe {
    Sleep = 0x80,
    Idle = 0x90,
    Standby = 0xA0,
    Pll = 0xB0,
    Rx = 0xC0,
    Tx = 0xD0,
    ResetWritePointer = 0xE0,
    ResetReadPointer = 0xF0,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_addr_sets_flag() {
        assert_eq!(Register::Mode.read_addr(), 0x40);
        assert_eq!(Register::Calibration.read_addr(), 0x42);
        assert_eq!(Register::VcoCalibration.read_addr(), 0x65);
    }

    #[test]
    fn test_write_addr_is_raw() {
        assert_eq!(Register::Mode.write_addr(), 0x00);
        assert_eq!(Register::Gio1Select.write_addr(), 0x0B);
        assert_eq!(Register::RxDemodTest.write_addr(), 0x29);
    }

    #[test]
    fn test_strobe_values() {
        assert_eq!(Strobe::Sleep as u8, 0x80);
        assert_eq!(Strobe::Standby as u8, 0xA0);
        assert_eq!(Strobe::Rx as u8, 0xC0);
        assert_eq!(Strobe::Tx as u8, 0xD0);
        assert_eq!(Strobe::ResetReadPointer as u8, 0xF0);
    }
}
