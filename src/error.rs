//! # Error Types
//!
//! Custom error types for Hubsan Link using `thiserror`.

use thiserror::Error;

/// Which analog calibration sequence an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationKind {
    /// Intermediate-frequency filter bank calibration
    IfFilter,
    /// Voltage-controlled oscillator calibration
    Vco,
}

impl std::fmt::Display for CalibrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationKind::IfFilter => write!(f, "IF filter"),
            CalibrationKind::Vco => write!(f, "VCO"),
        }
    }
}

/// Main error type for Hubsan Link
#[derive(Debug, Error)]
pub enum HubsanError {
    /// SPI bus transaction errors (fatal, never retried)
    #[error("SPI bus error: {0}")]
    Bus(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Calibration poll budget exhausted before the busy flag cleared
    #[error("{0} calibration did not complete within the poll budget")]
    CalibrationTimeout(CalibrationKind),

    /// Chip reported a calibration failure flag
    #[error("{0} calibration reported failure")]
    CalibrationFailed(CalibrationKind),

    /// Chip did not finish transmitting within the poll budget
    #[error("transmit did not complete within the poll budget")]
    TransmitTimeout,

    /// No response received during one bind handshake stage.
    ///
    /// The only recoverable error: `Link::bind` retries the enclosing
    /// handshake phase indefinitely when a stage times out.
    #[error("no response within the receive poll budget for a bind stage")]
    BindStageTimeout,
}

/// Result type alias for Hubsan Link
pub type Result<T> = std::result::Result<T, HubsanError>;
