//! Error types for the WEMAC driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Attach, configuration and resource failures
//! - [`IoError`]: Runtime TX/RX and PHY failures
//!
//! The unified [`Error`] enum wraps both domains and is returned by most
//! driver methods. Only [`ConfigError`]s raised by attach are fatal for a
//! device instance; the transient [`IoError`]s are recovered inside the
//! packet engine and surface through outcomes and statistics.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and attach errors
///
/// These errors occur while bringing the device up or reconfiguring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Driver already initialized
    AlreadyInitialized,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Invalid PHY address (must be 0-31)
    InvalidPhyAddress,
    /// A register window, PHY or memory resource is missing
    ResourceUnavailable,
    /// Clock gate could not be opened
    ClockError,
    /// Power pin could not be driven
    GpioError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidPhyAddress => "invalid PHY address",
            ConfigError::ResourceUnavailable => "resource unavailable",
            ConfigError::ClockError => "clock gate error",
            ConfigError::GpioError => "power pin error",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime TX/RX errors
///
/// These errors occur during frame transmission, reception or link polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// No receive buffer large enough for the inbound frame
    ResourceExhausted,
    /// RX FIFO marker mismatch; the FIFO was flushed
    FramingError,
    /// No transmit progress within the watchdog window
    TransmitStalled,
    /// The RX FIFO flush bit did not self-clear in time
    FlushTimeout,
    /// Invalid state for operation (e.g., not running)
    InvalidState,
    /// Both transmit channels are busy
    ChannelsBusy,
    /// Outbound frame exceeds the maximum frame length
    FrameTooLarge,
    /// PHY communication error
    PhyError,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::ResourceExhausted => "no receive buffer available",
            IoError::FramingError => "RX FIFO framing error",
            IoError::TransmitStalled => "transmit stalled",
            IoError::FlushTimeout => "RX FIFO flush timed out",
            IoError::InvalidState => "invalid state for operation",
            IoError::ChannelsBusy => "all transmit channels busy",
            IoError::FrameTooLarge => "frame too large",
            IoError::PhyError => "PHY communication error",
        }
    }

    /// Whether the engine recovers from this error without outside help
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            IoError::ResourceExhausted
                | IoError::FramingError
                | IoError::TransmitStalled
                | IoError::FlushTimeout
                | IoError::ChannelsBusy
        )
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::ResourceUnavailable)) => { /* ... */ }
///     Err(Error::Io(IoError::ChannelsBusy)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for WEMAC operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
