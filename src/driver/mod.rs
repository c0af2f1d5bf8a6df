//! Core driver components for the A10 WEMAC.
//!
//! This module contains the MAC context and the packet engine built on it:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`wemac`] - The MAC context, attach/init/stop and configuration
//! - [`tx`] - Transmit channel allocation
//! - [`rx`] - Receive FIFO draining
//! - [`interrupt`] - Interrupt dispatch
//! - [`watchdog`] - Link polling and the transmit watchdog
//! - [`net`] - The network stack collaborator
//!
//! # Example
//!
//! ```ignore
//! use a10_wemac::driver::{Wemac, WemacConfig};
//!
//! let config = WemacConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! let mut wemac = Wemac::attach(port, delay, &mut clock, config)?;
//! wemac.init()?;
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod interrupt;
pub mod net;
pub mod rx;
pub mod tx;
pub mod watchdog;
pub mod wemac;

// Re-exports for convenience
pub use config::{Duplex, LinkState, Speed, State, WemacConfig};
pub use error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use interrupt::{InterruptStatus, IrqOutcome};
pub use net::NetworkStack;
pub use rx::{RxFrame, RxOutcome};
pub use tx::{Packet, TxChannel, TxChannels};
pub use watchdog::TickReport;
pub use wemac::{Wemac, WemacStats};
