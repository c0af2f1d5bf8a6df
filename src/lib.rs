//! Allwinner A10 WEMAC Driver
//!
//! A `no_std`, `no_alloc` Rust packet engine for the Allwinner A10 "WEMAC"
//! Ethernet controller.
//!
//! The WEMAC has no descriptor DMA. Frames are moved by the CPU through two
//! FIFO data ports: the transmit side has two channels sharing one FIFO
//! port, the receive side hands out framed words (a marker, a length/status
//! header, then the frame in 16-bit units).
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **MAC Layer** ([`driver`]): The MAC context and its packet engine
//!    (TX channel allocation, RX draining, interrupt dispatch, link polling
//!    and the transmit watchdog)
//! 2. **PHY Layer** ([`phy`]): IEEE 802.3 PHY support over MII
//! 3. **HAL Layer** ([`hal`]): Register port, MII bus and clock gating
//!
//! The MAC context has no internal locking. [`sync::SharedWemac`] wraps it in
//! the single lock shared by the interrupt handler, the periodic tick and
//! the control path.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and driver log output
//! - `smoltcp`: Enable smoltcp network stack integration
//!
//! # Example
//!
//! ```ignore
//! use a10_wemac::hal::{AhbClockGate, MmioPort};
//! use a10_wemac::sync::SharedWemac;
//! use a10_wemac::unsafe_registers::{CCM_BASE, WEMAC_BASE, WEMAC_SIZE};
//! use a10_wemac::{Wemac, WemacConfig};
//!
//! static WEMAC: SharedWemac<MmioPort, Delay> = SharedWemac::new();
//!
//! let port = unsafe { MmioPort::new(WEMAC_BASE, WEMAC_SIZE)? };
//! let mut clock = AhbClockGate::new(unsafe { MmioPort::new(CCM_BASE, 0x400)? });
//!
//! let config = WemacConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);
//!
//! WEMAC.install(Wemac::attach(port, delay, &mut clock, config)?)?;
//! WEMAC.init()?;
//!
//! // From the EMAC interrupt:
//! WEMAC.on_interrupt(&mut stack);
//!
//! // Every `constants::TICK_PERIOD_MS`:
//! WEMAC.tick(&mut stack);
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod phy;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Duplex, LinkState, Speed, State, WemacConfig};
pub use driver::error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use driver::interrupt::{InterruptStatus, IrqOutcome};
pub use driver::net::NetworkStack;
pub use driver::rx::{RxFrame, RxOutcome};
pub use driver::tx::{Packet, TxChannel, TxChannels};
pub use driver::watchdog::TickReport;
pub use driver::wemac::{Wemac, WemacStats};

/// Low-level register definitions for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Writing these registers behind the driver's back bypasses its invariants
/// (the channel mask, the RX completion gate and the interrupt mask). Use
/// only if you fully understand the WEMAC and accept responsibility for
/// sequencing and locking.
pub mod unsafe_registers {
    pub use crate::internal::register::{CCM_BASE, WEMAC_BASE, WEMAC_SIZE, ccm, wemac};
}

// Re-export PHY types
pub use phy::{GenericPhy, LinkStatus, PhyCapabilities};

// Re-export sync types
pub use sync::{SharedWemac, TickControl};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    // Frame and buffer sizes
    pub use crate::internal::constants::{
        ETH_HEADER_SIZE, MAX_FRAME_LEN, MTU, RX_BUFFER_SIZE, RX_PAD,
    };

    // RX FIFO framing
    pub use crate::internal::constants::{RX_LEN_MASK, RX_MAGIC, RX_STATUS_SHIFT};

    // Transmit channels
    pub use crate::internal::constants::{TX_CHANNELS, TX_CHANNELS_ALL_BUSY};

    // Timing
    pub use crate::internal::constants::{
        FLUSH_SETTLE_US, FLUSH_TIMEOUT, MII_PULSE_US, PHY_POWER_UP_DELAY_US, RESET_DELAY_US,
        TICK_PERIOD_MS, WATCHDOG_TICKS,
    };

    // Station and PHY addressing
    pub use crate::internal::constants::{
        DEFAULT_MAC_ADDR, DEFAULT_PHY_ADDR, MAC_ADDR_LEN, MAX_PHY_ADDR, MAX_PHY_REG,
    };
}
