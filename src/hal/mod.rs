//! Hardware Abstraction Layer
//!
//! This module provides the seams between the packet engine and the board:
//! register access, MII management and clock gating.
//!
//! # Modules
//!
//! - [`port`]: Ordered register and FIFO access
//! - [`mii`]: MII management bus for PHY communication
//! - [`clock`]: AHB clock gate and PHY power pin
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod clock;
pub mod mii;
pub mod port;

// Re-export commonly used types
pub use clock::{AhbClockGate, ClockGate, ClockState, PowerPinGate};
pub use mii::{MiiBus, RegisterMii};
pub use port::{MmioPort, RegisterPort};
