//! Register map for the A10 WEMAC and the clock control module
//!
//! Offsets are relative to the block base; all access goes through a
//! [`RegisterPort`](crate::hal::port::RegisterPort) so the packet engine can
//! run against a simulated register file.

pub mod ccm;
pub mod wemac;

/// WEMAC register block base address (A10 memory map)
pub const WEMAC_BASE: usize = 0x01C0_B000;

/// Size of the WEMAC register window
pub const WEMAC_SIZE: usize = 0x1000;

/// Clock control module base address (A10 memory map)
pub const CCM_BASE: usize = 0x01C2_0000;
