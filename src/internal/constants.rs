//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers and
//! configuration defaults used throughout the WEMAC packet engine.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and the RX buffer layout
//! - **FIFO framing**: The RX marker word and length field layout
//! - **Timing**: Reset pulses, MII command pulse, tick period, watchdog reload
//! - **Defaults**: Station address and PHY address
//!
//! # Note
//!
//! Hardware register offsets and bit definitions live in
//! `internal/register/` as they are specific to those hardware blocks.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Maximum frame length accepted by the MAC (MAC_MAXF register value)
pub const MAX_FRAME_LEN: usize = 0x0600;

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// Leading pad in front of every received frame.
///
/// Two bytes put the IP header that follows the 14-byte Ethernet header on a
/// 32-bit boundary.
pub const RX_PAD: usize = 2;

/// Size of the inline receive buffer.
///
/// Holds the pad, a maximum-length frame and the spare byte written when an
/// odd-length frame is copied as whole 16-bit units.
pub const RX_BUFFER_SIZE: usize = RX_PAD + MAX_FRAME_LEN + 2;

// =============================================================================
// FIFO Framing
// =============================================================================

/// Word that prefixes every frame in the RX FIFO
pub const RX_MAGIC: u32 = 0x0143_414D;

/// Frame length field of the RX header word (bits 15:0)
pub const RX_LEN_MASK: u32 = 0xFFFF;

/// Shift of the hardware status field of the RX header word (bits 31:16)
pub const RX_STATUS_SHIFT: u32 = 16;

// =============================================================================
// Transmit Channels
// =============================================================================

/// Number of hardware transmit channels
pub const TX_CHANNELS: usize = 2;

/// Channel mask value with every channel busy
pub const TX_CHANNELS_ALL_BUSY: u8 = 0b11;

// =============================================================================
// Timing Constants
// =============================================================================

/// Settle time after each edge of the MAC reset pulse, in microseconds
pub const RESET_DELAY_US: u32 = 200;

/// Settle time after powering up the PHY, in microseconds
pub const PHY_POWER_UP_DELAY_US: u32 = 1_000;

/// Default width of the MII command pulse, in microseconds
pub const MII_PULSE_US: u32 = 1_000;

/// Settle time after requesting an RX FIFO flush at attach, in microseconds
pub const FLUSH_SETTLE_US: u32 = 1;

/// Maximum iterations waiting for the RX FIFO flush bit to self-clear
pub const FLUSH_TIMEOUT: u32 = 100_000;

/// Default period of the link/watchdog tick in milliseconds
pub const TICK_PERIOD_MS: u32 = 10;

/// Watchdog reload value, in ticks, armed on every submitted transmission
pub const WATCHDOG_TICKS: u8 = 5;

// =============================================================================
// Defaults
// =============================================================================

/// Default station address
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x08, 0x08, 0x11, 0x18, 0x12, 0x27];

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// Default PHY address on the MII bus
pub const DEFAULT_PHY_ADDR: u8 = 1;

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid PHY register address (5-bit field)
pub const MAX_PHY_REG: u8 = 31;
