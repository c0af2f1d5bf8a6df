//! WEMAC Register Definitions
//!
//! The WEMAC is a CPU-fed FIFO MAC: frames are pushed into and pulled out of
//! data port registers 16 bits at a time. There is no descriptor DMA.

// =============================================================================
// Register Offsets
// =============================================================================

/// Global control register (reset, RX/TX enable)
pub const CTL: usize = 0x00;
/// Transmit mode register
pub const TX_MODE: usize = 0x04;
/// Transmit flow control register
pub const TX_FLOW: usize = 0x08;
/// Channel 0 transmit control ("go" bit)
pub const TX_CTL0: usize = 0x0C;
/// Channel 1 transmit control ("go" bit)
pub const TX_CTL1: usize = 0x10;
/// Active transmit channel select
pub const TX_INS: usize = 0x14;
/// Channel 0 packet length
pub const TX_PL0: usize = 0x18;
/// Channel 1 packet length
pub const TX_PL1: usize = 0x1C;
/// Transmit status
pub const TX_STA: usize = 0x20;
/// Transmit FIFO data port
pub const TX_IO_DATA: usize = 0x24;
/// Receive control register
pub const RX_CTL: usize = 0x3C;
/// Receive hash table, low word
pub const RX_HASH0: usize = 0x40;
/// Receive hash table, high word
pub const RX_HASH1: usize = 0x44;
/// Receive status
pub const RX_STA: usize = 0x48;
/// Receive FIFO data port
pub const RX_IO_DATA: usize = 0x4C;
/// Receive FIFO byte/frame count (0 = empty)
pub const RX_FBC: usize = 0x50;
/// Interrupt mask
pub const INT_CTL: usize = 0x54;
/// Interrupt status (read, write the same value to clear)
pub const INT_STA: usize = 0x58;
/// MAC control 0
pub const MAC_CTL0: usize = 0x5C;
/// MAC control 1
pub const MAC_CTL1: usize = 0x60;
/// Back-to-back inter-packet gap
pub const MAC_IPGT: usize = 0x64;
/// Non back-to-back inter-packet gap
pub const MAC_IPGR: usize = 0x68;
/// Collision window and retransmit limit
pub const MAC_CLRT: usize = 0x6C;
/// Maximum frame length
pub const MAC_MAXF: usize = 0x70;
/// PHY support (speed select)
pub const MAC_SUPP: usize = 0x74;
/// MII management configuration (clock divider)
pub const MAC_MCFG: usize = 0x7C;
/// MII management command
pub const MAC_MCMD: usize = 0x80;
/// MII management address (PHY address and register)
pub const MAC_MADR: usize = 0x84;
/// MII management write data
pub const MAC_MWTD: usize = 0x88;
/// MII management read data
pub const MAC_MRDD: usize = 0x8C;
/// MII management indicators
pub const MAC_MIND: usize = 0x90;
/// Station address, low three bytes
pub const MAC_A0: usize = 0x98;
/// Station address, high three bytes
pub const MAC_A1: usize = 0x9C;

// =============================================================================
// CTL Bits
// =============================================================================

/// Reset / global enable
pub const CTL_RST: u32 = 1 << 0;
/// Transmitter enable
pub const CTL_TX_EN: u32 = 1 << 1;
/// Receiver enable
pub const CTL_RX_EN: u32 = 1 << 2;

// =============================================================================
// TX Bits
// =============================================================================

/// Aborted frame enable
pub const TX_MODE_ABORT_EN: u32 = 1 << 0;
/// DMA transfer mode (clear = CPU writes the FIFO)
pub const TX_MODE_DMA: u32 = 1 << 1;
/// Start transmission ("go"), per channel control register
pub const TX_CTL_START: u32 = 1 << 0;

// =============================================================================
// RX_CTL Bits
// =============================================================================

/// Flush the RX FIFO (self-clearing)
pub const RX_CTL_FLUSH: u32 = 1 << 3;
/// Pass all frames (promiscuous)
pub const RX_CTL_PASS_ALL: u32 = 1 << 4;
/// Pass length out-of-range frames
pub const RX_CTL_PASS_LEN_OOR: u32 = 1 << 8;
/// Accept unicast frames
pub const RX_CTL_ACCEPT_UNICAST: u32 = 1 << 16;
/// Destination address filter
pub const RX_CTL_DA_FILTER: u32 = 1 << 17;
/// Accept multicast frames
pub const RX_CTL_ACCEPT_MULTICAST: u32 = 1 << 20;
/// Accept broadcast frames
pub const RX_CTL_ACCEPT_BROADCAST: u32 = 1 << 22;

/// Receive filter programmed by initialization
pub const RX_CTL_SETUP: u32 = RX_CTL_PASS_LEN_OOR
    | RX_CTL_ACCEPT_UNICAST
    | RX_CTL_DA_FILTER
    | RX_CTL_ACCEPT_MULTICAST
    | RX_CTL_ACCEPT_BROADCAST;

// =============================================================================
// INT_CTL / INT_STA Bits
// =============================================================================

/// Channel 0 transmission complete
pub const INT_TX0_DONE: u32 = 1 << 0;
/// Channel 1 transmission complete
pub const INT_TX1_DONE: u32 = 1 << 1;
/// Channel 0 transmission aborted
pub const INT_TX0_ABORT: u32 = 1 << 2;
/// Channel 1 transmission aborted
pub const INT_TX1_ABORT: u32 = 1 << 3;
/// Frame ready in the RX FIFO
pub const INT_RX_READY: u32 = 1 << 8;

/// Sources enabled whenever the interrupt mask is (re-)armed
pub const INT_ENABLE_MASK: u32 =
    INT_TX0_DONE | INT_TX1_DONE | INT_TX0_ABORT | INT_TX1_ABORT | INT_RX_READY;

// =============================================================================
// MAC Bits
// =============================================================================

/// MAC_CTL0: receive flow control enable
pub const MAC_CTL0_RX_FLOW: u32 = 1 << 2;
/// MAC_CTL0: transmit flow control enable
pub const MAC_CTL0_TX_FLOW: u32 = 1 << 3;
/// MAC_CTL0: soft reset
pub const MAC_CTL0_SOFT_RST: u32 = 1 << 15;
/// MAC_CTL0 value programmed at attach
pub const MAC_CTL0_SETUP: u32 = MAC_CTL0_RX_FLOW | MAC_CTL0_TX_FLOW;

/// MAC_CTL1: full duplex
pub const MAC_CTL1_DUPLEX: u32 = 1 << 0;
/// MAC_CTL1: frame length check
pub const MAC_CTL1_LEN_CHECK: u32 = 1 << 1;
/// MAC_CTL1: append CRC
pub const MAC_CTL1_CRC: u32 = 1 << 4;
/// MAC_CTL1: pad short frames
pub const MAC_CTL1_PAD: u32 = 1 << 5;
/// MAC_CTL1 value programmed at attach
pub const MAC_CTL1_SETUP: u32 = MAC_CTL1_LEN_CHECK | MAC_CTL1_CRC | MAC_CTL1_PAD;

/// MAC_IPGT value for full duplex
pub const MAC_IPGT_FULL_DUPLEX: u32 = 0x15;
/// MAC_IPGT value for half duplex
pub const MAC_IPGT_HALF_DUPLEX: u32 = 0x12;
/// MAC_IPGR: non back-to-back gap part 1
pub const MAC_IPGR_IPG1: u32 = 0x0C;
/// MAC_IPGR: non back-to-back gap part 2
pub const MAC_IPGR_IPG2: u32 = 0x12;
/// MAC_CLRT: retransmission maximum
pub const MAC_CLRT_RETRANSMIT: u32 = 0x0F;
/// MAC_CLRT: collision window
pub const MAC_CLRT_COLLISION_WINDOW: u32 = 0x37;

/// MAC_SUPP: 100 Mbps
pub const MAC_SUPP_SPEED_100: u32 = 1 << 8;

/// MAC_MCFG: MII clock divider shift (bits 5:2)
pub const MAC_MCFG_CLK_SHIFT: u32 = 2;
/// MAC_MCFG: MII clock divider mask
pub const MAC_MCFG_CLK_MASK: u32 = 0xF << MAC_MCFG_CLK_SHIFT;
/// MAC_MCFG: divider programmed at attach
pub const MAC_MCFG_CLK_DIV: u32 = 0xD;

/// MAC_MCMD: start the management cycle
pub const MAC_MCMD_READ: u32 = 1 << 0;
/// MAC_MADR: PHY address shift (register address sits in bits 4:0)
pub const MAC_MADR_PHY_SHIFT: u32 = 8;
