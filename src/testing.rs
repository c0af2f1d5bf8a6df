//! Testing utilities and mock implementations
//!
//! This module provides a register-level model of the WEMAC and mock
//! collaborators for testing the driver on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use crate::driver::config::{LinkState, WemacConfig};
use crate::driver::error::{ConfigError, ConfigResult, Error, IoError, Result};
use crate::driver::net::NetworkStack;
use crate::driver::rx::RxFrame;
use crate::driver::tx::{Packet, TxChannels};
use crate::driver::wemac::Wemac;
use crate::hal::clock::ClockGate;
use crate::hal::mii::MiiBus;
use crate::hal::port::RegisterPort;
use crate::internal::constants::{DEFAULT_PHY_ADDR, RX_MAGIC, RX_STATUS_SHIFT};
use crate::internal::phy_regs::standard::{bmsr, phy_reg};
use crate::internal::register::wemac::{
    INT_STA, MAC_MADR, MAC_MADR_PHY_SHIFT, MAC_MRDD, MAC_MWTD, RX_CTL, RX_CTL_FLUSH, RX_FBC,
    RX_IO_DATA, TX_CTL_START, TX_CTL0, TX_CTL1, TX_INS, TX_IO_DATA, TX_PL0, TX_PL1,
};

/// Port accesses a flush stays pending for before the hardware clears it
const FLUSH_CYCLES: u32 = 2;

// =============================================================================
// Simulated Register Window
// =============================================================================

/// One access made through the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(usize, u32),
    Write(usize, u32),
}

/// A frame the simulated hardware was told to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    /// Channel index (0 or 1)
    pub channel: usize,
    /// 16-bit units written to the TX FIFO
    pub units: Vec<u16>,
    /// Length programmed into the channel's length register
    pub length: usize,
}

impl SentFrame {
    /// Frame bytes as they would go out on the wire
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self.units.iter().flat_map(|u| u.to_le_bytes()).collect();
        bytes.truncate(self.length);
        bytes
    }
}

/// Register-level model of the WEMAC
///
/// Plain registers read back what was last written. On top of that it
/// models the pieces of the hardware the packet engine depends on:
///
/// - RX FIFO: a queue of 32-bit words; `RX_FBC` reads non-zero while it
///   holds data and every read of `RX_IO_DATA` pops one entry
/// - RX flush: writing `RX_CTL_FLUSH` empties the FIFO; the bit clears
///   itself a couple of port accesses later (or never, in sticky mode)
/// - Interrupt latch: [`raise`](Self::raise) sets `INT_STA` bits, writing
///   them back clears them
/// - TX FIFO: units written after `TX_INS` are captured and recorded as a
///   [`SentFrame`] when the channel's start bit is written
/// - MII: the management registers talk to a simulated PHY register file;
///   addresses without a PHY read all ones
///
/// Every access made through [`RegisterPort`] is recorded in an access log.
///
/// # Example
///
/// ```ignore
/// let mut regs = SimRegisters::with_phy(1);
/// regs.push_rx_frame(&[0xAA; 60]);
/// regs.raise(INT_RX_READY);
/// ```
#[derive(Debug, Default)]
pub struct SimRegisters {
    regs: HashMap<usize, u32>,
    phy: HashMap<(u8, u8), u16>,
    rx_fifo: VecDeque<u32>,
    tx_capture: [Vec<u16>; 2],
    tx_selected: usize,
    sent: Vec<SentFrame>,
    flush_pending: Option<u32>,
    flush_sticky: bool,
    hide_fbc: bool,
    log: Vec<Access>,
}

impl SimRegisters {
    /// Create a register window with no PHY attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a register window with a PHY at `addr`
    ///
    /// The PHY identifies itself, advertises 10/100 in both duplex modes and
    /// has autonegotiation enabled with the link down.
    pub fn with_phy(addr: u8) -> Self {
        let mut sim = Self::new();
        sim.set_phy_reg(addr, phy_reg::PHYIDR1, 0x0181);
        sim.set_phy_reg(addr, phy_reg::PHYIDR2, 0xB8A0);
        sim.set_phy_reg(addr, phy_reg::BMCR, 0x3100);
        sim.set_phy_reg(addr, phy_reg::BMSR, bmsr::AN_ABILITY);
        sim.set_phy_reg(addr, phy_reg::ANAR, 0x01E1);
        sim
    }

    /// Set a register without going through the port
    pub fn set_reg(&mut self, offset: usize, value: u32) {
        self.regs.insert(offset, value);
    }

    /// Current value of a register (not logged)
    pub fn reg(&self, offset: usize) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    /// Latch interrupt status bits
    pub fn raise(&mut self, bits: u32) {
        *self.regs.entry(INT_STA).or_default() |= bits;
    }

    // -------------------------------------------------------------------------
    // Access log
    // -------------------------------------------------------------------------

    pub fn log(&self) -> &[Access] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Values written to a register, oldest first
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::Write(off, value) if off == offset => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of reads from a register
    pub fn reads_from(&self, offset: usize) -> usize {
        self.log
            .iter()
            .filter(|access| matches!(access, Access::Read(off, _) if *off == offset))
            .count()
    }

    // -------------------------------------------------------------------------
    // RX FIFO
    // -------------------------------------------------------------------------

    /// Queue a well-formed frame with a zero status field
    pub fn push_rx_frame(&mut self, payload: &[u8]) {
        self.push_rx_frame_with_status(payload, 0);
    }

    /// Queue a well-formed frame
    pub fn push_rx_frame_with_status(&mut self, payload: &[u8], status: u16) {
        self.rx_fifo.push_back(RX_MAGIC);
        self.rx_fifo
            .push_back(payload.len() as u32 | (status as u32) << RX_STATUS_SHIFT);
        for unit in payload.chunks(2) {
            let high = unit.get(1).copied().unwrap_or(0);
            self.rx_fifo
                .push_back(u16::from_le_bytes([unit[0], high]) as u32);
        }
    }

    /// Queue a raw FIFO word
    pub fn push_rx_word(&mut self, word: u32) {
        self.rx_fifo.push_back(word);
    }

    /// Words left in the RX FIFO
    pub fn rx_pending(&self) -> usize {
        self.rx_fifo.len()
    }

    /// Keep the flush bit set forever
    pub fn set_flush_sticky(&mut self, sticky: bool) {
        self.flush_sticky = sticky;
    }

    /// Make the next `RX_FBC` read report an empty FIFO
    pub fn hide_fbc_once(&mut self) {
        self.hide_fbc = true;
    }

    // -------------------------------------------------------------------------
    // TX FIFO
    // -------------------------------------------------------------------------

    pub fn sent_frames(&self) -> &[SentFrame] {
        &self.sent
    }

    // -------------------------------------------------------------------------
    // PHY
    // -------------------------------------------------------------------------

    pub fn set_phy_reg(&mut self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.phy.insert((phy_addr, reg_addr), value);
    }

    /// Read the simulated PHY register file (not logged)
    pub fn phy_reg(&self, phy_addr: u8, reg_addr: u8) -> u16 {
        match self.phy.get(&(phy_addr, reg_addr)) {
            Some(value) => *value,
            None if self.phy.keys().any(|(addr, _)| *addr == phy_addr) => 0,
            None => 0xFFFF,
        }
    }

    fn mii_target(&self) -> (u8, u8) {
        let madr = self.reg(MAC_MADR);
        (((madr >> MAC_MADR_PHY_SHIFT) & 0x1F) as u8, (madr & 0x1F) as u8)
    }

    // -------------------------------------------------------------------------
    // Hardware side effects
    // -------------------------------------------------------------------------

    /// Let a pending flush make progress
    fn advance(&mut self) {
        match self.flush_pending {
            Some(_) if self.flush_sticky => {}
            Some(n) if n > 1 => self.flush_pending = Some(n - 1),
            Some(_) => {
                self.flush_pending = None;
                *self.regs.entry(RX_CTL).or_default() &= !RX_CTL_FLUSH;
            }
            None => {}
        }
    }

    fn start_channel(&mut self, channel: usize) {
        let length_reg = if channel == 0 { TX_PL0 } else { TX_PL1 };
        let units = core::mem::take(&mut self.tx_capture[channel]);
        self.sent.push(SentFrame {
            channel,
            units,
            length: self.reg(length_reg) as usize,
        });
    }
}

impl RegisterPort for SimRegisters {
    fn read32(&mut self, offset: usize) -> u32 {
        self.advance();
        let value = match offset {
            RX_FBC if self.hide_fbc => {
                self.hide_fbc = false;
                0
            }
            RX_FBC => (self.rx_fifo.len() * 4) as u32,
            RX_IO_DATA => self.rx_fifo.pop_front().unwrap_or(0),
            MAC_MRDD => {
                let (phy, reg) = self.mii_target();
                self.phy_reg(phy, reg) as u32
            }
            _ => self.reg(offset),
        };
        self.log.push(Access::Read(offset, value));
        value
    }

    fn write32(&mut self, offset: usize, value: u32) {
        self.advance();
        self.log.push(Access::Write(offset, value));
        match offset {
            INT_STA => {
                *self.regs.entry(INT_STA).or_default() &= !value;
                return;
            }
            RX_CTL if value & RX_CTL_FLUSH != 0 => {
                self.rx_fifo.clear();
                self.flush_pending = Some(FLUSH_CYCLES);
            }
            TX_INS => {
                self.tx_selected = (value & 1) as usize;
                self.tx_capture[self.tx_selected].clear();
            }
            MAC_MWTD => {
                let (phy, reg) = self.mii_target();
                self.set_phy_reg(phy, reg, value as u16);
            }
            _ => {}
        }
        self.regs.insert(offset, value);

        if value & TX_CTL_START != 0 {
            match offset {
                TX_CTL0 => self.start_channel(0),
                TX_CTL1 => self.start_channel(1),
                _ => {}
            }
        }
    }

    fn write16(&mut self, offset: usize, value: u16) {
        if offset != TX_IO_DATA {
            self.write32(offset, value as u32);
            return;
        }
        self.advance();
        self.log.push(Access::Write(offset, value as u32));
        self.tx_capture[self.tx_selected].push(value);
    }
}

// =============================================================================
// Mock MII Bus
// =============================================================================

/// Mock MII bus for testing PHY logic without a MAC
///
/// Unset registers read as zero.
///
/// # Example
///
/// ```ignore
/// let mut mii = MockMii::new();
/// mii.set_register(1, phy_reg::BMSR, bmsr::LINK_STATUS);
/// ```
#[derive(Debug, Default)]
pub struct MockMii {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: HashMap<(u8, u8), u16>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: Vec<(u8, u8, u16)>,
    fail_reads: bool,
}

impl MockMii {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&mut self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers.insert((phy_addr, reg_addr), value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.get(&(phy_addr, reg_addr)).copied()
    }

    pub fn get_writes(&self) -> &[(u8, u8, u16)] {
        &self.write_log
    }

    /// Make every read fail with a PHY error
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }
}

impl MiiBus for MockMii {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        if self.fail_reads {
            return Err(Error::Io(IoError::PhyError));
        }
        Ok(self.get_register(phy_addr, reg_addr).unwrap_or(0))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log.push((phy_addr, reg_addr, value));
        self.registers.insert((phy_addr, reg_addr), value);
        Ok(())
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

// =============================================================================
// Mock Clock Gate and Pin
// =============================================================================

/// Clock gate that counts calls and can be told to fail
#[derive(Debug, Default)]
pub struct MockClock {
    enabled: bool,
    fail: bool,
    enable_calls: usize,
    disable_calls: usize,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_enable(&mut self, fail: bool) {
        self.fail = fail;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls
    }

    pub fn disable_calls(&self) -> usize {
        self.disable_calls
    }
}

impl ClockGate for MockClock {
    fn enable(&mut self) -> ConfigResult<()> {
        self.enable_calls += 1;
        if self.fail {
            return Err(ConfigError::ClockError);
        }
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) {
        self.disable_calls += 1;
        self.enabled = false;
    }
}

/// Output pin that records its level
#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
    fail: bool,
    transitions: usize,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of successful level changes
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    fn drive(&mut self, high: bool) -> core::result::Result<(), embedded_hal::digital::ErrorKind> {
        if self.fail {
            return Err(embedded_hal::digital::ErrorKind::Other);
        }
        self.high = high;
        self.transitions += 1;
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = embedded_hal::digital::ErrorKind;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.drive(true)
    }
}

// =============================================================================
// Mock Network Stack
// =============================================================================

/// Owned outbound packet for [`MockStack`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPacket(pub Vec<u8>);

impl Packet for TestPacket {
    fn segment_count(&self) -> usize {
        1
    }

    fn segment(&self, _index: usize) -> &[u8] {
        &self.0
    }
}

/// Network stack that records every upcall
#[derive(Debug, Default)]
pub struct MockStack {
    tx: VecDeque<TestPacket>,
    delivered: Vec<RxFrame>,
    completions: Vec<u8>,
    link_events: Vec<LinkState>,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_tx(&mut self, frame: &[u8]) {
        self.tx.push_back(TestPacket(frame.to_vec()));
    }

    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    pub fn delivered(&self) -> &[RxFrame] {
        &self.delivered
    }

    /// Channel masks reported by `tx_completed`
    pub fn completions(&self) -> &[u8] {
        &self.completions
    }

    pub fn link_events(&self) -> &[LinkState] {
        &self.link_events
    }
}

impl NetworkStack for MockStack {
    type Packet = TestPacket;

    fn dequeue(&mut self) -> Option<TestPacket> {
        self.tx.pop_front()
    }

    fn deliver(&mut self, frame: RxFrame) {
        self.delivered.push(frame);
    }

    fn link_changed(&mut self, state: LinkState) {
        self.link_events.push(state);
    }

    fn tx_completed(&mut self, channels: TxChannels) {
        self.completions.push(channels.bits());
    }
}

// =============================================================================
// Driver Fixtures
// =============================================================================

/// Driver attached to a simulated window with a PHY at the default address
pub fn attached() -> Wemac<SimRegisters, MockDelay> {
    let mut clock = MockClock::new();
    Wemac::attach(
        SimRegisters::with_phy(DEFAULT_PHY_ADDR),
        MockDelay::new(),
        &mut clock,
        WemacConfig::new(),
    )
    .expect("attach to simulated WEMAC")
}

/// Driver that is attached and running
pub fn running() -> Wemac<SimRegisters, MockDelay> {
    let mut wemac = attached();
    wemac.init().expect("init simulated WEMAC");
    wemac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::wemac::INT_RX_READY;

    #[test]
    fn sim_rx_fifo_pops_in_order() {
        let mut regs = SimRegisters::new();
        regs.push_rx_frame(&[1, 2, 3]);

        assert_ne!(regs.read32(RX_FBC), 0);
        assert_eq!(regs.read32(RX_IO_DATA), RX_MAGIC);
        assert_eq!(regs.read32(RX_IO_DATA), 3);
        assert_eq!(regs.read16(RX_IO_DATA), 0x0201);
        assert_eq!(regs.read16(RX_IO_DATA), 0x0003);
        assert_eq!(regs.read32(RX_FBC), 0);
        assert_eq!(regs.reads_from(RX_IO_DATA), 4);
    }

    #[test]
    fn sim_flush_self_clears() {
        let mut regs = SimRegisters::new();
        regs.push_rx_word(0x1234);
        regs.write32(RX_CTL, RX_CTL_FLUSH);
        assert_eq!(regs.rx_pending(), 0);

        assert_ne!(regs.read32(RX_CTL) & RX_CTL_FLUSH, 0);
        assert_eq!(regs.read32(RX_CTL) & RX_CTL_FLUSH, 0);
    }

    #[test]
    fn sim_interrupt_latch_write_one_to_clear() {
        let mut regs = SimRegisters::new();
        regs.raise(INT_RX_READY | 1);
        regs.write32(INT_STA, 1);
        assert_eq!(regs.read32(INT_STA), INT_RX_READY);
    }

    #[test]
    fn sim_tx_capture() {
        let mut regs = SimRegisters::new();
        regs.write32(TX_INS, 1);
        regs.write16(TX_IO_DATA, 0x0201);
        regs.write16(TX_IO_DATA, 0x0003);
        regs.write32(TX_PL1, 3);
        regs.write32(TX_CTL1, TX_CTL_START);

        let sent = regs.sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel, 1);
        assert_eq!(sent[0].bytes(), [1, 2, 3]);
    }

    #[test]
    fn mock_mii_read_write() {
        let mut mii = MockMii::new();
        assert_eq!(mii.read(0, 1).unwrap(), 0);

        mii.write(0, 1, 0x5678).unwrap();
        assert_eq!(mii.read(0, 1).unwrap(), 0x5678);
        assert_eq!(mii.get_writes(), &[(0, 1, 0x5678)]);
    }

    #[test]
    fn mock_delay_tracking() {
        let mut delay = MockDelay::new();

        embedded_hal::delay::DelayNs::delay_ns(&mut delay, 1000);
        embedded_hal::delay::DelayNs::delay_us(&mut delay, 2);

        assert_eq!(delay.total_ns(), 3000);
        assert_eq!(delay.total_us(), 3);
    }
}
