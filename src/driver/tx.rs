//! Transmit channel allocation.
//!
//! The WEMAC has two transmit channels, each with its own length and "go"
//! register, behind a single CPU-fed TX FIFO port. A channel is claimed when
//! a frame is written into it and released by the TX-complete (or abort)
//! interrupt. With both channels busy the allocator refuses work and the
//! frames stay queued in the network stack.

use embedded_hal::delay::DelayNs;

use super::config::State;
use super::error::{IoError, IoResult};
use super::interrupt::InterruptStatus;
use super::net::NetworkStack;
use super::wemac::Wemac;
use crate::hal::port::RegisterPort;
use crate::internal::constants::{MAX_FRAME_LEN, TX_CHANNELS_ALL_BUSY};
use crate::internal::register::wemac::{
    INT_TX0_ABORT, INT_TX0_DONE, INT_TX1_ABORT, INT_TX1_DONE, TX_CTL_START, TX_CTL0, TX_CTL1,
    TX_INS, TX_IO_DATA, TX_MODE, TX_MODE_DMA, TX_PL0, TX_PL1,
};

// =============================================================================
// Channels
// =============================================================================

/// One of the two hardware transmit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxChannel {
    /// Channel 0
    Ch0,
    /// Channel 1
    Ch1,
}

impl TxChannel {
    /// Both channels, in index order
    pub const ALL: [TxChannel; 2] = [TxChannel::Ch0, TxChannel::Ch1];

    /// Channel index as written to TX_INS
    pub const fn index(self) -> usize {
        match self {
            TxChannel::Ch0 => 0,
            TxChannel::Ch1 => 1,
        }
    }

    /// Bit of this channel in a [`TxChannels`] mask
    pub const fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Packet length register
    pub(crate) const fn length_reg(self) -> usize {
        match self {
            TxChannel::Ch0 => TX_PL0,
            TxChannel::Ch1 => TX_PL1,
        }
    }

    /// Control ("go") register
    pub(crate) const fn control_reg(self) -> usize {
        match self {
            TxChannel::Ch0 => TX_CTL0,
            TxChannel::Ch1 => TX_CTL1,
        }
    }

    /// INT_STA bit signalling completion on this channel
    pub const fn done_irq(self) -> u32 {
        match self {
            TxChannel::Ch0 => INT_TX0_DONE,
            TxChannel::Ch1 => INT_TX1_DONE,
        }
    }

    /// INT_STA bit signalling an aborted frame on this channel
    pub const fn abort_irq(self) -> u32 {
        match self {
            TxChannel::Ch0 => INT_TX0_ABORT,
            TxChannel::Ch1 => INT_TX1_ABORT,
        }
    }
}

/// Set of transmit channels (bit i = channel i)
///
/// Used both for the busy mask held in the MAC context and for the set of
/// channels a completion interrupt released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxChannels(u8);

impl TxChannels {
    /// No channel
    pub const EMPTY: Self = Self(0);

    /// Both channels
    pub const ALL: Self = Self(TX_CHANNELS_ALL_BUSY);

    /// Build a set from raw bits; bits above channel 1 are ignored
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & TX_CHANNELS_ALL_BUSY)
    }

    /// Raw mask value (0-3)
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check whether `channel` is in the set
    pub const fn contains(self, channel: TxChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    /// Check if the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if both channels are in the set
    pub const fn is_full(self) -> bool {
        self.0 == TX_CHANNELS_ALL_BUSY
    }

    /// Number of channels in the set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Add a channel
    pub fn insert(&mut self, channel: TxChannel) {
        self.0 |= channel.bit();
    }

    /// Remove every channel of `other`
    pub fn remove_all(&mut self, other: TxChannels) {
        self.0 &= !other.0;
    }

    /// Channel the next frame goes to, treating the set as a busy mask
    ///
    /// Mask 0 and 2 pick channel 0, mask 1 picks channel 1 and mask 3 has no
    /// free channel.
    pub const fn next_free(self) -> Option<TxChannel> {
        match self.0 {
            0 | 2 => Some(TxChannel::Ch0),
            1 => Some(TxChannel::Ch1),
            _ => None,
        }
    }

    /// Iterate over the channels in the set
    pub fn iter(self) -> impl Iterator<Item = TxChannel> {
        TxChannel::ALL.into_iter().filter(move |ch| self.contains(*ch))
    }
}

// =============================================================================
// Outbound Packets
// =============================================================================

/// An outbound frame as an ordered list of byte segments
///
/// Segments are written to the FIFO back to back; their boundaries do not
/// need to fall on 16-bit units.
pub trait Packet {
    /// Number of segments
    fn segment_count(&self) -> usize;

    /// Segment `index` (0-based)
    fn segment(&self, index: usize) -> &[u8];

    /// Total frame length in bytes
    fn total_len(&self) -> usize {
        (0..self.segment_count()).map(|i| self.segment(i).len()).sum()
    }
}

impl Packet for [u8] {
    fn segment_count(&self) -> usize {
        1
    }

    fn segment(&self, _index: usize) -> &[u8] {
        self
    }

    fn total_len(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> Packet for [u8; N] {
    fn segment_count(&self) -> usize {
        1
    }

    fn segment(&self, _index: usize) -> &[u8] {
        self
    }

    fn total_len(&self) -> usize {
        N
    }
}

impl Packet for [&[u8]] {
    fn segment_count(&self) -> usize {
        self.len()
    }

    fn segment(&self, index: usize) -> &[u8] {
        self[index]
    }
}

impl<const N: usize> Packet for [&[u8]; N] {
    fn segment_count(&self) -> usize {
        N
    }

    fn segment(&self, index: usize) -> &[u8] {
        self[index]
    }
}

impl<T: Packet + ?Sized> Packet for &T {
    fn segment_count(&self) -> usize {
        (**self).segment_count()
    }

    fn segment(&self, index: usize) -> &[u8] {
        (**self).segment(index)
    }

    fn total_len(&self) -> usize {
        (**self).total_len()
    }
}

/// Packs a byte stream into little-endian 16-bit FIFO units
struct UnitWriter<'a, P: RegisterPort> {
    port: &'a mut P,
    carry: Option<u8>,
}

impl<'a, P: RegisterPort> UnitWriter<'a, P> {
    fn new(port: &'a mut P) -> Self {
        Self { port, carry: None }
    }

    fn push(&mut self, mut bytes: &[u8]) {
        if let Some(low) = self.carry.take() {
            match bytes.split_first() {
                Some((&high, rest)) => {
                    self.port.write16(TX_IO_DATA, u16::from_le_bytes([low, high]));
                    bytes = rest;
                }
                None => {
                    self.carry = Some(low);
                    return;
                }
            }
        }

        let mut units = bytes.chunks_exact(2);
        for unit in &mut units {
            self.port.write16(TX_IO_DATA, u16::from_le_bytes([unit[0], unit[1]]));
        }
        if let [last] = units.remainder() {
            self.carry = Some(*last);
        }
    }

    /// Write the trailing odd byte as a partial unit
    fn finish(self) {
        if let Some(low) = self.carry {
            self.port.write16(TX_IO_DATA, u16::from_le_bytes([low, 0]));
        }
    }
}

// =============================================================================
// Transmit Path
// =============================================================================

impl<P: RegisterPort, D: DelayNs> Wemac<P, D> {
    /// Get the busy transmit channels
    #[inline(always)]
    pub fn tx_channels(&self) -> TxChannels {
        self.tx
    }

    /// Check if a transmit channel is free
    #[inline(always)]
    pub fn can_transmit(&self) -> bool {
        self.state == State::Running && !self.tx.is_full()
    }

    /// Write one frame into a free channel and start it
    ///
    /// Claims the channel chosen from the busy mask, streams the segments
    /// through the TX FIFO port, programs the length and sets the go bit.
    /// Arms the watchdog.
    ///
    /// With both channels busy nothing is written and the caller keeps the
    /// frame.
    ///
    /// # Errors
    /// - `InvalidState` - driver is not running
    /// - `ChannelsBusy` - both channels are busy
    /// - `FrameTooLarge` - frame exceeds the maximum frame length
    pub fn submit<T: Packet + ?Sized>(&mut self, packet: &T) -> IoResult<TxChannel> {
        if self.state != State::Running {
            return Err(IoError::InvalidState);
        }
        let channel = self.tx.next_free().ok_or(IoError::ChannelsBusy)?;

        let total = packet.total_len();
        if total > MAX_FRAME_LEN {
            #[cfg(feature = "defmt")]
            defmt::warn!("dropping oversized TX frame ({} bytes)", total);

            self.stats.tx_errors += 1;
            return Err(IoError::FrameTooLarge);
        }

        self.port.write32(TX_INS, channel.index() as u32);
        self.port.clear_bits32(TX_MODE, TX_MODE_DMA);
        self.tx.insert(channel);

        let mut writer = UnitWriter::new(&mut self.port);
        for i in 0..packet.segment_count() {
            let segment = packet.segment(i);
            if segment.is_empty() {
                continue;
            }
            writer.push(segment);
        }
        writer.finish();

        self.port.write32(channel.length_reg(), total as u32);
        self.port.set_bits32(channel.control_reg(), TX_CTL_START);

        self.watchdog = self.config.watchdog_ticks;
        self.stats.tx_packets += 1;
        Ok(channel)
    }

    /// Move queued frames from the network stack into free channels
    ///
    /// Frames are only dequeued while a channel is free, so at most two are
    /// in flight and the rest stay queued upstream. Oversized frames are
    /// dropped. Returns the number of frames started.
    pub fn start_tx<N: NetworkStack + ?Sized>(&mut self, net: &mut N) -> usize {
        let mut started = 0;
        while self.can_transmit() {
            let Some(packet) = net.dequeue() else {
                break;
            };
            if self.submit(&packet).is_ok() {
                started += 1;
            }
        }
        started
    }

    /// Release the channels named by a TX-complete or abort interrupt
    ///
    /// Returns the released channels. The watchdog is disarmed once no
    /// channel is busy and reloaded while one still is.
    pub(super) fn complete_tx(&mut self, status: &InterruptStatus) -> TxChannels {
        let mut released = TxChannels::EMPTY;
        for channel in TxChannel::ALL {
            if status.is_done(channel) {
                released.insert(channel);
            }
            if status.is_aborted(channel) {
                released.insert(channel);
                self.stats.tx_errors += 1;
            }
        }

        if released.is_empty() {
            return released;
        }
        self.tx.remove_all(released);
        self.watchdog = if self.tx.is_empty() {
            0
        } else {
            self.config.watchdog_ticks
        };
        released
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::testing::{MockStack, running};

    #[test]
    fn next_free_follows_mask() {
        assert_eq!(TxChannels::from_bits(0).next_free(), Some(TxChannel::Ch0));
        assert_eq!(TxChannels::from_bits(1).next_free(), Some(TxChannel::Ch1));
        assert_eq!(TxChannels::from_bits(2).next_free(), Some(TxChannel::Ch0));
        assert_eq!(TxChannels::from_bits(3).next_free(), None);
        assert_eq!(TxChannels::from_bits(0xFF), TxChannels::ALL);
    }

    #[test]
    fn channel_set_operations() {
        let mut set = TxChannels::EMPTY;
        set.insert(TxChannel::Ch1);
        assert!(set.contains(TxChannel::Ch1));
        assert!(!set.contains(TxChannel::Ch0));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), [TxChannel::Ch1]);

        set.insert(TxChannel::Ch0);
        assert!(set.is_full());
        set.remove_all(TxChannels::from_bits(0b10));
        assert_eq!(set.bits(), 0b01);
    }

    #[test]
    fn submit_is_noop_only_when_both_busy() {
        for mask in 0..=3u8 {
            let mut wemac = running();
            wemac.tx = TxChannels::from_bits(mask);
            wemac.port_mut().clear_log();

            let result = wemac.submit(&[0u8; 60]);
            if mask == 3 {
                assert_eq!(result, Err(IoError::ChannelsBusy));
                assert_eq!(wemac.tx_channels().bits(), 3);
                assert!(wemac.port_mut().log().is_empty());
            } else {
                assert!(result.is_ok());
                let after = wemac.tx_channels().bits();
                assert_eq!(after & mask, mask);
                assert_eq!((after & !mask).count_ones(), 1);
            }
        }
    }

    #[test]
    fn frame_of_length_l_takes_ceil_half_units() {
        for len in [1usize, 2, 59, 60, 61, 1514] {
            let mut wemac = running();
            let frame: Vec<u8> = (0..len).map(|i| i as u8).collect();

            let channel = wemac.submit(frame.as_slice()).unwrap();
            assert_eq!(channel, TxChannel::Ch0);

            let regs = wemac.port_mut();
            assert_eq!(regs.writes_to(TX_IO_DATA).len(), len.div_ceil(2));
            assert_eq!(regs.reg(TX_PL0), len as u32);
            let sent = regs.sent_frames();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].bytes(), frame);
        }
    }

    #[test]
    fn segments_stream_across_odd_boundaries() {
        let mut wemac = running();
        let head: &[u8] = &[1, 2, 3];
        let empty: &[u8] = &[];
        let tail: &[u8] = &[4, 5, 6, 7, 8];

        wemac.submit(&[head, empty, tail]).unwrap();

        let regs = wemac.port_mut();
        assert_eq!(regs.writes_to(TX_IO_DATA), [0x0201, 0x0403, 0x0605, 0x0807]);
        assert_eq!(regs.reg(TX_PL0), 8);
    }

    #[test]
    fn submit_selects_channel_and_starts_it() {
        let mut wemac = running();
        wemac.submit(&[0xAAu8; 64]).unwrap();
        assert_eq!(wemac.submit(&[0xBBu8; 65]), Ok(TxChannel::Ch1));

        let regs = wemac.port_mut();
        assert_eq!(regs.writes_to(TX_INS), [0, 1]);
        assert_eq!(regs.reg(TX_PL1), 65);
        assert_ne!(regs.reg(TX_CTL0) & TX_CTL_START, 0);
        assert_ne!(regs.reg(TX_CTL1) & TX_CTL_START, 0);
        assert_eq!(regs.reg(TX_MODE) & TX_MODE_DMA, 0);

        let sent = regs.sent_frames();
        assert_eq!(sent[0].channel, 0);
        assert_eq!(sent[1].channel, 1);
        assert_eq!(sent[1].bytes().len(), 65);
    }

    #[test]
    fn submit_arms_watchdog_and_counts() {
        let mut wemac = running();
        assert_eq!(wemac.watchdog_ticks(), 0);

        wemac.submit(&[0u8; 60]).unwrap();
        assert_eq!(wemac.watchdog_ticks(), 5);
        assert_eq!(wemac.stats().tx_packets, 1);
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut wemac = running();
        let frame = [0u8; MAX_FRAME_LEN + 1];

        assert_eq!(wemac.submit(&frame), Err(IoError::FrameTooLarge));
        assert!(wemac.tx_channels().is_empty());
        assert_eq!(wemac.stats().tx_errors, 1);
    }

    #[test]
    fn submit_requires_running() {
        let mut wemac = running();
        wemac.stop().unwrap();
        assert_eq!(wemac.submit(&[0u8; 60]), Err(IoError::InvalidState));
    }

    #[test]
    fn start_tx_fills_at_most_two_channels() {
        let mut wemac = running();
        let mut stack = MockStack::new();
        for i in 0..5u8 {
            stack.queue_tx(&[i; 60]);
        }

        assert_eq!(wemac.start_tx(&mut stack), 2);
        assert!(wemac.tx_channels().is_full());
        assert_eq!(stack.tx_pending(), 3);

        // Backpressure: nothing more leaves the queue
        assert_eq!(wemac.start_tx(&mut stack), 0);
        assert_eq!(stack.tx_pending(), 3);
    }

    #[test]
    fn completion_releases_channel_and_manages_watchdog() {
        let mut wemac = running();
        wemac.submit(&[0u8; 60]).unwrap();
        wemac.submit(&[0u8; 60]).unwrap();
        wemac.watchdog = 2;

        let released = wemac.complete_tx(&InterruptStatus::from_raw(INT_TX0_DONE));
        assert_eq!(released.bits(), 0b01);
        assert_eq!(wemac.tx_channels().bits(), 0b10);
        assert_eq!(wemac.watchdog_ticks(), 5);

        let released = wemac.complete_tx(&InterruptStatus::from_raw(INT_TX1_DONE));
        assert_eq!(released.bits(), 0b10);
        assert!(wemac.tx_channels().is_empty());
        assert_eq!(wemac.watchdog_ticks(), 0);
    }

    #[test]
    fn abort_releases_channel_and_counts_error() {
        let mut wemac = running();
        wemac.submit(&[0u8; 60]).unwrap();

        let released = wemac.complete_tx(&InterruptStatus::from_raw(INT_TX0_ABORT));
        assert_eq!(released.bits(), 0b01);
        assert!(wemac.tx_channels().is_empty());
        assert_eq!(wemac.stats().tx_errors, 1);
    }
}
