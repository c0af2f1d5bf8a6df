//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! This module provides integration with the [smoltcp](https://docs.rs/smoltcp) network stack.
//!
//! [`SmoltcpStack`] is a pair of fixed-capacity frame queues. The driver side
//! sees it as a [`NetworkStack`]: received frames are delivered into the RX
//! queue and outbound frames are dequeued from the TX queue. smoltcp sees it
//! as a `smoltcp::phy::Device`.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface, SocketSet};
//! use a10_wemac::integration::smoltcp::{SmoltcpStack, ethernet_address};
//!
//! let mut stack: SmoltcpStack<4, 4> = SmoltcpStack::new();
//! let config = Config::new(WEMAC.with(|w| ethernet_address(w)).unwrap().into());
//! let mut iface = Interface::new(config, &mut stack, Instant::ZERO);
//!
//! loop {
//!     iface.poll(now(), &mut stack, &mut sockets);
//!     WEMAC.send(&mut stack);
//! }
//! ```
//!
//! The interrupt handler and tick deliver into the same stack value, so it
//! needs the same kind of protection as the driver when they run in
//! different contexts.
//!
//! # Features
//!
//! This module is only available when the `smoltcp` feature is enabled in Cargo.toml:
//! ```toml
//! [dependencies]
//! a10-wemac = { version = "0.1", features = ["smoltcp"] }
//! ```

use embedded_hal::delay::DelayNs;
use smoltcp::phy::{Checksum, ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

use crate::driver::config::LinkState;
use crate::driver::net::NetworkStack;
use crate::driver::rx::RxFrame;
use crate::driver::tx::{Packet, TxChannels};
use crate::driver::wemac::Wemac;
use crate::hal::port::RegisterPort;
use crate::internal::constants::{ETH_HEADER_SIZE, MAX_FRAME_LEN, MTU};

// =============================================================================
// Frame Queue
// =============================================================================

/// Fixed-capacity FIFO of frames
struct Ring<T, const N: usize> {
    slots: [Option<T>; N],
    head: usize,
    len: usize,
}

impl<T, const N: usize> Ring<T, N> {
    const fn new() -> Self {
        Self {
            slots: [const { None }; N],
            head: 0,
            len: 0,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == N
    }

    /// Append an item, handing it back if the ring is full
    fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        let tail = (self.head + self.len) % N;
        self.slots[tail] = Some(item);
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        item
    }
}

// =============================================================================
// Outbound Buffer
// =============================================================================

/// An outbound frame queued by smoltcp
pub struct TxBuffer {
    data: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl TxBuffer {
    const fn new() -> Self {
        Self {
            data: [0; MAX_FRAME_LEN],
            len: 0,
        }
    }

    /// The frame bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl Packet for TxBuffer {
    fn segment_count(&self) -> usize {
        1
    }

    fn segment(&self, _index: usize) -> &[u8] {
        self.as_slice()
    }

    fn total_len(&self) -> usize {
        self.len
    }
}

// =============================================================================
// Stack Adapter
// =============================================================================

/// Frame queues between the driver and smoltcp
///
/// # Type Parameters
/// * `RXQ` - Received frames held until smoltcp polls
/// * `TXQ` - Outbound frames held until a transmit channel frees up
pub struct SmoltcpStack<const RXQ: usize, const TXQ: usize> {
    rx: Ring<RxFrame, RXQ>,
    tx: Ring<TxBuffer, TXQ>,
    link: LinkState,
    rx_overruns: u32,
    tx_overruns: u32,
}

impl<const RXQ: usize, const TXQ: usize> SmoltcpStack<RXQ, TXQ> {
    /// Create empty queues
    pub const fn new() -> Self {
        Self {
            rx: Ring::new(),
            tx: Ring::new(),
            link: LinkState::Down,
            rx_overruns: 0,
            tx_overruns: 0,
        }
    }

    /// Link state as last reported by the driver
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Received frames waiting for smoltcp
    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    /// Outbound frames waiting for a transmit channel
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Received frames dropped because the RX queue was full
    pub fn rx_overruns(&self) -> u32 {
        self.rx_overruns
    }

    /// Outbound frames dropped because the TX queue was full
    pub fn tx_overruns(&self) -> u32 {
        self.tx_overruns
    }
}

impl<const RXQ: usize, const TXQ: usize> Default for SmoltcpStack<RXQ, TXQ> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RXQ: usize, const TXQ: usize> NetworkStack for SmoltcpStack<RXQ, TXQ> {
    type Packet = TxBuffer;

    fn dequeue(&mut self) -> Option<TxBuffer> {
        self.tx.pop()
    }

    fn deliver(&mut self, frame: RxFrame) {
        if self.rx.push(frame).is_err() {
            #[cfg(feature = "defmt")]
            defmt::debug!("smoltcp RX queue full, dropping frame");

            self.rx_overruns += 1;
        }
    }

    fn link_changed(&mut self, state: LinkState) {
        self.link = state;
    }

    fn tx_completed(&mut self, _channels: TxChannels) {}
}

// =============================================================================
// Tokens
// =============================================================================

/// Receive token for smoltcp, owning one received frame
pub struct WemacRxToken {
    frame: RxFrame,
}

impl smoltcp::phy::RxToken for WemacRxToken {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        f(self.frame.payload())
    }
}

/// Transmit token for smoltcp, borrowing the outbound queue
pub struct WemacTxToken<'a, const TXQ: usize> {
    queue: &'a mut Ring<TxBuffer, TXQ>,
    overruns: &'a mut u32,
}

impl<const TXQ: usize> smoltcp::phy::TxToken for WemacTxToken<'_, TXQ> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let len = len.min(MAX_FRAME_LEN);
        let mut buffer = TxBuffer::new();
        let result = f(&mut buffer.data[..len]);
        buffer.len = len;

        // A token handed out alongside an RX token may find the queue full
        if self.queue.push(buffer).is_err() {
            *self.overruns += 1;
        }
        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<const RXQ: usize, const TXQ: usize> Device for SmoltcpStack<RXQ, TXQ> {
    type RxToken<'a>
        = WemacRxToken
    where
        Self: 'a;
    type TxToken<'a>
        = WemacTxToken<'a, TXQ>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        let frame = self.rx.pop()?;
        Some((
            WemacRxToken { frame },
            WemacTxToken {
                queue: &mut self.tx,
                overruns: &mut self.tx_overruns,
            },
        ))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.tx.is_full() {
            return None;
        }
        Some(WemacTxToken {
            queue: &mut self.tx,
            overruns: &mut self.tx_overruns,
        })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();

        caps.medium = Medium::Ethernet;

        // Ethernet MTU as smoltcp counts it (header included)
        caps.max_transmission_unit = MTU + ETH_HEADER_SIZE;

        // One frame per poll
        caps.max_burst_size = Some(1);

        // No checksum offload on this MAC
        caps.checksum = ChecksumCapabilities::default();
        caps.checksum.ipv4 = Checksum::Both;
        caps.checksum.udp = Checksum::Both;
        caps.checksum.tcp = Checksum::Both;
        caps.checksum.icmpv4 = Checksum::Both;

        caps
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the MAC address as a smoltcp EthernetAddress
///
/// This is a convenience function for creating smoltcp interface configurations.
pub fn ethernet_address<P: RegisterPort, D: DelayNs>(
    wemac: &Wemac<P, D>,
) -> smoltcp::wire::EthernetAddress {
    smoltcp::wire::EthernetAddress(*wemac.mac_address())
}
