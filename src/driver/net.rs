//! Networking collaborator interface.
//!
//! The packet engine does not own an outbound queue or decide what to do
//! with received frames. A [`NetworkStack`] supplies both: it is drained
//! into free transmit channels and receives every completed inbound frame.

use super::config::LinkState;
use super::rx::RxFrame;
use super::tx::{Packet, TxChannels};

/// The network stack sitting above the driver
///
/// `dequeue` may be called with the MAC lock held. The upcalls
/// (`deliver`, `link_changed`, `tx_completed`) are made with it released
/// when the driver is used through [`SharedWemac`](crate::sync::SharedWemac).
pub trait NetworkStack {
    /// Outbound packet type
    type Packet: Packet;

    /// Take the next outbound packet, if any
    fn dequeue(&mut self) -> Option<Self::Packet>;

    /// Take ownership of a received frame
    fn deliver(&mut self, frame: RxFrame);

    /// Link went up or down
    fn link_changed(&mut self, _state: LinkState) {}

    /// Channels released by a completion interrupt
    fn tx_completed(&mut self, _channels: TxChannels) {}
}

impl<N: NetworkStack + ?Sized> NetworkStack for &mut N {
    type Packet = N::Packet;

    fn dequeue(&mut self) -> Option<Self::Packet> {
        (**self).dequeue()
    }

    fn deliver(&mut self, frame: RxFrame) {
        (**self).deliver(frame)
    }

    fn link_changed(&mut self, state: LinkState) {
        (**self).link_changed(state)
    }

    fn tx_completed(&mut self, channels: TxChannels) {
        (**self).tx_completed(channels)
    }
}
