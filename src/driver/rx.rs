//! Receive FIFO draining.
//!
//! Each frame in the RX FIFO is laid out as
//!
//! ```text
//! +------------+------------------------+---------------------------+
//! | 0x0143414D | status:16 | length:16  | ceil(length/2) data units |
//! +------------+------------------------+---------------------------+
//! ```
//!
//! The marker word is a framing check only. A mismatch means the reader and
//! the FIFO have lost alignment, and the only way back is a full flush.

use embedded_hal::delay::DelayNs;

use super::config::State;
use super::error::IoError;
use super::wemac::Wemac;
use crate::hal::port::RegisterPort;
use crate::internal::constants::{
    MAX_FRAME_LEN, RX_BUFFER_SIZE, RX_LEN_MASK, RX_MAGIC, RX_PAD, RX_STATUS_SHIFT,
};
use crate::internal::register::wemac::{CTL, CTL_RX_EN, RX_CTL, RX_CTL_FLUSH, RX_FBC, RX_IO_DATA};

// =============================================================================
// Inbound Frames
// =============================================================================

/// A frame read out of the RX FIFO
///
/// The payload sits after a two-byte pad so that the IP header following the
/// Ethernet header lands on a 32-bit boundary.
#[derive(Clone)]
pub struct RxFrame {
    data: [u8; RX_BUFFER_SIZE],
    len: usize,
    status: u16,
}

impl RxFrame {
    pub(crate) const fn new(len: usize, status: u16) -> Self {
        Self {
            data: [0; RX_BUFFER_SIZE],
            len,
            status,
        }
    }

    /// Build a frame from a payload (frames longer than the buffer are cut)
    pub fn from_payload(payload: &[u8]) -> Self {
        let len = payload.len().min(MAX_FRAME_LEN);
        let mut frame = Self::new(len, 0);
        frame.data[RX_PAD..RX_PAD + len].copy_from_slice(&payload[..len]);
        frame
    }

    /// Frame length as reported by the FIFO header
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the frame carries no data
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The frame bytes, without the leading pad
    pub fn payload(&self) -> &[u8] {
        &self.data[RX_PAD..RX_PAD + self.len]
    }

    /// The frame bytes including the leading pad
    pub fn as_padded(&self) -> &[u8] {
        &self.data[..RX_PAD + self.len]
    }

    /// Size of the padded buffer (length plus pad)
    #[inline(always)]
    pub fn buffer_len(&self) -> usize {
        self.len + RX_PAD
    }

    /// Hardware status half of the header word, passed through uninterpreted
    #[inline(always)]
    pub fn status(&self) -> u16 {
        self.status
    }
}

impl core::fmt::Debug for RxFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RxFrame")
            .field("len", &self.len)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RxFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RxFrame {{ len: {}, status: {=u16:#x} }}", self.len, self.status)
    }
}

/// Result of one [`drain_one`](Wemac::drain_one) call
#[derive(Debug)]
pub enum RxOutcome {
    /// A complete frame was read out of the FIFO
    Delivered(RxFrame),
    /// The FIFO is empty
    NoFrame,
    /// The FIFO was recovered; no frame this cycle
    Error(IoError),
}

impl RxOutcome {
    /// Check if a frame was read
    pub fn is_delivered(&self) -> bool {
        matches!(self, RxOutcome::Delivered(_))
    }
}

// =============================================================================
// Receive Path
// =============================================================================

impl<P: RegisterPort, D: DelayNs> Wemac<P, D> {
    /// Read at most one frame out of the RX FIFO
    ///
    /// An empty FIFO opens the completion gate and re-arms the interrupt
    /// mask, then the byte count is checked once more to catch a frame that
    /// landed in between. Framing problems flush the FIFO and report
    /// [`RxOutcome::Error`]; the caller should not retry in the same cycle.
    /// A driver that is not running reports [`RxOutcome::NoFrame`] without
    /// touching the hardware.
    pub fn drain_one(&mut self) -> RxOutcome {
        if self.state != State::Running {
            return RxOutcome::NoFrame;
        }

        if self.port.read32(RX_FBC) == 0 {
            self.rx_idle = true;
            self.arm_interrupts();
            if self.port.read32(RX_FBC) == 0 {
                return RxOutcome::NoFrame;
            }
        }

        let marker = self.port.read32(RX_IO_DATA);
        if marker != RX_MAGIC {
            #[cfg(feature = "defmt")]
            defmt::warn!("RX FIFO desync: marker {=u32:#x}", marker);

            self.stats.rx_framing_errors += 1;
            return RxOutcome::Error(self.recover_rx_fifo(IoError::FramingError));
        }

        let header = self.port.read32(RX_IO_DATA);
        let len = (header & RX_LEN_MASK) as usize;
        let status = (header >> RX_STATUS_SHIFT) as u16;

        if len == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("RX FIFO desync: zero length frame");

            self.stats.rx_framing_errors += 1;
            return RxOutcome::Error(self.recover_rx_fifo(IoError::FramingError));
        }
        if len > MAX_FRAME_LEN {
            #[cfg(feature = "defmt")]
            defmt::warn!("dropping oversized RX frame ({} bytes)", len);

            self.stats.rx_dropped += 1;
            return RxOutcome::Error(self.recover_rx_fifo(IoError::ResourceExhausted));
        }

        let mut frame = RxFrame::new(len, status);
        let units = len.div_ceil(2);
        for unit in frame.data[RX_PAD..RX_PAD + units * 2].chunks_exact_mut(2) {
            let value = self.port.read16(RX_IO_DATA);
            unit.copy_from_slice(&value.to_le_bytes());
        }

        self.stats.rx_packets += 1;
        RxOutcome::Delivered(frame)
    }

    /// Flush the RX FIFO back into a known state
    ///
    /// Receive is disabled for the duration of the flush. The wait for the
    /// flush bit to self-clear is bounded by the configured retry count.
    /// Returns `cause`, or [`IoError::FlushTimeout`] if the wait ran out.
    pub(super) fn recover_rx_fifo(&mut self, cause: IoError) -> IoError {
        self.port.clear_bits32(CTL, CTL_RX_EN);
        self.port.set_bits32(RX_CTL, RX_CTL_FLUSH);

        let mut cleared = false;
        for _ in 0..self.config.flush_timeout {
            if self.port.read32(RX_CTL) & RX_CTL_FLUSH == 0 {
                cleared = true;
                break;
            }
        }
        if !cleared {
            #[cfg(feature = "defmt")]
            defmt::warn!("RX FIFO flush did not complete");

            self.stats.rx_flush_timeouts += 1;
        }

        self.port.set_bits32(CTL, CTL_RX_EN);
        self.arm_interrupts();
        self.rx_idle = true;

        if cleared {
            cause
        } else {
            IoError::FlushTimeout
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
