//! External Stack Integrations
//!
//! - **smoltcp** (`smoltcp`): Integration with the smoltcp TCP/IP network stack
//!   - Frame queues implementing both the driver's `NetworkStack` and
//!     `smoltcp::phy::Device`
//!   - Requires `smoltcp` feature
//!
//! # Example
//!
//! ```ignore
//! use a10_wemac::integration::smoltcp::SmoltcpStack;
//! use smoltcp::phy::Device;
//!
//! let mut stack: SmoltcpStack<4, 4> = SmoltcpStack::new();
//! WEMAC.on_interrupt(&mut stack);
//! let (rx, tx) = stack.receive(Instant::ZERO).unwrap();
//! ```

#[cfg(feature = "smoltcp")]
pub mod smoltcp;

#[cfg(feature = "smoltcp")]
pub use smoltcp::{SmoltcpStack, TxBuffer, WemacRxToken, WemacTxToken, ethernet_address};
