//! Transport implementations for cellmodem.
//!
//! Cellular modules expose their AT interface as a USB virtual COM port
//! (`/dev/ttyUSB2` on most Quectel and SIMCom modules) or a UART.
//! [`SerialTransport`] implements the
//! [`Transport`](cellmodem_core::Transport) trait for both.
//!
//! # Example
//!
//! ```no_run
//! use cellmodem_transport::SerialTransport;
//! use cellmodem_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> cellmodem_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB2", 115_200).await?;
//! transport.send(b"ATI\r").await?;
//!
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{FlowControl, SerialConfig, SerialTransport};
