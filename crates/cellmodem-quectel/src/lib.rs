//! Quectel backend for cellmodem.
//!
//! - **Command builders** ([`commands`]) -- GNSS, ring-indicator and TCP/IP
//!   command text, plus parsers for `+QIACT` and `+QIRD` replies and the GGA
//!   field layout.
//! - **Modem driver** ([`modem`]) -- [`QuectelModem`], the
//!   [`Modem`](cellmodem_at::Modem) implementation.
//!
//! # Example
//!
//! ```
//! use cellmodem_quectel::commands::{cmd_open_listener, cmd_read_socket};
//!
//! assert_eq!(cmd_open_listener(2020), "AT+QIOPEN=1,1,\"TCP LISTENER\",\"127.0.0.1\",0,2020,0");
//! assert_eq!(cmd_read_socket("1"), "AT+QIRD=1,1500");
//! ```

pub mod commands;
pub mod modem;

pub use modem::QuectelModem;
