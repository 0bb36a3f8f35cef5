//! SIMCom backend for cellmodem.
//!
//! - **Command builders** ([`commands`]) -- GNSS and TCP/IP command text,
//!   the `+IPADDR` parser and the `+CGPSINFO` field layout.
//! - **Modem driver** ([`modem`]) -- [`SimcomModem`], the
//!   [`Modem`](cellmodem_at::Modem) implementation.

pub mod commands;
pub mod modem;

pub use modem::SimcomModem;
