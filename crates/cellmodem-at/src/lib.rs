//! AT command engine for cellmodem.
//!
//! This crate sits between the byte-level [`Transport`](cellmodem_core::Transport)
//! and the vendor drivers. It provides:
//!
//! - **Line protocol** ([`protocol`]) -- command encoding, line framing and
//!   result-code classification.
//! - **Command engine** ([`io`]) -- [`AtChannel`], which writes a command and
//!   parses the echo / information / result-code reply.
//! - **URC classifier** ([`urc`]) -- ordered table of unsolicited
//!   notification markers with identifier capture.
//! - **Capability trait** ([`modem`]) -- the [`Modem`] interface each vendor
//!   crate implements, plus the workflow helpers they share.
//!
//! # Example
//!
//! ```
//! use cellmodem_at::protocol::{classify_line, decode_line, DecodeResult, LineKind};
//! use cellmodem_core::ResultCode;
//!
//! if let DecodeResult::Line { text, consumed } = decode_line(b"OK\r\n") {
//!     assert_eq!(consumed, 4);
//!     assert_eq!(classify_line(&text), LineKind::Result(ResultCode::Ok));
//! }
//! ```

pub mod io;
pub mod modem;
pub mod protocol;
pub mod urc;

pub use io::{AtChannel, AtConfig};
pub use modem::{Modem, Pacing};
pub use urc::{Urc, UrcClassifier, UrcKind, UrcPattern};
