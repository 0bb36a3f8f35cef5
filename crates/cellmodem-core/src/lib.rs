//! cellmodem-core: core traits, types and error definitions for cellmodem.
//!
//! This crate defines the vendor-agnostic pieces every other crate builds
//! on. It performs no I/O itself.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Response`] / [`ResultCode`] -- the structured reply to one AT command
//! - [`PositionFix`] and the [`gnss`] field decoder
//! - [`Delay`] -- injected sleep for polling loops
//! - [`Error`] / [`Result`] -- error handling

pub mod delay;
pub mod error;
pub mod events;
pub mod gnss;
pub mod transport;
pub mod types;

pub use delay::{Delay, NoDelay, TokioDelay};
pub use error::{Error, Result};
pub use events::ModemEvent;
pub use gnss::GnssLayout;
pub use transport::Transport;
pub use types::*;
