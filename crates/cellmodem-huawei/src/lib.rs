//! Huawei backend for cellmodem.
//!
//! Huawei modules are supported for GNSS configuration only. Position
//! reads and every TCP operation return
//! [`Error::Unsupported`](cellmodem_core::Error::Unsupported).

pub mod commands;
pub mod modem;

pub use modem::HuaweiModem;
