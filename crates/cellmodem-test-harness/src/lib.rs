//! cellmodem-test-harness: test utilities for cellmodem.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the AT engine, vendor drivers and session loops without a modem attached.

pub mod mock_serial;

pub use mock_serial::MockTransport;
