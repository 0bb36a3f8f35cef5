//! Fluent builder for opening a modem AT channel.
//!
//! [`ModemBuilder`] collects the port and timing settings, opens the serial
//! transport and wraps it in an [`AtChannel`]. Vendor identification is a
//! separate step (see [`identify`](crate::identify)) because it needs the
//! open channel.
//!
//! # Example
//!
//! ```no_run
//! use cellmodem::ModemBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> cellmodem::Result<()> {
//! let mut channel = ModemBuilder::new()
//!     .serial_port("/dev/ttyUSB2")
//!     .command_timeout(Duration::from_millis(1500))
//!     .open()
//!     .await?;
//! let ident = cellmodem::identify(&mut channel).await?;
//! println!("{}", ident.text);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use cellmodem_at::{AtChannel, AtConfig, Pacing};
use cellmodem_core::delay::Delay;
use cellmodem_core::error::{Error, Result};
use cellmodem_core::transport::Transport;
use cellmodem_session::timing::tokio_delay;
use cellmodem_session::SessionTiming;
use cellmodem_transport::serial::DEFAULT_BAUD_RATE;
use cellmodem_transport::SerialTransport;

/// Builder for a modem connection.
pub struct ModemBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    command_timeout: Duration,
    prompt_timeout: Duration,
    timing: SessionTiming,
    delay: Arc<dyn Delay>,
}

impl ModemBuilder {
    /// Defaults: 115200 baud, 1 s per command, 10 s for prompts, production
    /// session timing.
    pub fn new() -> Self {
        let at = AtConfig::default();
        ModemBuilder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            command_timeout: at.command_timeout,
            prompt_timeout: at.prompt_timeout,
            timing: SessionTiming::default(),
            delay: tokio_delay(),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB2`). Required for
    /// [`open()`](Self::open).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// How long one command waits for each line of its reply.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// How long an interactive command (e.g. SMS send) waits for its prompt.
    pub fn prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = timeout;
        self
    }

    /// Override the session poll intervals and settle delays.
    pub fn timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Replace the sleep source used by sessions and vendor workflows.
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn session_timing(&self) -> &SessionTiming {
        &self.timing
    }

    pub fn delay_source(&self) -> Arc<dyn Delay> {
        Arc::clone(&self.delay)
    }

    /// Workflow pacing for the vendor drivers.
    pub fn pacing(&self) -> Pacing {
        self.timing.pacing(self.delay_source())
    }

    fn at_config(&self) -> AtConfig {
        AtConfig {
            command_timeout: self.command_timeout,
            prompt_timeout: self.prompt_timeout,
        }
    }

    /// Wrap a caller-supplied transport. Used with `MockTransport` in tests.
    pub fn build_with_transport(&self, transport: Box<dyn Transport>) -> AtChannel {
        AtChannel::new(transport, self.at_config())
    }

    /// Open the configured serial port.
    pub async fn open(&self) -> Result<AtChannel> {
        let port = self.serial_port.as_deref().ok_or_else(|| {
            Error::InvalidParameter("serial_port is required for open()".into())
        })?;
        let transport = SerialTransport::open(port, self.baud_rate).await?;
        Ok(self.build_with_transport(Box::new(transport)))
    }
}

impl Default for ModemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmodem_test_harness::MockTransport;

    #[test]
    fn defaults() {
        let b = ModemBuilder::new();
        assert!(b.serial_port.is_none());
        assert_eq!(b.baud_rate, 115_200);
        assert_eq!(b.command_timeout, Duration::from_secs(1));
        assert_eq!(b.prompt_timeout, Duration::from_secs(10));
        assert_eq!(b.session_timing(), &SessionTiming::default());
    }

    #[test]
    fn fluent_setters() {
        let b = ModemBuilder::new()
            .serial_port("/dev/ttyACM0")
            .baud_rate(9600)
            .command_timeout(Duration::from_millis(250))
            .prompt_timeout(Duration::from_secs(3))
            .timing(SessionTiming::immediate());
        assert_eq!(b.serial_port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(b.baud_rate, 9600);
        assert_eq!(b.at_config().command_timeout, Duration::from_millis(250));
        assert_eq!(b.at_config().prompt_timeout, Duration::from_secs(3));
        assert_eq!(b.pacing().open_settle, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn default_delay_sleeps_on_tokio_clock() {
        let delay = ModemBuilder::new().delay_source();
        let start = tokio::time::Instant::now();
        delay.sleep(Duration::from_secs(3)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn open_requires_port() {
        let result = ModemBuilder::new().open().await;
        match result {
            Err(Error::InvalidParameter(msg)) => assert!(msg.contains("serial_port")),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("open() without a port succeeded"),
        }
    }

    #[tokio::test]
    async fn build_with_transport_applies_timeouts() {
        let channel = ModemBuilder::new()
            .command_timeout(Duration::from_millis(300))
            .build_with_transport(Box::new(MockTransport::new()));
        assert_eq!(channel.config().command_timeout, Duration::from_millis(300));
    }
}
