//! The AT channel: line reader, response parser and command engine.
//!
//! [`AtChannel`] owns the transport exclusively. Every read and write goes
//! through `&mut self`, so a command can never be in flight while a receive
//! loop is consuming lines from the same stream.
//!
//! A command cycle writes `cmd\r`, treats the first non-blank line as the
//! echo, gathers information lines and stops at the first exact result code.
//! Timeouts are per read: a cycle that sees no terminal line reports
//! `result = None` rather than failing.

use std::time::Duration;

use tracing::{debug, trace, warn};

use cellmodem_core::error::{Error, Result};
use cellmodem_core::transport::Transport;
use cellmodem_core::types::Response;

use crate::protocol::{self, DecodeResult, LineKind};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timeouts applied by an [`AtChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtConfig {
    /// Timeout for a single line read inside a command cycle.
    pub command_timeout: Duration,
    /// Overall wait for an interactive reply such as the SMS `>` prompt.
    pub prompt_timeout: Duration,
}

impl Default for AtConfig {
    fn default() -> Self {
        AtConfig {
            command_timeout: Duration::from_secs(1),
            prompt_timeout: Duration::from_secs(10),
        }
    }
}

/// Lines longer than this are flushed as-is to bound buffer growth.
const MAX_LINE: usize = 4096;

// ---------------------------------------------------------------------------
// AtChannel
// ---------------------------------------------------------------------------

/// An AT command channel over an owned [`Transport`].
pub struct AtChannel {
    transport: Box<dyn Transport>,
    config: AtConfig,
    rx_buf: Vec<u8>,
}

impl AtChannel {
    /// Wrap a transport.
    pub fn new(transport: Box<dyn Transport>, config: AtConfig) -> Self {
        AtChannel {
            transport,
            config,
            rx_buf: Vec::new(),
        }
    }

    /// The timeouts this channel applies.
    pub fn config(&self) -> &AtConfig {
        &self.config
    }

    /// Issue a command and collect its response using the configured timeout.
    pub async fn execute(&mut self, cmd: &str) -> Result<Response> {
        let timeout = self.config.command_timeout;
        self.execute_with_timeout(cmd, timeout).await
    }

    /// Issue a command and collect its response.
    ///
    /// A write failure is returned as an error and never retried. A missing
    /// or non-OK result is returned as data; the caller decides whether it
    /// is fatal.
    pub async fn execute_with_timeout(&mut self, cmd: &str, timeout: Duration) -> Result<Response> {
        self.send_line(cmd).await?;
        let response = self.read_response(timeout).await?;
        debug!(
            command = cmd,
            result = response.result_text(),
            info_lines = response.info.len(),
            "AT command complete"
        );
        Ok(response)
    }

    /// Write a command line without collecting a response.
    pub async fn send_line(&mut self, cmd: &str) -> Result<()> {
        self.transport.send(&protocol::encode_command(cmd)).await
    }

    /// Write raw bytes, bypassing line framing (socket payloads, SMS bodies).
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!(bytes = data.len(), "writing raw payload");
        self.transport.send(data).await
    }

    /// Collect the response to a command that has just been written.
    ///
    /// 1. A blank or absent first line means "no reply".
    /// 2. The first non-blank line is the echo.
    /// 3. Lines are gathered until one is an exact result code; blank lines
    ///    are skipped.
    /// 4. If the stream goes quiet first, one more read is made for a
    ///    trailing result line.
    pub async fn read_response(&mut self, timeout: Duration) -> Result<Response> {
        let echo = match self.read_line(timeout).await? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(Response::no_reply()),
        };

        let mut response = Response {
            echo,
            ..Response::default()
        };

        while let Some(line) = self.read_line(timeout).await? {
            match protocol::classify_line(&line) {
                LineKind::Result(code) => {
                    response.result = Some(code);
                    return Ok(response);
                }
                LineKind::Blank => {}
                LineKind::Text => response.info.push(line),
            }
        }

        if let Some(line) = self.read_line(timeout).await? {
            match protocol::classify_line(&line) {
                LineKind::Result(code) => response.result = Some(code),
                LineKind::Blank => {}
                LineKind::Text => response.info.push(line),
            }
        }

        Ok(response)
    }

    /// Read one line, waiting up to `timeout` for each chunk of data.
    ///
    /// Returns `Ok(None)` if nothing arrived. If the read times out with a
    /// partial line buffered (a `> ` prompt has no terminator), the partial
    /// line is returned.
    pub async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        let mut chunk = [0u8; 256];

        loop {
            if let DecodeResult::Line { text, consumed } = protocol::decode_line(&self.rx_buf) {
                self.rx_buf.drain(..consumed);
                trace!(line = %text, "line received");
                return Ok(Some(text));
            }

            if self.rx_buf.len() > MAX_LINE {
                warn!(len = self.rx_buf.len(), "line buffer overflow, flushing");
                return Ok(Some(self.take_partial()));
            }

            match self.transport.receive(&mut chunk, timeout).await {
                Ok(0) => return Ok(self.flush_partial()),
                Ok(n) => self.rx_buf.extend_from_slice(&chunk[..n]),
                Err(Error::Timeout) => return Ok(self.flush_partial()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Read the next non-blank line, or `None` once the stream goes quiet.
    pub async fn next_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        while let Some(line) = self.read_line(timeout).await? {
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Block until a non-blank line arrives or the prompt timeout expires.
    pub async fn wait_for_reply(&mut self) -> Result<String> {
        let deadline = tokio::time::Instant::now() + self.config.prompt_timeout;
        let timeout = self.config.command_timeout;

        loop {
            if let Some(line) = self.read_line(timeout).await? {
                if !line.is_empty() {
                    return Ok(line);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Timeout);
            }
        }
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.rx_buf.clear();
        self.transport.close().await
    }

    /// Recover the transport, discarding any buffered bytes.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    fn flush_partial(&mut self) -> Option<String> {
        if self.rx_buf.is_empty() {
            None
        } else {
            Some(self.take_partial())
        }
    }

    fn take_partial(&mut self) -> String {
        let text = protocol::normalize_line(&self.rx_buf);
        self.rx_buf.clear();
        text
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
