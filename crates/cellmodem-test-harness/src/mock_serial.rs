//! Mock transport for deterministic testing of the AT engine.
//!
//! [`MockTransport`] is a [`Transport`] driven by a script of
//! request/response pairs plus an unsolicited-data queue. This lets you test
//! response parsing, vendor command sequences and URC-driven session loops
//! without a modem attached.
//!
//! # Example
//!
//! ```
//! use cellmodem_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the engine sends `AT+CSQ\r`, the modem echoes it and answers.
//! mock.expect_at("AT+CSQ", &["+CSQ: 20,99", "OK"]);
//! // A URC already waiting on the line before anything is sent.
//! mock.inject(b"\r\n+CMTI: \"SM\",3\r\n");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use cellmodem_core::error::{Error, Result};
use cellmodem_core::transport::Transport;

/// One scripted exchange.
#[derive(Debug, Clone)]
struct Expectation {
    /// Bytes the engine must write, byte for byte.
    request: Vec<u8>,
    /// The bytes made readable once the matching request is sent.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing without hardware.
///
/// Each `send()` is logged, then checked against the head of the script; a
/// match appends that exchange's reply to the read queue. Bytes queued
/// with [`inject`](MockTransport::inject) are readable immediately.
///
/// `receive()` returns [`Error::Timeout`] whenever the queue is empty, which
/// is how the engine observes "no more lines".
#[derive(Debug)]
pub struct MockTransport {
    /// Scripted exchanges, oldest first.
    expectations: VecDeque<Expectation>,
    /// Bytes waiting to be read.
    rx_queue: VecDeque<u8>,
    /// Chunks released one per timed-out read.
    delayed: VecDeque<Vec<u8>>,
    /// Cleared by `close()` or `set_connected(false)`.
    connected: bool,
    /// Every `send()` payload, in order.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// An empty, connected mock.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            rx_queue: VecDeque::new(),
            delayed: VecDeque::new(),
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Script one exchange: once `request` is written, `response` can be read.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Expect an AT command and reply the way a modem with echo enabled does.
    ///
    /// The request is `command` plus `\r`. The reply is the echo
    /// (`command\r\r\n`) followed by each of `lines` framed as
    /// `\r\n<line>\r\n`. Put the result code (e.g. `"OK"`) last; omit it to
    /// simulate a command that never terminates.
    pub fn expect_at(&mut self, command: &str, lines: &[&str]) {
        let mut response = format!("{command}\r\r\n");
        for line in lines {
            response.push_str("\r\n");
            response.push_str(line);
            response.push_str("\r\n");
        }
        self.expect(format!("{command}\r").as_bytes(), response.as_bytes());
    }

    /// Queue bytes that are readable without any request being sent.
    pub fn inject(&mut self, data: &[u8]) {
        self.rx_queue.extend(data.iter().copied());
    }

    /// Queue bytes that only become readable after the read queue has run
    /// dry once: the next empty `receive()` times out and releases them.
    /// Models a result line that arrives after a pause.
    pub fn inject_after_timeout(&mut self, data: &[u8]) {
        self.delayed.push_back(data.to_vec());
    }

    /// Queue one unsolicited line framed as `\r\n<line>\r\n`.
    pub fn inject_line(&mut self, line: &str) {
        self.inject(format!("\r\n{line}\r\n").as_bytes());
    }

    /// Everything written so far, one entry per `send()`.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Scripted exchanges not yet reached.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Return the number of bytes still waiting to be read.
    pub fn unread_len(&self) -> usize {
        self.rx_queue.len()
    }

    /// Simulate the port going away: while `false`, every call fails with
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:?}, got {:?}",
                    String::from_utf8_lossy(&expectation.request),
                    String::from_utf8_lossy(data)
                )));
            }
            self.rx_queue.extend(expectation.response);
            Ok(())
        } else {
            Err(Error::Protocol(format!(
                "no more expectations in mock transport (sent {:?})",
                String::from_utf8_lossy(data)
            )))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if self.rx_queue.is_empty() {
            if let Some(chunk) = self.delayed.pop_front() {
                self.rx_queue.extend(chunk);
            }
            return Err(Error::Timeout);
        }

        let n = self.rx_queue.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx_queue.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.rx_queue.clear();
        self.delayed.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
