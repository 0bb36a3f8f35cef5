//! SMS send and receive in text mode.
//!
//! Both directions are vendor-neutral and work directly on an
//! [`AtChannel`].
//!
//! Receiving waits for `+CMTI: "<mem>",<slot>` and reads exactly that slot
//! with `AT+CMGR`. Sending is a linear exchange:
//!
//! ```text
//! > AT+CMGF=1
//! > AT+CMGS="<number>"
//! < >
//! > <text><Ctrl-Z>
//! < +CMGS: <ref>
//! < OK
//! ```

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cellmodem_at::modem::execute_best_effort;
use cellmodem_at::protocol::{self, LineKind, CTRL_Z};
use cellmodem_at::{AtChannel, Urc, UrcClassifier};
use cellmodem_core::delay::Delay;
use cellmodem_core::error::{Error, Result};
use cellmodem_core::events::ModemEvent;
use cellmodem_core::types::{ResultCode, SmsMessage, StepFailure};

use crate::pause;
use crate::timing::SessionTiming;

pub fn cmd_text_mode() -> String {
    "AT+CMGF=1".to_string()
}

/// Show full header values in text-mode results.
pub fn cmd_show_header() -> String {
    "AT+CSDH=1".to_string()
}

pub fn cmd_read(slot: &str) -> String {
    format!("AT+CMGR={slot}")
}

pub fn cmd_send(number: &str) -> String {
    format!("AT+CMGS=\"{number}\"")
}

/// Decode the information lines of an `AT+CMGR` reply.
///
/// The sender is field 1 of the `+CMGR:` header; the body is every line
/// after the header joined with `\n`.
pub fn parse_message(info: &[String]) -> Result<SmsMessage> {
    let header = info
        .iter()
        .position(|line| line.starts_with("+CMGR:"))
        .ok_or_else(|| Error::Decode("SMS reply has no +CMGR header".into()))?;
    let sender = protocol::field(&info[header], 1)
        .ok_or_else(|| Error::Decode(format!("SMS header has no sender: {}", info[header])))?;

    Ok(SmsMessage {
        sender: sender.to_string(),
        body: info[header + 1..].join("\n"),
    })
}

// ---------------------------------------------------------------------------
// Receive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsState {
    Idle,
    MessageArrived,
}

/// Waits for new-message notifications and reads each message once.
pub struct SmsReceiver {
    state: SmsState,
    urcs: UrcClassifier,
    delay: Arc<dyn Delay>,
    timing: SessionTiming,
}

impl SmsReceiver {
    pub fn new(delay: Arc<dyn Delay>, timing: SessionTiming) -> Self {
        SmsReceiver {
            state: SmsState::Idle,
            urcs: UrcClassifier::new(),
            delay,
            timing,
        }
    }

    pub fn state(&self) -> SmsState {
        self.state
    }

    /// Switch to text mode with full headers. Failures are warnings.
    pub async fn start(&mut self, channel: &mut AtChannel) -> Result<Vec<StepFailure>> {
        let mut warnings = Vec::new();
        execute_best_effort(channel, "select SMS text mode", &cmd_text_mode(), &mut warnings)
            .await?;
        execute_best_effort(channel, "show SMS header values", &cmd_show_header(), &mut warnings)
            .await?;
        Ok(warnings)
    }

    /// Read one line; on a new-message notification fetch that message.
    pub async fn step(&mut self, channel: &mut AtChannel) -> Result<Option<ModemEvent>> {
        let timeout = channel.config().command_timeout;
        let Some(line) = channel.next_line(timeout).await? else {
            return Ok(None);
        };
        let Some(Urc::IncomingSms { storage, slot }) = self.urcs.classify(&line) else {
            debug!(%line, "ignoring line");
            return Ok(None);
        };

        debug!(%storage, %slot, "new SMS");
        self.state = SmsState::MessageArrived;
        let response = channel.execute(&cmd_read(&slot)).await;
        self.state = SmsState::Idle;
        let response = response?;

        if !response.is_ok() {
            return Ok(Some(ModemEvent::SmsError(format!(
                "failed to read SMS slot {slot}: {}",
                response.result_text()
            ))));
        }
        Ok(Some(match parse_message(&response.info) {
            Ok(message) => ModemEvent::Sms(message),
            Err(e) => ModemEvent::SmsError(e.to_string()),
        }))
    }

    /// Poll until `cancel` fires.
    pub async fn run(
        &mut self,
        channel: &mut AtChannel,
        cancel: &CancellationToken,
        on_event: &mut (dyn FnMut(ModemEvent) + Send),
    ) -> Result<()> {
        while !cancel.is_cancelled() {
            if let Some(event) = self.step(channel).await? {
                on_event(event);
            }
            if !pause(&*self.delay, self.timing.sms_poll, cancel).await {
                break;
            }
        }
        debug!("SMS receive stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Send
// ---------------------------------------------------------------------------

/// What the modem answered while sending a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsSendReport {
    /// The interactive prompt (normally `> `).
    pub prompt: String,
    /// Message reference from `+CMGS: <ref>`, if reported.
    pub reference: Option<String>,
    pub result: ResultCode,
}

impl fmt::Display for SmsSendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "{} (reference {reference})", self.result),
            None => write!(f, "{}", self.result),
        }
    }
}

/// Send `text` to `number`.
///
/// Each wait is bounded by the channel's prompt timeout; a modem that never
/// prompts or never answers yields [`Error::Timeout`].
pub async fn send_sms(channel: &mut AtChannel, number: &str, text: &str) -> Result<SmsSendReport> {
    if number.is_empty() {
        return Err(Error::InvalidParameter("SMS destination number is empty".into()));
    }

    let response = channel.execute(&cmd_text_mode()).await?;
    debug!(result = response.result_text(), "text mode");

    let cmd = cmd_send(number);
    channel.send_line(&cmd).await?;
    let mut prompt = channel.wait_for_reply().await?;
    if prompt == cmd {
        // Echo of the command; the prompt follows.
        prompt = channel.wait_for_reply().await?;
    }
    debug!(%prompt, "SMS prompt");

    let mut body = Vec::with_capacity(text.len() + 1);
    body.extend_from_slice(text.as_bytes());
    body.push(CTRL_Z);
    channel.write_raw(&body).await?;

    let mut reference = None;
    loop {
        let line = channel.wait_for_reply().await?;
        match protocol::classify_line(&line) {
            LineKind::Result(result) => {
                info!(%number, %result, "SMS sent");
                return Ok(SmsSendReport {
                    prompt,
                    reference,
                    result,
                });
            }
            _ if line.starts_with("+CMGS:") => {
                reference = Some(protocol::after_keyword(&line).to_string());
            }
            _ => debug!(%line, "SMS send output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::no_delay;
    use cellmodem_at::AtConfig;
    use cellmodem_test_harness::MockTransport;
    use std::time::Duration;

    fn channel(mock: MockTransport) -> AtChannel {
        AtChannel::new(Box::new(mock), AtConfig::default())
    }

    fn receiver() -> SmsReceiver {
        SmsReceiver::new(no_delay(), SessionTiming::immediate())
    }

    #[test]
    fn parse_message_sender_and_multiline_body() {
        let info = vec![
            "+CMGR: \"REC UNREAD\",\"+15551234567\",\"\",\"24/05/01,10:00:00+00\",145,4,0,0,\"+15550000000\",145,11".to_string(),
            "hello".to_string(),
            "world".to_string(),
        ];
        let message = parse_message(&info).unwrap();
        assert_eq!(message.sender, "+15551234567");
        assert_eq!(message.body, "hello\nworld");
    }

    #[test]
    fn parse_message_without_header_is_decode_error() {
        let err = parse_message(&["hello".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn start_selects_text_mode_with_headers() {
        let mut mock = MockTransport::new();
        mock.expect_at("AT+CMGF=1", &["OK"]);
        mock.expect_at("AT+CSDH=1", &["ERROR"]);

        let mut at = channel(mock);
        let warnings = receiver().start(&mut at).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].command, "AT+CSDH=1");
    }

    #[tokio::test]
    async fn cmti_triggers_exactly_one_read_of_that_slot() {
        let mut mock = MockTransport::new();
        mock.inject_line("+CMTI: \"SM\",7");
        mock.expect_at(
            "AT+CMGR=7",
            &["+CMGR: \"REC UNREAD\",\"+15551234567\",,\"24/05/01,10:00:00+00\"", "ping", "OK"],
        );

        let mut at = channel(mock);
        let mut rx = receiver();
        let event = rx.step(&mut at).await.unwrap();
        assert_eq!(
            event,
            Some(ModemEvent::Sms(SmsMessage {
                sender: "+15551234567".into(),
                body: "ping".into()
            }))
        );
        assert_eq!(rx.state(), SmsState::Idle);
        // Nothing else pending, no further reads.
        assert_eq!(rx.step(&mut at).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_read_is_reported_as_event() {
        let mut mock = MockTransport::new();
        mock.inject_line("+CMTI: \"SM\",2");
        mock.expect_at("AT+CMGR=2", &["ERROR"]);

        let mut at = channel(mock);
        let event = receiver().step(&mut at).await.unwrap();
        assert_eq!(
            event,
            Some(ModemEvent::SmsError("failed to read SMS slot 2: ERROR".into()))
        );
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let mut mock = MockTransport::new();
        mock.inject_line("RING");
        mock.inject_line("+CMTI: \"ME\",1");
        mock.expect_at("AT+CMGR=1", &["+CMGR: \"REC UNREAD\",\"+100\"", "hi", "OK"]);

        let mut at = channel(mock);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let mut messages = Vec::new();
        let mut sink = |event: ModemEvent| {
            if let ModemEvent::Sms(message) = event {
                messages.push(message);
                stop.cancel();
            }
        };
        receiver().run(&mut at, &cancel, &mut sink).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, "+100");
    }

    #[tokio::test]
    async fn send_sms_full_exchange() {
        let mut mock = MockTransport::new();
        mock.expect_at("AT+CMGF=1", &["OK"]);
        mock.expect(b"AT+CMGS=\"+15551234567\"\r", b"AT+CMGS=\"+15551234567\"\r\r\n> ");
        mock.expect(b"hi there\x1a", b"hi there\r\n+CMGS: 42\r\n\r\nOK\r\n");

        let mut at = channel(mock);
        let report = send_sms(&mut at, "+15551234567", "hi there").await.unwrap();
        assert_eq!(report.prompt, "> ");
        assert_eq!(report.reference.as_deref(), Some("42"));
        assert_eq!(report.result, ResultCode::Ok);
        assert_eq!(report.to_string(), "OK (reference 42)");
    }

    #[tokio::test]
    async fn send_sms_without_prompt_times_out() {
        let mut mock = MockTransport::new();
        mock.expect_at("AT+CMGF=1", &["OK"]);
        mock.expect(b"AT+CMGS=\"123\"\r", b"");

        let config = AtConfig {
            command_timeout: Duration::from_millis(1),
            prompt_timeout: Duration::from_millis(20),
        };
        let mut at = AtChannel::new(Box::new(mock), config);
        let err = send_sms(&mut at, "123", "x").await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn send_sms_rejects_empty_number_before_any_io() {
        let mut at = channel(MockTransport::new());
        let err = send_sms(&mut at, "", "x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }
}
