//! Core data types shared by every cellmodem crate.
//!
//! These are the named records that flow between the AT engine, the vendor
//! drivers and the session loops: command responses, result codes, GNSS
//! fixes, socket payloads and SMS messages.

use std::fmt;

// ---------------------------------------------------------------------------
// ResultCode
// ---------------------------------------------------------------------------

/// Terminal result code that ends a command's response cycle.
///
/// The set is closed: a line terminates a response only if it matches one of
/// these tokens exactly once the line terminator has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    Connect,
    Ring,
    NoCarrier,
    Error,
    NoDialtone,
    Busy,
    NoAnswer,
}

impl ResultCode {
    /// Every result code, in the conventional numeric (`ATV0`) order.
    pub const ALL: [ResultCode; 8] = [
        ResultCode::Ok,
        ResultCode::Connect,
        ResultCode::Ring,
        ResultCode::NoCarrier,
        ResultCode::Error,
        ResultCode::NoDialtone,
        ResultCode::Busy,
        ResultCode::NoAnswer,
    ];

    /// The token the modem sends on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Ok => "OK",
            ResultCode::Connect => "CONNECT",
            ResultCode::Ring => "RING",
            ResultCode::NoCarrier => "NO CARRIER",
            ResultCode::Error => "ERROR",
            ResultCode::NoDialtone => "NO DIALTONE",
            ResultCode::Busy => "BUSY",
            ResultCode::NoAnswer => "NO ANSWER",
        }
    }

    /// Match a terminator-stripped line against the closed set.
    ///
    /// Matching is exact: `"OK "` or `"+CME ERROR: 10"` are not result codes.
    pub fn parse(line: &str) -> Option<ResultCode> {
        ResultCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == line)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// The structured reply to one AT command.
///
/// `result` is `None` only when the modem did not reply or no terminal line
/// arrived before the read timed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The first non-blank line, normally the modem's echo of the command.
    pub echo: String,
    /// Non-blank, non-terminal lines in arrival order, terminator removed.
    pub info: Vec<String>,
    /// The terminal result code, if one arrived.
    pub result: Option<ResultCode>,
}

impl Response {
    /// The "no reply" response: empty echo and info, no result.
    pub fn no_reply() -> Self {
        Response::default()
    }

    /// `true` if the response ended with `OK`.
    pub fn is_ok(&self) -> bool {
        self.result == Some(ResultCode::Ok)
    }

    /// The informational lines joined with `\n`.
    pub fn info_text(&self) -> String {
        self.info.join("\n")
    }

    /// The result as display text, `"no reply"` when absent.
    pub fn result_text(&self) -> &'static str {
        match self.result {
            Some(code) => code.as_str(),
            None => "no reply",
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.echo, self.result_text())?;
        for line in &self.info {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Vendor
// ---------------------------------------------------------------------------

/// The modem family a session is bound to.
///
/// Resolved once from the `ATI` identification text and fixed for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Quectel,
    Simcom,
    Huawei,
}

impl Vendor {
    /// Resolve the vendor from modem identification text.
    ///
    /// Matching is by substring against each vendor's marker, in the order
    /// Quectel, SIMCom, Huawei. Returns `None` for unrecognised modems.
    pub fn from_identification(ident: &str) -> Option<Vendor> {
        if ident.contains("Quectel") {
            Some(Vendor::Quectel)
        } else if ident.contains("SIMCOM") {
            Some(Vendor::Simcom)
        } else if ident.contains("Huawei") || ident.contains("HUAWEI") {
            Some(Vendor::Huawei)
        } else {
            None
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Quectel => write!(f, "Quectel"),
            Vendor::Simcom => write!(f, "SIMCom"),
            Vendor::Huawei => write!(f, "Huawei"),
        }
    }
}

// ---------------------------------------------------------------------------
// GNSS
// ---------------------------------------------------------------------------

/// Value of [`PositionFix::error`] for a successfully decoded fix.
pub const NO_ERROR: &str = "No Error";

/// One normalised positioning reading.
///
/// Every field is text exactly as decoded; an empty string means the modem
/// left the field blank or the vendor layout does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionFix {
    pub time: String,
    pub latitude: String,
    pub latitude_dir: String,
    pub longitude: String,
    pub longitude_dir: String,
    pub altitude: String,
    pub speed: String,
    pub true_course: String,
    pub date: String,
    pub error: String,
}

impl fmt::Display for PositionFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time: {}, latitude: {}({}), longitude: {}({}), altitude: {}, speed: {}, True Course: {}, Date: {}",
            self.time,
            self.latitude,
            self.latitude_dir,
            self.longitude,
            self.longitude_dir,
            self.altitude,
            self.speed,
            self.true_course,
            self.date
        )
    }
}

// ---------------------------------------------------------------------------
// TCP / SMS records
// ---------------------------------------------------------------------------

/// Address a TCP listener was started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAddress {
    pub ip: String,
    pub port: u16,
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Payload received on a listening socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundData {
    /// Modem socket id the data arrived on, when the vendor reports one.
    pub socket: Option<String>,
    /// Remote peer, when the vendor reports one.
    pub peer: Option<String>,
    pub payload: String,
}

/// A text-mode SMS read from modem storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub sender: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Workflow step records
// ---------------------------------------------------------------------------

/// A best-effort workflow step that did not end with `OK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: &'static str,
    pub command: String,
    pub result: Option<ResultCode>,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let got = match self.result {
            Some(code) => code.as_str(),
            None => "no reply",
        };
        write!(f, "Failed to {} ({}: {})", self.step, self.command, got)
    }
}

/// Record of one executed step of a multi-step workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: &'static str,
    pub command: String,
    pub response: Response,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.response.is_ok()
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.response)
    }
}
