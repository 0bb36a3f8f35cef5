//! Error types for cellmodem.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Only failures that cannot be expressed as
//! data end up here: a command that merely timed out or returned a non-OK
//! result code is reported through [`Response::result`](crate::types::Response)
//! and only becomes an [`Error`] when a call site decides it is fatal.

use crate::types::ResultCode;

/// The error type for all cellmodem operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open, write or read failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// The modem sent something that does not fit the AT line protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a reply the caller needs (e.g. an SMS prompt).
    #[error("timeout waiting for response")]
    Timeout,

    /// A command the caller cannot continue without did not return `OK`.
    #[error("command {command} failed: {}", describe_result(.result))]
    CommandFailed {
        /// The AT command text that was issued.
        command: String,
        /// The terminal result code, or `None` if the modem did not reply.
        result: Option<ResultCode>,
    },

    /// A named step of a multi-step workflow failed.
    #[error("{step} failed ({command}: expected OK, got {})", describe_result(.result))]
    StepFailed {
        /// Human-readable step name (e.g. "start TCP listener").
        step: &'static str,
        /// The AT command text that was issued.
        command: String,
        /// The terminal result code, or `None` if the modem did not reply.
        result: Option<ResultCode>,
    },

    /// A payload (GNSS, SMS, socket read) could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// The modem identification matches no supported vendor.
    #[error("unsupported modem: {0}")]
    UnsupportedDevice(String),

    /// The bound vendor does not implement the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to an operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the modem has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the modem was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_result(result: &Option<ResultCode>) -> String {
    match result {
        Some(code) => code.to_string(),
        None => "no reply".to_string(),
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn error_display_command_failed() {
        let e = Error::CommandFailed {
            command: "AT+CGPSINFO".into(),
            result: Some(ResultCode::Error),
        };
        assert_eq!(e.to_string(), "command AT+CGPSINFO failed: ERROR");
    }

    #[test]
    fn error_display_command_no_reply() {
        let e = Error::CommandFailed {
            command: "AT+QGPSGNMEA=\"GGA\"".into(),
            result: None,
        };
        assert_eq!(
            e.to_string(),
            "command AT+QGPSGNMEA=\"GGA\" failed: no reply"
        );
    }

    #[test]
    fn error_display_step_failed() {
        let e = Error::StepFailed {
            step: "start TCP listener",
            command: "AT+SERVERSTART=2020,0".into(),
            result: Some(ResultCode::NoCarrier),
        };
        assert_eq!(
            e.to_string(),
            "start TCP listener failed (AT+SERVERSTART=2020,0: expected OK, got NO CARRIER)"
        );
    }

    #[test]
    fn error_display_decode() {
        let e = Error::Decode("Invalid GNSS data".into());
        assert_eq!(e.to_string(), "Invalid GNSS data");
    }

    #[test]
    fn error_display_unsupported_device() {
        let e = Error::UnsupportedDevice("Acme Modem 3000".into());
        assert_eq!(e.to_string(), "unsupported modem: Acme Modem 3000");
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
