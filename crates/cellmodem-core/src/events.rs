//! Events surfaced by the session loops.
//!
//! Long-running sessions (GNSS polling, TCP receive, SMS receive) hand each
//! result to a caller-supplied sink as a [`ModemEvent`], which keeps
//! presentation out of the state machines.

use crate::types::{InboundData, LocalAddress, PositionFix, SmsMessage, StepFailure};

/// An observable outcome of a session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemEvent {
    /// A best-effort configuration step did not return `OK`.
    Warning(StepFailure),

    /// A GNSS reading was decoded.
    Position(PositionFix),

    /// A GNSS reading failed; the text says why.
    PositionError(String),

    /// A TCP listener is accepting connections.
    Listening(LocalAddress),

    /// Data arrived on a listening socket.
    Data(InboundData),

    /// A socket was closed by the peer or the modem.
    SocketClosed {
        /// Modem socket id.
        socket: String,
    },

    /// An SMS was read from storage.
    Sms(SmsMessage),

    /// An incoming SMS could not be read; the text says why.
    SmsError(String),
}
