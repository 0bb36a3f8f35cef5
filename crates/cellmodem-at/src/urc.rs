//! Unsolicited result code (URC) classification.
//!
//! Modems interleave notifications such as `+CMTI: "SM",3` with command
//! replies. Receive loops read raw lines and ask a [`UrcClassifier`] whether a
//! line is a notification they care about. The classifier is an ordered table
//! of markers; the first pattern that matches wins and captures the
//! identifier the session needs for its follow-up command.

use std::fmt;

use crate::protocol;

/// Marker for a new SMS stored on the modem.
pub const INCOMING_SMS: &str = "+CMTI:";

/// Quectel: data is waiting on a socket.
pub const QUECTEL_SOCKET_RECV: &str = "+QIURC: \"recv\"";

/// Quectel: a socket was closed by the peer.
pub const QUECTEL_SOCKET_CLOSED: &str = "+QIURC: \"closed\"";

/// SIMCom: a peer sent data to the listening socket.
pub const SIMCOM_RECV_FROM: &str = "RECV FROM:";

/// A classified notification together with its captured identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Urc {
    /// Data is ready on a modem socket.
    SocketData { socket: String },
    /// A modem socket was closed.
    SocketClosed { socket: String },
    /// Data arrived from a remote peer (`ip:port`); the payload follows.
    PeerData { peer: String },
    /// A new SMS was stored in `storage` at index `slot`.
    IncomingSms { storage: String, slot: String },
}

impl fmt::Display for Urc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urc::SocketData { socket } => write!(f, "data on socket {socket}"),
            Urc::SocketClosed { socket } => write!(f, "socket {socket} closed"),
            Urc::PeerData { peer } => write!(f, "data from {peer}"),
            Urc::IncomingSms { storage, slot } => write!(f, "SMS in {storage} slot {slot}"),
        }
    }
}

/// How a marker is located in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The line starts with the marker.
    Prefix,
    /// The marker appears anywhere in the line.
    Contains,
}

/// Which [`Urc`] a pattern produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrcKind {
    /// `<marker>,<socket>`
    SocketData,
    /// `<marker>,<socket>`
    SocketClosed,
    /// `<marker><peer>`
    PeerData,
    /// `<marker> "<storage>",<slot>`
    IncomingSms,
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrcPattern {
    pub marker: &'static str,
    pub matcher: Matcher,
    pub kind: UrcKind,
}

impl UrcPattern {
    pub const fn prefix(marker: &'static str, kind: UrcKind) -> Self {
        UrcPattern {
            marker,
            matcher: Matcher::Prefix,
            kind,
        }
    }

    pub const fn contains(marker: &'static str, kind: UrcKind) -> Self {
        UrcPattern {
            marker,
            matcher: Matcher::Contains,
            kind,
        }
    }

    /// Text following the marker, or `None` if the line does not match.
    fn rest<'a>(&self, line: &'a str) -> Option<&'a str> {
        match self.matcher {
            Matcher::Prefix => line.strip_prefix(self.marker),
            Matcher::Contains => line
                .find(self.marker)
                .map(|at| &line[at + self.marker.len()..]),
        }
    }

    fn capture(&self, line: &str) -> Option<Urc> {
        let rest = self.rest(line)?;
        let urc = match self.kind {
            UrcKind::SocketData => Urc::SocketData {
                socket: protocol::field(rest, 1)?.to_string(),
            },
            UrcKind::SocketClosed => Urc::SocketClosed {
                socket: protocol::field(rest, 1)?.to_string(),
            },
            UrcKind::PeerData => Urc::PeerData {
                peer: rest.trim().to_string(),
            },
            UrcKind::IncomingSms => Urc::IncomingSms {
                storage: protocol::field(rest, 0)?.to_string(),
                slot: protocol::field(rest, 1)?.to_string(),
            },
        };
        Some(urc)
    }
}

/// Ordered URC pattern table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrcClassifier {
    patterns: Vec<UrcPattern>,
}

impl UrcClassifier {
    /// A classifier that knows only the vendor-neutral SMS notification.
    pub fn new() -> Self {
        UrcClassifier::default().with(UrcPattern::prefix(INCOMING_SMS, UrcKind::IncomingSms))
    }

    /// Append a pattern. Earlier patterns take precedence.
    pub fn with(mut self, pattern: UrcPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn patterns(&self) -> &[UrcPattern] {
        &self.patterns
    }

    /// Classify one terminator-stripped line.
    ///
    /// A line whose marker matches but whose identifier is missing is not a
    /// notification.
    pub fn classify(&self, line: &str) -> Option<Urc> {
        self.patterns
            .iter()
            .find(|p| p.rest(line).is_some())
            .and_then(|p| p.capture(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> UrcClassifier {
        UrcClassifier::new()
            .with(UrcPattern::prefix(QUECTEL_SOCKET_RECV, UrcKind::SocketData))
            .with(UrcPattern::prefix(QUECTEL_SOCKET_CLOSED, UrcKind::SocketClosed))
            .with(UrcPattern::contains(SIMCOM_RECV_FROM, UrcKind::PeerData))
    }

    #[test]
    fn classify_incoming_sms() {
        let urc = UrcClassifier::new().classify("+CMTI: \"SM\",3");
        assert_eq!(
            urc,
            Some(Urc::IncomingSms {
                storage: "SM".into(),
                slot: "3".into()
            })
        );
    }

    #[test]
    fn classify_quectel_socket_data() {
        assert_eq!(
            full().classify("+QIURC: \"recv\",11"),
            Some(Urc::SocketData { socket: "11".into() })
        );
    }

    #[test]
    fn classify_quectel_socket_closed() {
        assert_eq!(
            full().classify("+QIURC: \"closed\",2"),
            Some(Urc::SocketClosed { socket: "2".into() })
        );
    }

    #[test]
    fn classify_simcom_peer_data() {
        assert_eq!(
            full().classify("RECV FROM:10.170.12.9:50412"),
            Some(Urc::PeerData {
                peer: "10.170.12.9:50412".into()
            })
        );
    }

    #[test]
    fn contains_matches_mid_line() {
        assert_eq!(
            full().classify("+CIPRXGET: 1 RECV FROM:1.2.3.4:80"),
            Some(Urc::PeerData {
                peer: "1.2.3.4:80".into()
            })
        );
    }

    #[test]
    fn unmatched_lines_are_not_notifications() {
        let c = full();
        assert_eq!(c.classify(""), None);
        assert_eq!(c.classify("OK"), None);
        assert_eq!(c.classify("+CSQ: 20,99"), None);
        // Prefix matching is anchored.
        assert_eq!(c.classify("x+CMTI: \"SM\",1"), None);
    }

    #[test]
    fn marker_without_identifier_is_ignored() {
        assert_eq!(full().classify("+CMTI: \"SM\""), None);
        assert_eq!(full().classify("+QIURC: \"recv\""), None);
    }

    #[test]
    fn first_pattern_wins() {
        let c = UrcClassifier::default()
            .with(UrcPattern::contains("+QIURC:", UrcKind::SocketClosed))
            .with(UrcPattern::prefix(QUECTEL_SOCKET_RECV, UrcKind::SocketData));
        assert_eq!(
            c.classify("+QIURC: \"recv\",0"),
            Some(Urc::SocketClosed { socket: "0".into() })
        );
    }

    #[test]
    fn vendor_neutral_classifier_ignores_socket_urcs() {
        assert_eq!(UrcClassifier::new().classify("+QIURC: \"recv\",0"), None);
        assert_eq!(UrcClassifier::new().patterns().len(), 1);
    }
}
