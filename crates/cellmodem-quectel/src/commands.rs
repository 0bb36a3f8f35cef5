//! Quectel AT command builders and response parsers.
//!
//! All functions are pure: they produce command text or pick fields out of
//! already-parsed information lines. The driver in [`crate::modem`] sends
//! them through an [`AtChannel`](cellmodem_at::AtChannel).
//!
//! # Quectel command reference
//!
//! Based on the EC2x/EG9x GNSS and TCP/IP application notes. Socket 0 is
//! used for outgoing connections, socket 1 for the listener, and PDP
//! context 1 for both.

use cellmodem_at::protocol;
use cellmodem_at::urc::{self, UrcClassifier, UrcKind, UrcPattern};
use cellmodem_core::gnss::GnssLayout;

/// Socket id of the outgoing connection.
pub const CLIENT_SOCKET: u8 = 0;

/// Socket id of the TCP listener.
pub const LISTENER_SOCKET: u8 = 1;

/// Maximum bytes fetched per `AT+QIRD`.
pub const READ_CHUNK: usize = 1500;

/// Field positions in a `+QGPSGNMEA: $GPGGA,...` sentence.
///
/// GGA carries neither speed over ground nor the date.
pub const GGA_LAYOUT: GnssLayout = GnssLayout {
    time: Some(1),
    latitude: Some(2),
    latitude_dir: Some(3),
    longitude: Some(4),
    longitude_dir: Some(5),
    altitude: Some(9),
    speed: None,
    true_course: Some(11),
    date: None,
};

// ---------------------------------------------------------------
// Ring indicator
// ---------------------------------------------------------------

/// Drive RI on the physical pin.
pub fn cmd_ri_signal_type() -> String {
    "AT+QCFG=\"risignaltype\",\"physical\"".to_string()
}

/// Pulse RI for 200 ms when an SMS notification is presented.
pub fn cmd_ri_sms_incoming() -> String {
    "AT+QCFG=\"urc/ri/smsincoming\",\"pulse\",200".to_string()
}

// ---------------------------------------------------------------
// GNSS
// ---------------------------------------------------------------

pub fn cmd_gnss_off() -> String {
    "AT+QGPSEND".to_string()
}

/// Output all NMEA sentence types (GGA, RMC, GSV, GSA, VTG bitmask 3).
pub fn cmd_gnss_nmea_type() -> String {
    "AT+QGPSCFG=\"gpsnmeatype\",3".to_string()
}

/// Allow NMEA sentences to be read with `AT+QGPSGNMEA`.
pub fn cmd_gnss_nmea_source() -> String {
    "AT+QGPSCFG=\"nmeasrc\",1".to_string()
}

pub fn cmd_gnss_on() -> String {
    "AT+QGPS=1".to_string()
}

/// Test form of the location query; confirms the engine accepts it.
pub fn cmd_gnss_probe() -> String {
    "AT+QGPSLOC=?".to_string()
}

/// Read one GGA sentence.
pub fn cmd_gnss_read() -> String {
    "AT+QGPSGNMEA=\"GGA\"".to_string()
}

// ---------------------------------------------------------------
// TCP/IP
// ---------------------------------------------------------------

/// Configure PDP context 1 as IPv4 with `apn`, no authentication.
pub fn cmd_set_context(apn: &str) -> String {
    format!("AT+QICSGP=1,1,\"{apn}\",\"\",\"\",1")
}

pub fn cmd_activate_context() -> String {
    "AT+QIACT=1".to_string()
}

pub fn cmd_query_context() -> String {
    "AT+QIACT?".to_string()
}

/// Open a TCP client socket in direct-push mode.
pub fn cmd_open_client(address: &str, port: u16) -> String {
    format!("AT+QIOPEN=1,{CLIENT_SOCKET},\"TCP\",\"{address}\",{port},0,1")
}

/// Open a TCP listener on `port`.
pub fn cmd_open_listener(port: u16) -> String {
    format!("AT+QIOPEN=1,{LISTENER_SOCKET},\"TCP LISTENER\",\"127.0.0.1\",0,{port},0")
}

/// Announce `len` bytes of payload on the client socket.
pub fn cmd_send(len: usize) -> String {
    format!("AT+QISEND={CLIENT_SOCKET},{len}")
}

/// Query how much of the sent data was acknowledged.
pub fn cmd_send_query() -> String {
    format!("AT+QISEND={CLIENT_SOCKET},0")
}

pub fn cmd_close(socket: u8) -> String {
    format!("AT+QICLOSE={socket}")
}

/// Fetch pending data from `socket`.
pub fn cmd_read_socket(socket: &str) -> String {
    format!("AT+QIRD={socket},{READ_CHUNK}")
}

// ---------------------------------------------------------------
// Response parsers
// ---------------------------------------------------------------

/// Local address from `+QIACT: <ctx>,<state>,<type>,"<ip>"`.
///
/// Returns an empty string if the context has no address.
pub fn parse_context_address(info: &[String]) -> String {
    info.first()
        .and_then(|line| protocol::field(line, 3))
        .unwrap_or("")
        .to_string()
}

/// Payload of an `AT+QIRD` reply: the line following the `+QIRD: <len>`
/// header. `None` when the socket had nothing buffered.
pub fn parse_read_payload(info: &[String]) -> Option<String> {
    let header = info.iter().position(|line| line.starts_with("+QIRD:"))?;
    info.get(header + 1).cloned()
}

/// The notifications a Quectel session reacts to.
pub fn urc_classifier() -> UrcClassifier {
    UrcClassifier::new()
        .with(UrcPattern::prefix(urc::QUECTEL_SOCKET_RECV, UrcKind::SocketData))
        .with(UrcPattern::prefix(urc::QUECTEL_SOCKET_CLOSED, UrcKind::SocketClosed))
}
