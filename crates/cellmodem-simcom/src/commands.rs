//! SIMCom AT command builders and response parsers.
//!
//! Pure functions only. Socket 0 carries outgoing connections and server
//! index 0 the listener; PDP profile 1 is used for both.

use cellmodem_at::urc::{self, UrcClassifier, UrcKind, UrcPattern};
use cellmodem_core::gnss::GnssLayout;

/// Field positions in a `+CGPSINFO:` reply.
pub const CGPSINFO_LAYOUT: GnssLayout = GnssLayout {
    latitude: Some(0),
    latitude_dir: Some(1),
    longitude: Some(2),
    longitude_dir: Some(3),
    date: Some(4),
    time: Some(5),
    altitude: Some(6),
    speed: Some(7),
    true_course: Some(8),
};

/// Prefix of the length line that precedes received data.
pub const IPD_PREFIX: &str = "+IPD";

// ---------------------------------------------------------------
// GNSS
// ---------------------------------------------------------------

pub fn cmd_gnss_off() -> String {
    "AT+CGPS=0".to_string()
}

/// Power the active antenna from VDD_EXT.
pub fn cmd_antenna_bias() -> String {
    "AT+CVAUXS=1".to_string()
}

pub fn cmd_gnss_on() -> String {
    "AT+CGPS=1".to_string()
}

pub fn cmd_gnss_read() -> String {
    "AT+CGPSINFO".to_string()
}

// ---------------------------------------------------------------
// TCP/IP
// ---------------------------------------------------------------

pub fn cmd_set_context(apn: &str) -> String {
    format!("AT+CGSOCKCONT=1,\"IP\",\"{apn}\"")
}

/// Select profile 1 for socket operations.
pub fn cmd_select_profile() -> String {
    "AT+CSOCKSETPN=1".to_string()
}

pub fn cmd_net_open() -> String {
    "AT+NETOPEN".to_string()
}

pub fn cmd_open_client(address: &str, port: u16) -> String {
    format!("AT+CIPOPEN=0,\"TCP\",\"{address}\",{port}")
}

pub fn cmd_send(len: usize) -> String {
    format!("AT+CIPSEND=0,{len}")
}

/// Send-status query, in the form the module firmware accepts after a send.
pub fn cmd_send_query() -> String {
    "AT+CIPSEND: 0,0".to_string()
}

pub fn cmd_close_client() -> String {
    "AT+CIPCLOSE=0".to_string()
}

pub fn cmd_local_address() -> String {
    "AT+IPADDR".to_string()
}

pub fn cmd_server_start(port: u16) -> String {
    format!("AT+SERVERSTART={port},0")
}

pub fn cmd_server_stop() -> String {
    "AT+SERVERSTOP=0".to_string()
}

/// Deliver received data inline (mode 2, 1024-byte chunks). Needs to be set once.
pub fn cmd_receive_mode() -> String {
    "AT+CIPRXGET=2,1,1024".to_string()
}

// ---------------------------------------------------------------
// Response parsers
// ---------------------------------------------------------------

/// Local address from the first line of an `AT+IPADDR` reply.
pub fn parse_local_address(info: &[String]) -> String {
    info.first()
        .map(|line| line.strip_prefix("+IPADDR:").unwrap_or(line).trim().to_string())
        .unwrap_or_default()
}

/// The notifications a SIMCom session reacts to.
pub fn urc_classifier() -> UrcClassifier {
    UrcClassifier::new().with(UrcPattern::contains(urc::SIMCOM_RECV_FROM, UrcKind::PeerData))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmodem_at::Urc;
    use cellmodem_core::gnss::decode_position;

    #[test]
    fn context_and_socket_commands() {
        assert_eq!(cmd_set_context("hologram"), "AT+CGSOCKCONT=1,\"IP\",\"hologram\"");
        assert_eq!(
            cmd_open_client("23.253.146.203", 9999),
            "AT+CIPOPEN=0,\"TCP\",\"23.253.146.203\",9999"
        );
        assert_eq!(cmd_send(12), "AT+CIPSEND=0,12");
        assert_eq!(cmd_server_start(2020), "AT+SERVERSTART=2020,0");
    }

    #[test]
    fn local_address_strips_prefix() {
        assert_eq!(
            parse_local_address(&["+IPADDR: 10.71.155.118".to_string()]),
            "10.71.155.118"
        );
        assert_eq!(parse_local_address(&["10.0.0.1".to_string()]), "10.0.0.1");
        assert_eq!(parse_local_address(&[]), "");
    }

    #[test]
    fn cgpsinfo_layout_decodes_reply() {
        let payload = "+CGPSINFO: 3113.343286,N,12121.234064,E,250311,072809.3,44.1,0.0,0";
        let fix = decode_position(payload, &CGPSINFO_LAYOUT).unwrap();
        assert_eq!(fix.latitude, "31 deg 13.343286 min");
        assert_eq!(fix.longitude, "121 deg 21.234064 min");
        assert_eq!(fix.date, "25/03/11");
        assert_eq!(fix.time, "07:28:09");
        assert_eq!(fix.speed, "0.0");
    }

    #[test]
    fn classifier_knows_peer_data() {
        assert_eq!(
            urc_classifier().classify("RECV FROM:10.9.8.7:4000"),
            Some(Urc::PeerData {
                peer: "10.9.8.7:4000".into()
            })
        );
        assert_eq!(urc_classifier().classify("+QIURC: \"recv\",1"), None);
    }
}
