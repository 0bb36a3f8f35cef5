//! Network status dump, the default mode when no session is requested.
//!
//! Uses only standard 3GPP queries plus two that most vendors accept, so it
//! runs on any modem that answered `ATI`, recognised or not.

use std::fmt;

use cellmodem_at::AtChannel;
use cellmodem_core::error::Result;
use cellmodem_core::types::Response;

/// Queries issued by [`network_info`], with their display labels.
pub const NETWORK_QUERIES: [(&str, &str); 6] = [
    ("Operator", "AT+COPS?"),
    ("Network registration", "AT+CREG?"),
    ("RSSI", "AT+CSQ"),
    ("GPRS network registration status", "AT+CGDCONT?"),
    ("GSM Loc", "AT+CIPGSMLOC=1,1"),
    ("UE system information", "AT+CPSI?"),
];

/// One query and what the modem answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub label: &'static str,
    pub command: &'static str,
    pub response: Response,
}

impl fmt::Display for InfoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.response.is_ok() {
            write!(f, "{}:\n{}", self.label, self.response.info_text())
        } else {
            write!(
                f,
                "AT Command: {}, status: {}",
                self.command,
                self.response.result_text()
            )
        }
    }
}

/// Run every query in [`NETWORK_QUERIES`], in order.
pub async fn network_info(channel: &mut AtChannel) -> Result<Vec<InfoEntry>> {
    let mut entries = Vec::with_capacity(NETWORK_QUERIES.len());
    for (label, command) in NETWORK_QUERIES {
        let response = channel.execute(command).await?;
        entries.push(InfoEntry {
            label,
            command,
            response,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmodem_at::AtConfig;
    use cellmodem_test_harness::MockTransport;

    #[tokio::test]
    async fn runs_all_queries_in_order() {
        let mut mock = MockTransport::new();
        mock.expect_at("AT+COPS?", &["+COPS: 0,0,\"T-Mobile\",7", "OK"]);
        mock.expect_at("AT+CREG?", &["+CREG: 0,1", "OK"]);
        mock.expect_at("AT+CSQ", &["+CSQ: 20,99", "OK"]);
        mock.expect_at("AT+CGDCONT?", &["+CGDCONT: 1,\"IP\",\"hologram\"", "OK"]);
        mock.expect_at("AT+CIPGSMLOC=1,1", &["ERROR"]);
        mock.expect_at("AT+CPSI?", &[]);

        let mut at = AtChannel::new(Box::new(mock), AtConfig::default());
        let entries = network_info(&mut at).await.unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].to_string(), "Operator:\n+COPS: 0,0,\"T-Mobile\",7");
        assert_eq!(entries[2].to_string(), "RSSI:\n+CSQ: 20,99");
        assert_eq!(
            entries[4].to_string(),
            "AT Command: AT+CIPGSMLOC=1,1, status: ERROR"
        );
        assert_eq!(
            entries[5].to_string(),
            "AT Command: AT+CPSI?, status: no reply"
        );
    }
}
