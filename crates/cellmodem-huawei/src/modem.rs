//! HuaweiModem -- the [`Modem`] trait implementation for Huawei modules.

use async_trait::async_trait;
use tracing::{debug, warn};

use cellmodem_at::modem::{self, Modem};
use cellmodem_at::{AtChannel, Urc, UrcClassifier};
use cellmodem_core::error::{Error, Result};
use cellmodem_core::types::{InboundData, LocalAddress, PositionFix, StepFailure, StepReport, Vendor};

use crate::commands;

/// A Huawei module driven over an [`AtChannel`].
pub struct HuaweiModem {
    channel: AtChannel,
    urcs: UrcClassifier,
}

impl HuaweiModem {
    pub fn new(channel: AtChannel) -> Self {
        HuaweiModem {
            channel,
            urcs: UrcClassifier::new(),
        }
    }
}

fn unsupported(what: &str) -> Error {
    warn!(operation = what, "not supported on Huawei modules");
    Error::Unsupported(format!("{what} is not available on {} modems", Vendor::Huawei))
}

#[async_trait]
impl Modem for HuaweiModem {
    fn vendor(&self) -> Vendor {
        Vendor::Huawei
    }

    fn channel(&mut self) -> &mut AtChannel {
        &mut self.channel
    }

    fn urc_classifier(&self) -> &UrcClassifier {
        &self.urcs
    }

    async fn gnss_configure(&mut self) -> Result<Vec<StepFailure>> {
        let steps = [
            ("set standalone positioning", commands::cmd_positioning_mode()),
            ("set single positioning session", commands::cmd_session_type()),
            ("set positioning quality", commands::cmd_quality_of_service()),
            ("start positioning", commands::cmd_start_positioning()),
        ];

        let mut warnings = Vec::new();
        for (step, cmd) in steps {
            modem::execute_best_effort(&mut self.channel, step, &cmd, &mut warnings).await?;
        }
        debug!(failed = warnings.len(), "GNSS positioning configured");
        Ok(warnings)
    }

    async fn gnss_read(&mut self) -> Result<PositionFix> {
        Err(unsupported("GNSS reading"))
    }

    async fn tcp_client_send(
        &mut self,
        _apn: &str,
        _address: &str,
        _port: u16,
        _payload: &str,
    ) -> Result<Vec<StepReport>> {
        Err(unsupported("TCP client"))
    }

    async fn tcp_server_setup(&mut self, _apn: &str, _port: u16) -> Result<LocalAddress> {
        Err(unsupported("TCP server"))
    }

    async fn tcp_read(&mut self, _urc: &Urc) -> Result<Option<InboundData>> {
        Err(unsupported("TCP receive"))
    }

    async fn tcp_server_close(&mut self) -> Result<()> {
        Err(unsupported("TCP server"))
    }

    fn into_channel(self: Box<Self>) -> AtChannel {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmodem_at::AtConfig;
    use cellmodem_test_harness::MockTransport;

    fn huawei(mock: MockTransport) -> HuaweiModem {
        HuaweiModem::new(AtChannel::new(Box::new(mock), AtConfig::default()))
    }

    #[tokio::test]
    async fn gnss_configure_issues_wp_sequence() {
        let mut mock = MockTransport::new();
        mock.expect_at("AT^WPDOM=0", &["OK"]);
        mock.expect_at("AT^WPDST=0", &["OK"]);
        mock.expect_at("AT^WPQOS=255,500", &["OK"]);
        mock.expect_at("AT^WPDGP", &["OK"]);

        let mut modem = huawei(mock);
        assert!(modem.gnss_configure().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gnss_configure_reports_failed_steps_and_continues() {
        let mut mock = MockTransport::new();
        mock.expect_at("AT^WPDOM=0", &["OK"]);
        mock.expect_at("AT^WPDST=0", &["ERROR"]);
        mock.expect_at("AT^WPQOS=255,500", &["OK"]);
        mock.expect_at("AT^WPDGP", &["OK"]);

        let mut modem = huawei(mock);
        let warnings = modem.gnss_configure().await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].step, "set single positioning session");
    }

    #[tokio::test]
    async fn gnss_read_is_unsupported_and_sends_nothing() {
        let mut modem = huawei(MockTransport::new());
        let err = modem.gnss_read().await.unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[tokio::test]
    async fn tcp_operations_are_unsupported_not_unsupported_device() {
        let mut modem = huawei(MockTransport::new());
        assert!(matches!(
            modem.tcp_client_send("apn", "h", 1, "x").await,
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            modem.tcp_server_setup("apn", 2020).await,
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            modem.tcp_server_close().await,
            Err(Error::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn receive_start_and_prepare_are_no_ops() {
        let mut modem = huawei(MockTransport::new());
        assert!(modem.prepare().await.unwrap().is_empty());
        assert!(modem.tcp_receive_start().await.unwrap().is_empty());
    }
}
