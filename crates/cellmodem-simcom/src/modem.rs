//! SimcomModem -- the [`Modem`] trait implementation for SIMCom modules.
//!
//! With `AT+CIPRXGET=2` the module pushes received data inline:
//!
//! ```text
//! RECV FROM:10.9.8.7:4000
//! +IPD5
//! hello
//! ```
//!
//! so [`tcp_read`](Modem::tcp_read) pulls the two lines after the
//! notification straight off the channel instead of issuing a command.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use cellmodem_at::modem::{self, Modem, Pacing};
use cellmodem_at::{AtChannel, Urc, UrcClassifier};
use cellmodem_core::error::Result;
use cellmodem_core::types::{InboundData, LocalAddress, PositionFix, StepFailure, StepReport, Vendor};

use crate::commands;

/// A SIMCom module driven over an [`AtChannel`].
pub struct SimcomModem {
    channel: AtChannel,
    pacing: Pacing,
    urcs: UrcClassifier,
}

impl SimcomModem {
    pub fn new(channel: AtChannel, pacing: Pacing) -> Self {
        SimcomModem {
            channel,
            pacing,
            urcs: commands::urc_classifier(),
        }
    }
}

#[async_trait]
impl Modem for SimcomModem {
    fn vendor(&self) -> Vendor {
        Vendor::Simcom
    }

    fn channel(&mut self) -> &mut AtChannel {
        &mut self.channel
    }

    fn urc_classifier(&self) -> &UrcClassifier {
        &self.urcs
    }

    async fn gnss_configure(&mut self) -> Result<Vec<StepFailure>> {
        let steps = [
            ("turn off GNSS", commands::cmd_gnss_off()),
            ("turn on antenna bias", commands::cmd_antenna_bias()),
            ("turn on GNSS", commands::cmd_gnss_on()),
        ];

        let mut warnings = Vec::new();
        for (step, cmd) in steps {
            modem::execute_best_effort(&mut self.channel, step, &cmd, &mut warnings).await?;
        }
        Ok(warnings)
    }

    async fn gnss_read(&mut self) -> Result<PositionFix> {
        modem::read_position(
            &mut self.channel,
            &commands::cmd_gnss_read(),
            &commands::CGPSINFO_LAYOUT,
        )
        .await
    }

    async fn tcp_client_send(
        &mut self,
        apn: &str,
        address: &str,
        port: u16,
        payload: &str,
    ) -> Result<Vec<StepReport>> {
        let mut reports = Vec::new();
        let ch = &mut self.channel;

        let cmd = commands::cmd_set_context(apn);
        let response = modem::execute_step(ch, "set APN", &cmd, &mut reports).await?;
        modem::abort_on_error(&cmd, &response)?;
        modem::execute_step(ch, "select profile", &commands::cmd_select_profile(), &mut reports)
            .await?;
        modem::execute_step(ch, "open network", &commands::cmd_net_open(), &mut reports).await?;
        self.pacing.after_attach().await;

        let cmd = commands::cmd_open_client(address, port);
        let response = modem::execute_step(ch, "open socket", &cmd, &mut reports).await?;
        modem::abort_on_error(&cmd, &response)?;
        self.pacing.after_open().await;

        modem::execute_step(
            ch,
            "announce payload",
            &commands::cmd_send(payload.len()),
            &mut reports,
        )
        .await?;
        ch.write_raw(payload.as_bytes()).await?;
        let timeout = ch.config().command_timeout;
        let ack = ch.next_line(timeout).await?;
        debug!(bytes = payload.len(), ack = ?ack, "payload written");

        modem::execute_step(ch, "query send status", &commands::cmd_send_query(), &mut reports)
            .await?;
        modem::execute_step(ch, "close socket", &commands::cmd_close_client(), &mut reports)
            .await?;

        Ok(reports)
    }

    async fn tcp_server_setup(&mut self, apn: &str, port: u16) -> Result<LocalAddress> {
        let cmd = commands::cmd_set_context(apn);
        let response = self.channel.execute(&cmd).await?;
        modem::abort_step_on_error("set APN", &cmd, &response)?;
        let response = self.channel.execute(&commands::cmd_net_open()).await?;
        debug!(result = response.result_text(), "network open");
        self.pacing.after_attach().await;

        let cmd = commands::cmd_local_address();
        let response = self.channel.execute(&cmd).await?;
        let response = modem::require_ok("query local IP address", &cmd, response)?;
        let ip = commands::parse_local_address(&response.info);

        let cmd = commands::cmd_server_start(port);
        let response = self.channel.execute(&cmd).await?;
        modem::require_ok("start TCP server", &cmd, response)?;

        let address = LocalAddress { ip, port };
        info!(%address, "TCP server started");
        Ok(address)
    }

    async fn tcp_receive_start(&mut self) -> Result<Vec<StepFailure>> {
        let mut warnings = Vec::new();
        modem::execute_best_effort(
            &mut self.channel,
            "enable inline receive",
            &commands::cmd_receive_mode(),
            &mut warnings,
        )
        .await?;
        Ok(warnings)
    }

    async fn tcp_read(&mut self, urc: &Urc) -> Result<Option<InboundData>> {
        let Urc::PeerData { peer } = urc else {
            return Ok(None);
        };

        let timeout = self.channel.config().command_timeout;
        let Some(mut line) = self.channel.next_line(timeout).await? else {
            warn!(%peer, "no data followed receive notification");
            return Ok(None);
        };
        if line.starts_with(commands::IPD_PREFIX) {
            debug!(header = %line, "receive length");
            match self.channel.next_line(timeout).await? {
                Some(payload) => line = payload,
                None => {
                    warn!(%peer, "no payload followed {line}");
                    return Ok(None);
                }
            }
        }

        Ok(Some(InboundData {
            socket: None,
            peer: Some(peer.clone()),
            payload: line,
        }))
    }

    async fn tcp_server_close(&mut self) -> Result<()> {
        let cmd = commands::cmd_server_stop();
        let response = self.channel.execute(&cmd).await?;
        if !response.is_ok() {
            warn!(command = %cmd, result = response.result_text(), "server stop failed");
        }
        Ok(())
    }

    fn into_channel(self: Box<Self>) -> AtChannel {
        self.channel
    }
}
