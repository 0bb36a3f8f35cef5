//! QuectelModem -- the [`Modem`] trait implementation for Quectel modules.
//!
//! Quectel announces socket data with `+QIURC: "recv",<id>` and leaves it
//! buffered until it is fetched with `AT+QIRD`, so a receive loop only has to
//! react to the notification and issue one read.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use cellmodem_at::modem::{self, Modem, Pacing};
use cellmodem_at::{AtChannel, Urc, UrcClassifier};
use cellmodem_core::error::Result;
use cellmodem_core::types::{
    InboundData, LocalAddress, PositionFix, Response, StepFailure, StepReport, Vendor,
};

use crate::commands;

/// A Quectel module driven over an [`AtChannel`].
pub struct QuectelModem {
    channel: AtChannel,
    pacing: Pacing,
    urcs: UrcClassifier,
}

impl QuectelModem {
    pub fn new(channel: AtChannel, pacing: Pacing) -> Self {
        QuectelModem {
            channel,
            pacing,
            urcs: commands::urc_classifier(),
        }
    }

    /// Set the APN. The caller decides whether an `ERROR` here is fatal.
    async fn set_apn(&mut self, apn: &str, reports: &mut Vec<StepReport>) -> Result<(String, Response)> {
        let cmd = commands::cmd_set_context(apn);
        let response = modem::execute_step(&mut self.channel, "set APN", &cmd, reports).await?;
        Ok((cmd, response))
    }

    /// Activate the PDP context, then let it settle.
    async fn activate(&mut self, reports: &mut Vec<StepReport>) -> Result<()> {
        let cmd = commands::cmd_activate_context();
        modem::execute_step(&mut self.channel, "activate context", &cmd, reports).await?;
        self.pacing.after_attach().await;
        Ok(())
    }
}

#[async_trait]
impl Modem for QuectelModem {
    fn vendor(&self) -> Vendor {
        Vendor::Quectel
    }

    fn channel(&mut self) -> &mut AtChannel {
        &mut self.channel
    }

    fn urc_classifier(&self) -> &UrcClassifier {
        &self.urcs
    }

    async fn prepare(&mut self) -> Result<Vec<StepFailure>> {
        let mut warnings = Vec::new();
        modem::execute_best_effort(
            &mut self.channel,
            "configure RI signal",
            &commands::cmd_ri_signal_type(),
            &mut warnings,
        )
        .await?;
        modem::execute_best_effort(
            &mut self.channel,
            "configure RI for incoming SMS",
            &commands::cmd_ri_sms_incoming(),
            &mut warnings,
        )
        .await?;
        Ok(warnings)
    }

    async fn gnss_configure(&mut self) -> Result<Vec<StepFailure>> {
        let steps = [
            ("turn off GNSS", commands::cmd_gnss_off()),
            ("configure NMEA type", commands::cmd_gnss_nmea_type()),
            ("configure NMEA source", commands::cmd_gnss_nmea_source()),
            ("turn on GNSS", commands::cmd_gnss_on()),
            ("probe GNSS location", commands::cmd_gnss_probe()),
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
            &commands::GGA_LAYOUT,
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
        let (cmd, response) = self.set_apn(apn, &mut reports).await?;
        modem::abort_on_error(&cmd, &response)?;
        self.activate(&mut reports).await?;

        modem::execute_step(
            &mut self.channel,
            "query context",
            &commands::cmd_query_context(),
            &mut reports,
        )
        .await?;

        let cmd = commands::cmd_open_client(address, port);
        let response = modem::execute_step(&mut self.channel, "open socket", &cmd, &mut reports).await?;
        modem::abort_on_error(&cmd, &response)?;
        self.pacing.after_open().await;

        modem::execute_step(
            &mut self.channel,
            "announce payload",
            &commands::cmd_send(payload.len()),
            &mut reports,
        )
        .await?;
        self.channel.write_raw(payload.as_bytes()).await?;
        let timeout = self.channel.config().command_timeout;
        let ack = self.channel.next_line(timeout).await?;
        debug!(bytes = payload.len(), ack = ?ack, "payload written");

        modem::execute_step(
            &mut self.channel,
            "query send status",
            &commands::cmd_send_query(),
            &mut reports,
        )
        .await?;
        modem::execute_step(
            &mut self.channel,
            "close socket",
            &commands::cmd_close(commands::CLIENT_SOCKET),
            &mut reports,
        )
        .await?;

        Ok(reports)
    }

    async fn tcp_server_setup(&mut self, apn: &str, port: u16) -> Result<LocalAddress> {
        let mut reports = Vec::new();
        let (cmd, response) = self.set_apn(apn, &mut reports).await?;
        modem::abort_step_on_error("set APN", &cmd, &response)?;
        self.activate(&mut reports).await?;

        let cmd = commands::cmd_query_context();
        let response = self.channel.execute(&cmd).await?;
        let response = modem::require_ok("query local IP address", &cmd, response)?;
        let ip = commands::parse_context_address(&response.info);

        let cmd = commands::cmd_open_listener(port);
        let response = self.channel.execute(&cmd).await?;
        modem::require_ok("start TCP listener", &cmd, response)?;

        let address = LocalAddress { ip, port };
        info!(%address, "TCP listener started");
        Ok(address)
    }

    async fn tcp_read(&mut self, urc: &Urc) -> Result<Option<InboundData>> {
        let Urc::SocketData { socket } = urc else {
            return Ok(None);
        };

        let cmd = commands::cmd_read_socket(socket);
        let response = self.channel.execute(&cmd).await?;
        if !response.is_ok() {
            warn!(command = %cmd, result = response.result_text(), "socket read failed");
            return Ok(None);
        }

        Ok(commands::parse_read_payload(&response.info).map(|payload| InboundData {
            socket: Some(socket.clone()),
            peer: None,
            payload,
        }))
    }

    async fn tcp_server_close(&mut self) -> Result<()> {
        let cmd = commands::cmd_close(commands::LISTENER_SOCKET);
        let response = self.channel.execute(&cmd).await?;
        if !response.is_ok() {
            warn!(command = %cmd, result = response.result_text(), "listener close failed");
        }
        Ok(())
    }

    fn into_channel(self: Box<Self>) -> AtChannel {
        self.channel
    }
}
