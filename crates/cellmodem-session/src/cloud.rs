//! Hologram cloud messaging over the modem's TCP stack.
//!
//! Outgoing messages are a one-line JSON object sent to the Hologram
//! embedded API; incoming messages arrive on a modem-side TCP listener.

use serde::Serialize;
use tracing::info;

use cellmodem_at::Modem;
use cellmodem_core::error::{Error, Result};
use cellmodem_core::types::StepReport;

pub const HOLOGRAM_APN: &str = "hologram";
pub const HOLOGRAM_HOST: &str = "23.253.146.203";
pub const HOLOGRAM_SEND_PORT: u16 = 9999;
pub const HOLOGRAM_RECEIVE_PORT: u16 = 2020;
pub const DEFAULT_TOPIC: &str = "TOPIC1";

/// Wire form of a cloud message: device key, data, topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HologramPacket {
    pub k: String,
    pub d: String,
    pub t: String,
}

impl HologramPacket {
    /// A message for the default topic.
    pub fn new(device_key: &str, data: &str) -> Self {
        HologramPacket {
            k: device_key.to_string(),
            d: data.to_string(),
            t: DEFAULT_TOPIC.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::InvalidParameter(format!("cannot encode cloud packet: {e}")))
    }
}

/// Send `message` to the Hologram cloud as `device_key`.
pub async fn send_message(
    modem: &mut dyn Modem,
    device_key: &str,
    message: &str,
) -> Result<Vec<StepReport>> {
    if device_key.is_empty() {
        return Err(Error::InvalidParameter("no device key specified".into()));
    }
    let payload = HologramPacket::new(device_key, message).to_json()?;
    let reports = modem
        .tcp_client_send(HOLOGRAM_APN, HOLOGRAM_HOST, HOLOGRAM_SEND_PORT, &payload)
        .await?;
    info!(bytes = payload.len(), "cloud message sent");
    Ok(reports)
}
