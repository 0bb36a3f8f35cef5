//! Modem identification and vendor binding.
//!
//! The vendor is resolved once, from the `ATI` text, and the channel is then
//! handed to that vendor's [`Modem`] implementation for the rest of the
//! process.

use tracing::{debug, info};

use cellmodem_at::{AtChannel, Modem, Pacing};
use cellmodem_core::error::{Error, Result};
use cellmodem_core::types::Vendor;

/// Identification command.
pub const IDENTIFY_COMMAND: &str = "ATI";

/// What the modem said about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// The `ATI` information lines, joined with `\n`.
    pub text: String,
    /// The vendor the text resolved to, if any.
    pub vendor: Option<Vendor>,
}

impl Identification {
    /// The resolved vendor, or [`Error::UnsupportedDevice`].
    pub fn require_vendor(&self) -> Result<Vendor> {
        self.vendor
            .ok_or_else(|| Error::UnsupportedDevice(self.text.clone()))
    }
}

/// Send `ATI` and resolve the vendor.
///
/// A modem that does not answer at all is [`Error::Timeout`]. An answer
/// that names no supported vendor is still `Ok`; call
/// [`Identification::require_vendor`] where a vendor is needed.
pub async fn identify(channel: &mut AtChannel) -> Result<Identification> {
    let response = channel.execute(IDENTIFY_COMMAND).await?;
    if response.echo.is_empty() && response.result.is_none() {
        return Err(Error::Timeout);
    }

    let text = response.info_text();
    let vendor = Vendor::from_identification(&text);
    match vendor {
        Some(v) => info!(vendor = %v, "modem identified"),
        None => debug!(%text, "no vendor marker in identification"),
    }
    Ok(Identification { text, vendor })
}

/// Hand `channel` to the driver for `vendor`.
///
/// Vendors whose backend feature is disabled are
/// [`Error::UnsupportedDevice`].
#[allow(unused_variables)]
pub fn bind(vendor: Vendor, channel: AtChannel, pacing: Pacing) -> Result<Box<dyn Modem>> {
    match vendor {
        #[cfg(feature = "quectel")]
        Vendor::Quectel => Ok(Box::new(cellmodem_quectel::QuectelModem::new(channel, pacing))),
        #[cfg(feature = "simcom")]
        Vendor::Simcom => Ok(Box::new(cellmodem_simcom::SimcomModem::new(channel, pacing))),
        #[cfg(feature = "huawei")]
        Vendor::Huawei => Ok(Box::new(cellmodem_huawei::HuaweiModem::new(channel))),
        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedDevice(format!(
            "{other} support is not compiled in"
        ))),
    }
}

/// Identify the modem and bind its driver in one step.
pub async fn connect(
    mut channel: AtChannel,
    pacing: Pacing,
) -> Result<(Identification, Box<dyn Modem>)> {
    let ident = identify(&mut channel).await?;
    let vendor = ident.require_vendor()?;
    let modem = bind(vendor, channel, pacing)?;
    Ok((ident, modem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmodem_at::AtConfig;
    use cellmodem_test_harness::MockTransport;

    fn channel(mock: MockTransport) -> AtChannel {
        AtChannel::new(Box::new(mock), AtConfig::default())
    }

    #[tokio::test]
    async fn identifies_simcom() {
        let mut mock = MockTransport::new();
        mock.expect_at(
            "ATI",
            &["Manufacturer: SIMCOM INCORPORATED", "Model: SIMCOM_SIM7600G-H", "OK"],
        );
        let mut ch = channel(mock);
        let ident = identify(&mut ch).await.unwrap();
        assert_eq!(ident.vendor, Some(Vendor::Simcom));
        assert!(ident.text.starts_with("Manufacturer: SIMCOM"));
    }

    #[tokio::test]
    async fn silent_modem_is_timeout() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATI\r", b"");
        let mut ch = channel(mock);
        assert!(matches!(identify(&mut ch).await, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn unknown_vendor_is_identified_but_unresolved() {
        let mut mock = MockTransport::new();
        mock.expect_at("ATI", &["Acme Modems", "X100", "OK"]);
        let mut ch = channel(mock);
        let ident = identify(&mut ch).await.unwrap();
        assert_eq!(ident.vendor, None);
        match ident.require_vendor() {
            Err(Error::UnsupportedDevice(text)) => assert_eq!(text, "Acme Modems\nX100"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bind_selects_driver() {
        let modem = bind(Vendor::Huawei, channel(MockTransport::new()), Pacing::immediate()).unwrap();
        assert_eq!(modem.vendor(), Vendor::Huawei);
        let modem = bind(Vendor::Quectel, channel(MockTransport::new()), Pacing::immediate()).unwrap();
        assert_eq!(modem.vendor(), Vendor::Quectel);
    }
}
