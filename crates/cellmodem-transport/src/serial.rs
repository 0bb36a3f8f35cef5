//! Serial port transport for modem communication.
//!
//! [`SerialTransport`] opens the modem's AT port at 8N1 and implements
//! [`Transport`] on top of a tokio-serial stream. Reads are bounded by the
//! per-call timeout; an expired read is [`Error::Timeout`], which the AT
//! engine treats as "no more lines" rather than a failure.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

use cellmodem_core::error::{Error, Result};
use cellmodem_core::transport::Transport;

/// Default AT port speed of Quectel, SIMCom and Huawei modules.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial port configuration. Framing is always 8 data bits, no parity,
/// one stop bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub flow_control: FlowControl,
    /// Hold DTR high while the port is open. Most modules treat DTR low as
    /// "terminal absent" and may enter sleep or drop data calls.
    pub assert_dtr: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baud_rate: DEFAULT_BAUD_RATE,
            flow_control: FlowControl::None,
            assert_dtr: true,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    /// RTS/CTS, as enabled on the module with `AT+IFC=2,2`.
    Hardware,
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

fn io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::UnexpectedEof => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

/// A modem AT port.
pub struct SerialTransport {
    port: Option<SerialStream>,
    port_name: String,
}

impl SerialTransport {
    /// Open `port` at `baud_rate` with default settings.
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(port, config).await
    }

    pub async fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            port = %port,
            baud_rate = config.baud_rate,
            flow_control = ?config.flow_control,
            "opening serial port"
        );

        let mut stream = tokio_serial::new(port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(config.flow_control.into())
            .open_native_async()
            .map_err(|e| Error::Transport(format!("failed to open serial port {port}: {e}")))?;

        if let Err(e) = stream.write_data_terminal_ready(config.assert_dtr) {
            tracing::warn!(port = %port, error = %e, "failed to set DTR");
        }

        tracing::info!(port = %port, baud_rate = config.baud_rate, "serial port opened");
        Ok(SerialTransport {
            port: Some(stream),
            port_name: port.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            data = %String::from_utf8_lossy(data).escape_debug(),
            "tx"
        );
        port.write_all(data).await.map_err(io_error)?;
        port.flush().await.map_err(io_error)?;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, port.read(buf)).await {
            Ok(Ok(n)) => {
                tracing::trace!(
                    port = %self.port_name,
                    data = %String::from_utf8_lossy(&buf[..n]).escape_debug(),
                    "rx"
                );
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "serial read failed");
                Err(io_error(e))
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush().await {
                tracing::warn!(port = %self.port_name, error = %e, "flush before close failed");
            }
            tracing::info!(port = %self.port_name, "serial port closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_modem_speed_with_dtr() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.flow_control, FlowControl::None);
        assert!(config.assert_dtr);
    }

    #[test]
    fn flow_control_conversion() {
        let _: tokio_serial::FlowControl = FlowControl::None.into();
        let _: tokio_serial::FlowControl = FlowControl::Hardware.into();
    }

    #[test]
    fn broken_pipe_is_connection_lost() {
        let e = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(matches!(io_error(e), Error::ConnectionLost));
        let e = std::io::Error::new(std::io::ErrorKind::Other, "odd");
        assert!(matches!(io_error(e), Error::Io(_)));
    }

    #[tokio::test]
    async fn open_nonexistent_port_is_transport_error() {
        let result = SerialTransport::open("/dev/cellmodem-does-not-exist", 115_200).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
