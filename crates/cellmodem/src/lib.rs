//! # cellmodem
//!
//! AT-command engine and session drivers for Quectel, SIMCom and Huawei
//! cellular modules attached over a serial port.
//!
//! This crate is the main entry point. It re-exports the core types, the AT
//! engine and the session loops, and provides [`ModemBuilder`] plus the
//! identify-then-bind step that picks a vendor driver.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cellmodem::{CancellationToken, GnssPoller, ModemBuilder, ModemEvent};
//! # async fn example() -> cellmodem::Result<()> {
//! let builder = ModemBuilder::new().serial_port("/dev/ttyUSB2");
//! let channel = builder.open().await?;
//! let (ident, mut modem) = cellmodem::connect(channel, builder.pacing()).await?;
//! println!("{}", ident.text);
//!
//! let poller = GnssPoller::new(builder.delay_source(), builder.session_timing().clone());
//! let cancel = CancellationToken::new();
//! poller
//!     .run(modem.as_mut(), &cancel, &mut |event: ModemEvent| println!("{event:?}"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modes
//!
//! - **GNSS**: [`GnssPoller`] configures the receiver and reads positions.
//! - **TCP**: [`TcpReceiver`] listens for inbound data;
//!   [`cloud::send_message`] runs the client send workflow.
//! - **SMS**: [`SmsReceiver`] and [`send_sms`].
//! - **Network info**: [`network_info`].
//!
//! ## Supported Vendors
//!
//! - **Quectel**: EC2x/EG9x-class modules (`QGPS`, `QIOPEN`)
//! - **SIMCom**: SIM7x00-class modules (`CGPS`, `CIPOPEN`)
//! - **Huawei**: GNSS configuration only (`^WPDGP`)

pub mod builder;
pub mod identify;

pub use builder::ModemBuilder;
pub use identify::{bind, connect, identify, Identification};

pub use cellmodem_at::{AtChannel, AtConfig, Modem, Pacing, Urc, UrcClassifier};
pub use cellmodem_core::*;
pub use cellmodem_session::{
    cloud, network, network_info, send_sms, sms, tcp, timing, GnssPoller, InfoEntry,
    SessionTiming, SmsReceiver, SmsSendReport, TcpReceiver, TcpState,
};
pub use cellmodem_transport::{FlowControl, SerialConfig, SerialTransport};
pub use tokio_util::sync::CancellationToken;
/// Quectel backend.
#[cfg(feature = "quectel")]
pub mod quectel {
    pub use cellmodem_quectel::*;
}

/// SIMCom backend.
#[cfg(feature = "simcom")]
pub mod simcom {
    pub use cellmodem_simcom::*;
}

/// Huawei backend.
#[cfg(feature = "huawei")]
pub mod huawei {
    pub use cellmodem_huawei::*;
}
