//! Session state machines for cellmodem.
//!
//! Each session drives one long-running mode over an already-identified
//! modem and reports what happens as [`ModemEvent`]s:
//!
//! - [`gnss::GnssPoller`] -- configure, then read a position periodically.
//! - [`tcp::TcpReceiver`] -- listen on a TCP port and surface inbound data.
//! - [`sms::SmsReceiver`] and [`sms::send_sms`] -- text-mode SMS.
//! - [`network::network_info`] -- one-shot status dump.
//! - [`cloud`] -- Hologram cloud packet and send helper.
//!
//! Loops run on the caller's task, sleep through an injected
//! [`Delay`], and stop when their [`CancellationToken`] fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use cellmodem_core::delay::Delay;

pub mod cloud;
pub mod gnss;
pub mod network;
pub mod sms;
pub mod tcp;
pub mod timing;

pub use cellmodem_core::events::ModemEvent;
pub use gnss::GnssPoller;
pub use network::{network_info, InfoEntry};
pub use sms::{send_sms, SmsReceiver, SmsSendReport};
pub use tcp::{TcpReceiver, TcpState};
pub use timing::SessionTiming;

/// Sleep for `duration` unless cancelled first. Returns `false` on cancel.
pub(crate) async fn pause(delay: &dyn Delay, duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;

        _ = cancel.cancelled() => false,
        _ = delay.sleep(duration) => true,
    }
}
