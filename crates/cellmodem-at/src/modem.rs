//! The `Modem` trait -- per-vendor capability interface.
//!
//! Each vendor crate (cellmodem-quectel, cellmodem-simcom, cellmodem-huawei)
//! provides a concrete type implementing [`Modem`]. Session loops program
//! against `Box<dyn Modem>` and never look at the vendor again once it has
//! been resolved from the identification text.
//!
//! Workflows follow two failure policies:
//!
//! - **Best effort**: every step is issued; non-OK steps are collected as
//!   [`StepFailure`] warnings (GNSS configuration, RI setup).
//! - **Required**: the first non-OK step aborts with
//!   [`Error::StepFailed`] (TCP server setup, including an explicit
//!   `ERROR` on its context step).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use cellmodem_core::delay::{Delay, NoDelay, TokioDelay};
use cellmodem_core::error::{Error, Result};
use cellmodem_core::gnss::{self, GnssLayout, MIN_PAYLOAD_LEN};
use cellmodem_core::types::{
    InboundData, LocalAddress, PositionFix, Response, ResultCode, StepFailure, StepReport, Vendor,
};

use crate::io::AtChannel;
use crate::urc::{Urc, UrcClassifier};

/// Vendor capability interface.
///
/// Every method that talks to the modem is `async` and takes `&mut self`:
/// the modem owns its [`AtChannel`], so only one command is ever in flight.
#[async_trait]
pub trait Modem: Send + Sync {
    /// The vendor this driver was bound for.
    fn vendor(&self) -> Vendor;

    /// The channel, for vendor-neutral commands and receive loops.
    fn channel(&mut self) -> &mut AtChannel;

    /// Notifications this vendor emits, in match order.
    fn urc_classifier(&self) -> &UrcClassifier;

    /// Post-identification setup. Failures are warnings.
    async fn prepare(&mut self) -> Result<Vec<StepFailure>> {
        Ok(Vec::new())
    }

    /// Configure the GNSS engine. Every step is attempted; the ones that did
    /// not return `OK` are returned as warnings.
    async fn gnss_configure(&mut self) -> Result<Vec<StepFailure>>;

    /// Take one positioning reading.
    ///
    /// A payload shorter than 10 characters is a decode error whatever the
    /// result code; otherwise a non-OK result is [`Error::CommandFailed`].
    async fn gnss_read(&mut self) -> Result<PositionFix>;

    /// Attach, open a TCP socket to `address:port`, send `payload`, close.
    ///
    /// Returns one report per command issued.
    async fn tcp_client_send(
        &mut self,
        apn: &str,
        address: &str,
        port: u16,
        payload: &str,
    ) -> Result<Vec<StepReport>>;

    /// Attach and start a TCP listener on `port`.
    async fn tcp_server_setup(&mut self, apn: &str, port: u16) -> Result<LocalAddress>;

    /// Switch the modem into the receive mode the listener needs.
    async fn tcp_receive_start(&mut self) -> Result<Vec<StepFailure>> {
        Ok(Vec::new())
    }

    /// Fetch the data announced by `urc`.
    ///
    /// Returns `None` for notifications that carry no data for this vendor.
    async fn tcp_read(&mut self, urc: &Urc) -> Result<Option<InboundData>>;

    /// Stop the listener started by [`tcp_server_setup`](Modem::tcp_server_setup).
    async fn tcp_server_close(&mut self) -> Result<()>;

    /// Release the channel.
    fn into_channel(self: Box<Self>) -> AtChannel;
}

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Settle times between workflow steps, slept through an injected [`Delay`].
#[derive(Clone)]
pub struct Pacing {
    pub delay: Arc<dyn Delay>,
    /// After activating the PDP context.
    pub attach_settle: Duration,
    /// After opening a socket.
    pub open_settle: Duration,
}

impl Pacing {
    /// No waiting at all, for tests.
    pub fn immediate() -> Self {
        Pacing {
            delay: Arc::new(NoDelay),
            attach_settle: Duration::ZERO,
            open_settle: Duration::ZERO,
        }
    }

    pub async fn after_attach(&self) {
        self.delay.sleep(self.attach_settle).await;
    }

    pub async fn after_open(&self) {
        self.delay.sleep(self.open_settle).await;
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            delay: Arc::new(TokioDelay),
            attach_settle: Duration::from_secs(1),
            open_settle: Duration::from_secs(3),
        }
    }
}

impl std::fmt::Debug for Pacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacing")
            .field("attach_settle", &self.attach_settle)
            .field("open_settle", &self.open_settle)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Workflow helpers shared by the vendor drivers
// ---------------------------------------------------------------------------

/// Run a best-effort step, recording a warning if it did not return `OK`.
pub async fn execute_best_effort(
    channel: &mut AtChannel,
    step: &'static str,
    cmd: &str,
    warnings: &mut Vec<StepFailure>,
) -> Result<Response> {
    let response = channel.execute(cmd).await?;
    if !response.is_ok() {
        let failure = StepFailure {
            step,
            command: cmd.to_string(),
            result: response.result,
        };
        warn!("{failure}");
        warnings.push(failure);
    }
    Ok(response)
}

/// Run a step of a linear workflow, recording its outcome in `reports`.
pub async fn execute_step(
    channel: &mut AtChannel,
    step: &'static str,
    cmd: &str,
    reports: &mut Vec<StepReport>,
) -> Result<Response> {
    let response = channel.execute(cmd).await?;
    reports.push(StepReport {
        step,
        command: cmd.to_string(),
        response: response.clone(),
    });
    Ok(response)
}

/// Fail with [`Error::StepFailed`] unless `response` ended with `OK`.
pub fn require_ok(step: &'static str, cmd: &str, response: Response) -> Result<Response> {
    if response.is_ok() {
        Ok(response)
    } else {
        Err(Error::StepFailed {
            step,
            command: cmd.to_string(),
            result: response.result,
        })
    }
}

/// Fail with [`Error::CommandFailed`] only on an explicit `ERROR` result.
///
/// A silent step is let through; the modem often answers late.
pub fn abort_on_error(cmd: &str, response: &Response) -> Result<()> {
    if response.result == Some(ResultCode::Error) {
        Err(Error::CommandFailed {
            command: cmd.to_string(),
            result: response.result,
        })
    } else {
        Ok(())
    }
}

/// Like [`abort_on_error`], but names the workflow step in the error.
pub fn abort_step_on_error(step: &'static str, cmd: &str, response: &Response) -> Result<()> {
    if response.result == Some(ResultCode::Error) {
        Err(Error::StepFailed {
            step,
            command: cmd.to_string(),
            result: response.result,
        })
    } else {
        Ok(())
    }
}

/// Issue a positioning query and decode its payload with `layout`.
pub async fn read_position(
    channel: &mut AtChannel,
    cmd: &str,
    layout: &GnssLayout,
) -> Result<PositionFix> {
    let response = channel.execute(cmd).await?;
    let payload = response.info_text();
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(Error::Decode("Invalid GNSS data".into()));
    }
    if !response.is_ok() {
        return Err(Error::CommandFailed {
            command: cmd.to_string(),
            result: response.result,
        });
    }
    gnss::decode_position(&payload, layout)
}
