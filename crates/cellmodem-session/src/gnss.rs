//! GNSS polling session.
//!
//! Configure the engine once, wait for it to settle, then read a position
//! every `gnss_interval` until cancelled. Each reading becomes either a
//! [`ModemEvent::Position`] or a [`ModemEvent::PositionError`]; only link
//! failures and vendors without GNSS reads end the loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use cellmodem_at::Modem;
use cellmodem_core::delay::Delay;
use cellmodem_core::error::{Error, Result};
use cellmodem_core::events::ModemEvent;

use crate::timing::SessionTiming;
use crate::pause;

/// Periodic positioning reader.
pub struct GnssPoller {
    delay: Arc<dyn Delay>,
    timing: SessionTiming,
}

impl GnssPoller {
    pub fn new(delay: Arc<dyn Delay>, timing: SessionTiming) -> Self {
        GnssPoller { delay, timing }
    }

    /// Run the vendor configuration sequence, reporting failed steps as
    /// warnings, then wait for the engine to settle.
    pub async fn configure(
        &self,
        modem: &mut dyn Modem,
        on_event: &mut (dyn FnMut(ModemEvent) + Send),
    ) -> Result<()> {
        for failure in modem.gnss_configure().await? {
            on_event(ModemEvent::Warning(failure));
        }
        self.delay.sleep(self.timing.gnss_settle).await;
        Ok(())
    }

    /// Take one reading.
    pub async fn poll_once(&self, modem: &mut dyn Modem) -> Result<ModemEvent> {
        match modem.gnss_read().await {
            Ok(fix) => Ok(ModemEvent::Position(fix)),
            Err(e @ (Error::Decode(_) | Error::CommandFailed { .. })) => {
                debug!(error = %e, "GNSS reading failed");
                Ok(ModemEvent::PositionError(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Configure, then poll until `cancel` fires.
    pub async fn run(
        &self,
        modem: &mut dyn Modem,
        cancel: &CancellationToken,
        on_event: &mut (dyn FnMut(ModemEvent) + Send),
    ) -> Result<()> {
        self.configure(modem, on_event).await?;
        self.poll(modem, cancel, on_event).await
    }

    /// Poll an already configured engine until `cancel` fires.
    pub async fn poll(
        &self,
        modem: &mut dyn Modem,
        cancel: &CancellationToken,
        on_event: &mut (dyn FnMut(ModemEvent) + Send),
    ) -> Result<()> {
        while !cancel.is_cancelled() {
            let event = self.poll_once(modem).await?;
            on_event(event);
            if !pause(&*self.delay, self.timing.gnss_interval, cancel).await {
                break;
            }
        }
        debug!("GNSS polling stopped");
        Ok(())
    }
}
