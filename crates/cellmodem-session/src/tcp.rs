//! TCP receive session.
//!
//! ```text
//! Idle --start--> Listening --data URC--> DataPending --read--> Listening
//!                     |                                             |
//!                     +------------------cancel---------------------+--> Closed
//! ```
//!
//! The receiver reads raw lines between commands, so it is the only place
//! where unsolicited notifications are classified. Closing is explicit: when
//! the loop is cancelled the vendor's listener-stop command is issued.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use cellmodem_at::{Modem, Urc};
use cellmodem_core::delay::Delay;
use cellmodem_core::error::{Error, Result};
use cellmodem_core::events::ModemEvent;
use cellmodem_core::types::LocalAddress;

use crate::pause;
use crate::timing::SessionTiming;

/// Where a [`TcpReceiver`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    Idle,
    Listening,
    DataPending,
    Closed,
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TcpState::Idle => "idle",
            TcpState::Listening => "listening",
            TcpState::DataPending => "data pending",
            TcpState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Listens on a modem TCP port and surfaces inbound payloads.
pub struct TcpReceiver {
    state: TcpState,
    address: Option<LocalAddress>,
    delay: Arc<dyn Delay>,
    timing: SessionTiming,
}

impl TcpReceiver {
    pub fn new(delay: Arc<dyn Delay>, timing: SessionTiming) -> Self {
        TcpReceiver {
            state: TcpState::Idle,
            address: None,
            delay,
            timing,
        }
    }

    pub fn state(&self) -> TcpState {
        self.state
    }

    /// The listener address, once started.
    pub fn address(&self) -> Option<&LocalAddress> {
        self.address.as_ref()
    }

    fn transition(&mut self, next: TcpState) {
        debug!(from = %self.state, to = %next, "TCP receiver state");
        self.state = next;
    }

    /// Attach, start the listener and switch the modem to receive mode.
    ///
    /// Emits [`ModemEvent::Listening`] plus any receive-mode warnings.
    pub async fn start(
        &mut self,
        modem: &mut dyn Modem,
        apn: &str,
        port: u16,
        on_event: &mut (dyn FnMut(ModemEvent) + Send),
    ) -> Result<LocalAddress> {
        if self.state != TcpState::Idle {
            return Err(Error::InvalidParameter(format!(
                "TCP receiver cannot start while {}",
                self.state
            )));
        }

        let address = modem.tcp_server_setup(apn, port).await?;
        self.address = Some(address.clone());
        self.transition(TcpState::Listening);
        on_event(ModemEvent::Listening(address.clone()));

        for failure in modem.tcp_receive_start().await? {
            on_event(ModemEvent::Warning(failure));
        }
        Ok(address)
    }

    /// Read one line from the modem and act on it.
    ///
    /// Returns the event it produced, or `None` if the line was quiet or not
    /// a notification this vendor uses for socket data.
    pub async fn step(&mut self, modem: &mut dyn Modem) -> Result<Option<ModemEvent>> {
        if self.state != TcpState::Listening {
            return Err(Error::NotConnected);
        }

        let timeout = modem.channel().config().command_timeout;
        let Some(line) = modem.channel().next_line(timeout).await? else {
            return Ok(None);
        };

        match modem.urc_classifier().classify(&line) {
            Some(Urc::SocketClosed { socket }) => Ok(Some(ModemEvent::SocketClosed { socket })),
            Some(urc) => {
                self.transition(TcpState::DataPending);
                let data = modem.tcp_read(&urc).await;
                self.transition(TcpState::Listening);
                Ok(data?.map(ModemEvent::Data))
            }
            None => {
                debug!(%line, "ignoring line");
                Ok(None)
            }
        }
    }

    /// Poll until `cancel` fires, then close the listener.
    pub async fn run(
        &mut self,
        modem: &mut dyn Modem,
        cancel: &CancellationToken,
        on_event: &mut (dyn FnMut(ModemEvent) + Send),
    ) -> Result<()> {
        while !cancel.is_cancelled() {
            if let Some(event) = self.step(modem).await? {
                on_event(event);
            }
            if !pause(&*self.delay, self.timing.tcp_poll, cancel).await {
                break;
            }
        }
        self.close(modem).await
    }

    /// Stop the listener. A receiver that never started just becomes
    /// `Closed`.
    pub async fn close(&mut self, modem: &mut dyn Modem) -> Result<()> {
        match self.state {
            TcpState::Closed => return Ok(()),
            TcpState::Idle => {}
            TcpState::Listening | TcpState::DataPending => modem.tcp_server_close().await?,
        }
        self.transition(TcpState::Closed);
        Ok(())
    }
}
