//! Poll intervals and settle delays for the session loops.

use std::sync::Arc;
use std::time::Duration;

use cellmodem_at::Pacing;
use cellmodem_core::delay::{Delay, NoDelay, TokioDelay};

/// Timing applied by the session loops and vendor workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTiming {
    /// Wait between GNSS configuration and the first reading.
    pub gnss_settle: Duration,
    /// Wait between GNSS readings.
    pub gnss_interval: Duration,
    /// Wait between TCP receive polls.
    pub tcp_poll: Duration,
    /// Wait between SMS receive polls.
    pub sms_poll: Duration,
    /// Wait after activating the data context.
    pub attach_settle: Duration,
    /// Wait after opening a socket.
    pub open_settle: Duration,
}

impl SessionTiming {
    /// All waits zero.
    pub fn immediate() -> Self {
        SessionTiming {
            gnss_settle: Duration::ZERO,
            gnss_interval: Duration::ZERO,
            tcp_poll: Duration::ZERO,
            sms_poll: Duration::ZERO,
            attach_settle: Duration::ZERO,
            open_settle: Duration::ZERO,
        }
    }

    /// Workflow pacing for the vendor drivers, sleeping through `delay`.
    pub fn pacing(&self, delay: Arc<dyn Delay>) -> Pacing {
        Pacing {
            delay,
            attach_settle: self.attach_settle,
            open_settle: self.open_settle,
        }
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        SessionTiming {
            gnss_settle: Duration::from_millis(500),
            gnss_interval: Duration::from_secs(5),
            tcp_poll: Duration::from_millis(500),
            sms_poll: Duration::from_secs(1),
            attach_settle: Duration::from_secs(1),
            open_settle: Duration::from_secs(3),
        }
    }
}

/// The production delay source.
pub fn tokio_delay() -> Arc<dyn Delay> {
    Arc::new(TokioDelay)
}

/// A delay source that never waits.
pub fn no_delay() -> Arc<dyn Delay> {
    Arc::new(NoDelay)
}
