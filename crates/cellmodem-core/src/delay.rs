//! Injected delay used by polling loops and workflow settle times.
//!
//! Production code sleeps on the tokio timer through [`TokioDelay`]. Tests
//! substitute [`NoDelay`] (or their own counting implementation) so that
//! polling loops and multi-step workflows run deterministically.

use async_trait::async_trait;
use std::time::Duration;

/// A source of inter-step delays.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Wait for `duration` before returning.
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_delay_advances_clock() {
        let start = tokio::time::Instant::now();
        TokioDelay.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn no_delay_returns_immediately() {
        let start = std::time::Instant::now();
        NoDelay.sleep(Duration::from_secs(3600)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
