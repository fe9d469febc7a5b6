//! Pacing between lookup calls.

use std::future::Future;
use std::time::Duration;

/// Waits between consecutive lookups.
pub trait Pacer {
    fn pause(&self) -> impl Future<Output = ()> + Send;
}

/// Sleep for a fixed duration after each call.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

impl Pacer for FixedDelay {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// Never waits. For tests and offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_delay_sleeps() {
        let start = std::time::Instant::now();
        FixedDelay::from_millis(50).pause().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn zero_delay_returns_immediately() {
        let start = std::time::Instant::now();
        FixedDelay::from_millis(0).pause().await;
        NoDelay.pause().await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
