//! Time-limited hooks.

use std::time::Duration;
use switchyard_core::{Exchange, Hook, HookResult, Interrupt};
use tokio::time::timeout;

/// Returned when a wrapped hook does not finish in time.
#[derive(Debug, Clone, thiserror::Error)]
#[error("hook did not finish within {0:?}")]
pub struct TimeoutError(pub Duration);

/// Wraps a hook and fails the request if it runs longer than `duration`.
pub struct TimeoutHook<H> {
    inner: H,
    duration: Duration,
}

impl<H> TimeoutHook<H> {
    /// Limit `inner` to `duration`.
    pub fn new(inner: H, duration: Duration) -> Self {
        Self { inner, duration }
    }
}

impl<H: Hook> Hook for TimeoutHook<H> {
    async fn on_exchange(&self, exchange: &Exchange) -> Result<HookResult, Interrupt> {
        match timeout(self.duration, self.inner.on_exchange(exchange)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(template = exchange.template(), duration = ?self.duration, "hook timed out");
                Err(Interrupt::error(TimeoutError(self.duration)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use switchyard_core::{Request, Response};

    struct Slow;

    impl Hook for Slow {
        async fn on_exchange(&self, _: &Exchange) -> Result<HookResult, Interrupt> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(HookResult::Next)
        }
    }

    fn exchange() -> Exchange {
        Exchange::new(
            Request::get("/a"),
            Response::new(),
            Arc::from("/a"),
            Arc::from(Vec::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_hook_times_out() {
        let hook = TimeoutHook::new(Slow, Duration::from_millis(10));
        let result = hook.on_exchange(&exchange()).await;
        match result {
            Err(Interrupt::Error(err)) => assert!(err.is::<TimeoutError>()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fast_hook_passes_through() {
        let hook = TimeoutHook::new(|_: &Exchange| false, Duration::from_secs(1));
        assert_eq!(hook.on_exchange(&exchange()).await.unwrap(), HookResult::Stop);
    }
}
