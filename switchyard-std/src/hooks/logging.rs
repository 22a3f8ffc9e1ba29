//! Request logging.

use switchyard_core::{Exchange, Hook, HookResult, Interrupt};

/// Logs every dispatched request at `info`, along with the matched route.
///
/// As an after-hook it also records the final status.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl Hook for LoggingHook {
    async fn on_exchange(&self, exchange: &Exchange) -> Result<HookResult, Interrupt> {
        let request = exchange.request();
        tracing::info!(
            method = %request.method(),
            path = %request.path(),
            template = exchange.template(),
            status = exchange.response().status(),
            "dispatching request"
        );
        Ok(HookResult::Next)
    }
}
