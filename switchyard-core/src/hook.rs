//! # Hooks
//!
//! Callbacks that run before or after a route's handler. A hook sees the
//! whole [`Exchange`] (request, response and the matched route's identity)
//! and steers the pipeline through its result:
//!
//! - `Ok(HookResult::Next)` continues.
//! - `Ok(HookResult::Stop)` ends the pipeline silently; the hook answered.
//! - `Err(Interrupt::Signal(..))` redirects, overrides the status or halts.
//! - `Err(Interrupt::Error(..))` fails the request.
//!
//! Plain closures `Fn(&Exchange) -> R` where `R: IntoHookResult` are hooks.

use crate::{
    request::Request,
    response::Response,
    signal::{HookResult, IntoHookResult, Interrupt},
};
use std::{future::Future, pin::Pin, sync::Arc};

/// One request/response pair flowing through the pipeline of a matched route.
#[derive(Debug, Clone)]
pub struct Exchange {
    request: Request,
    response: Response,
    template: Arc<str>,
    tags: Arc<[String]>,
}

impl Exchange {
    /// Bundle a request and response for the route `template`.
    pub fn new(
        request: Request,
        response: Response,
        template: Arc<str>,
        tags: Arc<[String]>,
    ) -> Self {
        Self {
            request,
            response,
            template,
            tags,
        }
    }

    /// The request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response sink.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Template of the matched route.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Tags of the matched route.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether the matched route carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A before or after callback of the dispatch pipeline.
///
/// This trait uses native `async fn` for static dispatch.
/// Route tables store hooks as [`DynHook`] trait objects.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement `on_exchange`, or be a closure `Fn(&Exchange) -> impl IntoHookResult`."
)]
pub trait Hook: Send + Sync + 'static {
    /// Called once per dispatched request.
    fn on_exchange(
        &self,
        exchange: &Exchange,
    ) -> impl Future<Output = Result<HookResult, Interrupt>> + Send;
}

/// Boxed future returned by [`DynHook`].
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<HookResult, Interrupt>> + Send + 'a>>;

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook: Send + Sync + 'static {
    /// Called once per dispatched request (dynamic dispatch version).
    fn on_exchange_dyn<'a>(&'a self, exchange: &'a Exchange) -> HookFuture<'a>;
}

impl<T: Hook> DynHook for T {
    fn on_exchange_dyn<'a>(&'a self, exchange: &'a Exchange) -> HookFuture<'a> {
        Box::pin(self.on_exchange(exchange))
    }
}

impl Hook for Arc<dyn DynHook> {
    async fn on_exchange(&self, exchange: &Exchange) -> Result<HookResult, Interrupt> {
        self.on_exchange_dyn(exchange).await
    }
}

impl<F, R> Hook for F
where
    F: Fn(&Exchange) -> R + Send + Sync + 'static,
    R: IntoHookResult,
{
    async fn on_exchange(&self, exchange: &Exchange) -> Result<HookResult, Interrupt> {
        (self)(exchange).into_hook_result()
    }
}
