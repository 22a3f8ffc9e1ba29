//! The dispatch pipeline for a matched route.
//!
//! ```text
//! BeforeHooks ──► Invoking ──► AfterHooks ──► Done
//!      │              │
//!      └── Stop / Signal ──────────────────► Done
//! ```
//!
//! - Arguments are converted up front, but the handler is only called once
//!   every before-hook let the request through.
//! - A before-hook returning `Stop` ends the pipeline silently.
//! - A `Redirect` or `Status` signal from a before-hook or the handler is
//!   applied to the response and ends the pipeline; `Halt` ends it as is.
//! - After-hooks run only after the handler returned normally. Their failures
//!   are logged and skipped.
//! - Any other error propagates to the caller.

use crate::{descriptor::HookDescriptor, table::RouteMatch};
use switchyard_core::{
    Arguments, DispatchError, Exchange, HookResult, Interrupt, Request, Response, ResponseKind,
    Signal,
};

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and its reply was written.
    Completed,
    /// A before-hook answered the request itself.
    ShortCircuited,
    /// A redirect was written.
    Redirected(String),
    /// The response status was overridden.
    StatusSet(u16),
    /// Processing stopped; the response was already written.
    Halted,
}

/// Runs hooks and the handler of a matched route.
#[derive(Debug, Clone, Default)]
pub struct DispatchPipeline {
    default_content_type: Option<String>,
}

impl DispatchPipeline {
    /// A pipeline with no default content type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type for routes that declare none and reply with a body.
    pub fn with_default_content_type(mut self, content_type: Option<String>) -> Self {
        self.default_content_type = content_type;
        self
    }

    /// Run the pipeline for `matched`.
    ///
    /// Arguments are bound before any hook runs, so a request whose captures
    /// do not coerce fails with [`DispatchError::Mapping`] without side effects.
    pub async fn invoke(
        &self,
        matched: &RouteMatch,
        request: Request,
        response: Response,
    ) -> Result<Outcome, DispatchError> {
        let entry = matched.entry();
        let values = entry
            .plan()
            .execute(entry.criteria(), matched.captures(), request.query());
        let call = entry
            .handler()
            .call_dyn(Arguments::new(request.clone(), response.clone(), values))?;

        let exchange = Exchange::new(
            request,
            response.clone(),
            entry.template().clone(),
            entry.tags().clone(),
        );

        for hook in entry.before() {
            match hook.hook().on_exchange_dyn(&exchange).await {
                Ok(HookResult::Next) => {}
                Ok(HookResult::Stop) => {
                    tracing::debug!(
                        hook = hook.name(),
                        template = exchange.template(),
                        "before-hook stopped the pipeline"
                    );
                    return Ok(Outcome::ShortCircuited);
                }
                Err(Interrupt::Signal(signal)) => {
                    tracing::debug!(hook = hook.name(), %signal, "before-hook signalled");
                    return Ok(apply(signal, &response));
                }
                Err(Interrupt::Error(err)) => return Err(DispatchError::Handler(err)),
            }
        }

        let content_type = match entry.content_type() {
            Some(content_type) => Some(content_type),
            None if entry.response_kind() == ResponseKind::Empty => None,
            None => self.default_content_type.as_deref(),
        };
        if let Some(content_type) = content_type {
            response.set_content_type(content_type);
        }

        match call().await {
            Ok(reply) => reply.write_to(&response),
            Err(Interrupt::Signal(signal)) => {
                tracing::debug!(template = exchange.template(), %signal, "handler signalled");
                return Ok(apply(signal, &response));
            }
            Err(Interrupt::Error(err)) => return Err(DispatchError::Handler(err)),
        }

        self.run_after(entry.after(), &exchange).await
    }

    async fn run_after(
        &self,
        hooks: &[HookDescriptor],
        exchange: &Exchange,
    ) -> Result<Outcome, DispatchError> {
        for hook in hooks {
            if !hook.runs_for_status(exchange.response().status()) {
                continue;
            }
            match hook.hook().on_exchange_dyn(exchange).await {
                Ok(HookResult::Next) => {}
                Ok(HookResult::Stop) => break,
                Err(Interrupt::Signal(signal)) => {
                    tracing::debug!(hook = hook.name(), %signal, "after-hook signalled");
                    return Ok(apply(signal, exchange.response()));
                }
                Err(Interrupt::Error(err)) => {
                    tracing::warn!(hook = hook.name(), error = %err, "after-hook failed");
                }
            }
        }
        Ok(Outcome::Completed)
    }
}

fn apply(signal: Signal, response: &Response) -> Outcome {
    match signal {
        Signal::Redirect(url) => {
            response.redirect(url.clone());
            Outcome::Redirected(url)
        }
        Signal::Status(code) => {
            response.set_status(code);
            Outcome::StatusSet(code)
        }
        Signal::Halt => Outcome::Halted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptor::RouteDescriptor,
        table::RoutingTable,
        testing::{CallLog, RecordingHook},
    };
    use switchyard_core::{Exchange, Reply};

    async fn run(route: RouteDescriptor, target: &str) -> (Result<Outcome, DispatchError>, Response) {
        let table = RoutingTable::builder().route(route).build();
        let request = Request::get(target);
        let matched = table.find(&request).unwrap().unwrap();
        let response = Response::new();
        let outcome = DispatchPipeline::new()
            .invoke(&matched, request, response.clone())
            .await;
        (outcome, response)
    }

    #[tokio::test]
    async fn test_completed_writes_reply() {
        let (outcome, response) = run(
            RouteDescriptor::new("/user/{}", |id: i32| async move { format!("user {id}") }),
            "/user/42",
        )
        .await;
        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert_eq!(response.body_text(), "user 42");
    }

    #[tokio::test]
    async fn test_hook_order_around_handler() {
        let log = CallLog::new();
        let handler_log = log.clone();
        let route = RouteDescriptor::new("/a", move || {
            let log = handler_log.clone();
            async move { log.record("handler") }
        })
        .before(RecordingHook::next("second", &log).order(2))
        .before(RecordingHook::next("first", &log).order(1))
        .after(RecordingHook::next("after", &log));
        let (outcome, _) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert_eq!(log.entries(), ["first", "second", "handler", "after"]);
    }

    #[tokio::test]
    async fn test_stop_skips_handler_and_after_hooks() {
        let log = CallLog::new();
        let handler_log = log.clone();
        let route = RouteDescriptor::new("/a", move || {
            let log = handler_log.clone();
            async move { log.record("handler") }
        })
        .before(RecordingHook::stop("guard", &log))
        .after(RecordingHook::next("after", &log));
        let (outcome, _) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::ShortCircuited);
        assert_eq!(log.entries(), ["guard"]);
    }

    #[tokio::test]
    async fn test_stop_skips_handler_body() {
        let log = CallLog::new();
        let handler_log = log.clone();
        let route = RouteDescriptor::new("/a", move || {
            handler_log.record("handler");
            std::future::ready("body")
        })
        .before(RecordingHook::stop("guard", &log));
        let (outcome, response) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::ShortCircuited);
        assert_eq!(log.entries(), ["guard"]);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn test_signal_skips_handler_body() {
        let log = CallLog::new();
        let handler_log = log.clone();
        let route = RouteDescriptor::new("/a", move || {
            handler_log.record("handler");
            std::future::ready("body")
        })
        .before(RecordingHook::signal("auth", &log, Signal::redirect("/login")));
        let (outcome, _) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Redirected("/login".into()));
        assert_eq!(log.entries(), ["auth"]);
    }

    #[tokio::test]
    async fn test_before_hook_redirect() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/a", || async { "body" })
            .before(RecordingHook::signal("auth", &log, Signal::redirect("/login")))
            .after(RecordingHook::next("after", &log));
        let (outcome, response) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Redirected("/login".into()));
        assert_eq!(response.status(), 302);
        assert_eq!(response.location().as_deref(), Some("/login"));
        assert!(response.body().is_empty());
        assert_eq!(log.entries(), ["auth"]);
    }

    #[tokio::test]
    async fn test_before_hook_halt() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/a", || async { "body" })
            .before(RecordingHook::signal("halt", &log, Signal::Halt))
            .after(RecordingHook::next("after", &log));
        let (outcome, response) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Halted);
        assert!(response.body().is_empty());
        assert_eq!(log.entries(), ["halt"]);
    }

    #[tokio::test]
    async fn test_handler_status_signal_skips_after_hooks() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/a", || async { Err::<String, _>(Signal::status(404)) })
            .after(RecordingHook::next("after", &log));
        let (outcome, response) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::StatusSet(404));
        assert_eq!(response.status(), 404);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let route = RouteDescriptor::new("/a", || async {
            Err::<Reply, _>(Interrupt::error(std::fmt::Error))
        });
        let (outcome, _) = run(route, "/a").await;
        assert!(matches!(outcome, Err(DispatchError::Handler(_))));
    }

    #[tokio::test]
    async fn test_before_hook_error_propagates() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/a", || async {})
            .before(RecordingHook::fail("broken", &log));
        let (outcome, _) = run(route, "/a").await;
        assert!(matches!(outcome, Err(DispatchError::Handler(_))));
    }

    #[tokio::test]
    async fn test_after_hook_failure_is_skipped() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/a", || async {})
            .after(RecordingHook::fail("broken", &log).order(1))
            .after(RecordingHook::next("after", &log).order(2));
        let (outcome, _) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert_eq!(log.entries(), ["broken", "after"]);
    }

    #[tokio::test]
    async fn test_after_hook_status_filters() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/a", |response: Response| async move {
            response.set_status(500);
        })
        .after(RecordingHook::next("success", &log).only_on_success())
        .after(RecordingHook::next("error", &log).only_on_error());
        let (outcome, _) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert_eq!(log.entries(), ["error"]);
    }

    #[tokio::test]
    async fn test_mapping_error_runs_nothing() {
        let log = CallLog::new();
        let route = RouteDescriptor::new("/n/{-?[0-9]+}", |_n: i8| async {})
            .before(RecordingHook::next("before", &log));
        let (outcome, _) = run(route, "/n/1000").await;
        assert!(matches!(outcome, Err(DispatchError::Mapping(_))));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_route_content_type() {
        let route = RouteDescriptor::new("/a", || async { "{}" }).content_type("application/json");
        let (_, response) = run(route, "/a").await;
        assert_eq!(response.content_type().as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_default_content_type_skips_empty_replies() {
        let table = RoutingTable::builder()
            .route(RouteDescriptor::new("/text", || async { "hi" }))
            .route(RouteDescriptor::new("/empty", |response: Response| async move {
                response.set_status(204);
            }))
            .build();
        let pipeline = DispatchPipeline::new().with_default_content_type(Some("text/html".into()));

        for (target, expected) in [("/text", Some("text/html")), ("/empty", None)] {
            let request = Request::get(target);
            let matched = table.find(&request).unwrap().unwrap();
            let response = Response::new();
            pipeline.invoke(&matched, request, response.clone()).await.unwrap();
            assert_eq!(response.content_type().as_deref(), expected, "{target}");
        }
    }

    #[tokio::test]
    async fn test_hook_sees_route_identity() {
        let route = RouteDescriptor::new("/a", || async {})
            .tag("secure")
            .before(HookDescriptor::new(|ex: &Exchange| {
                assert_eq!(ex.template(), "/a");
                ex.has_tag("secure")
            }));
        let (outcome, _) = run(route, "/a").await;
        assert_eq!(outcome.unwrap(), Outcome::Completed);
    }
}
