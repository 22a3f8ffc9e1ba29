//! Testing utilities.
//!
//! - [`CallLog`]: a shared, ordered record of what ran
//! - [`RecordingHook`]: a hook that writes its name to a [`CallLog`] and then
//!   returns a programmed result
//! - [`recording_route`]: a route whose handler writes its name to a [`CallLog`]
//! - [`request`]: a request from a method and target
//!
//! # Example
//!
//! ```rust,ignore
//! let log = CallLog::new();
//! let route = RouteDescriptor::new("/a", || async {})
//!     .before(RecordingHook::next("auth", &log))
//!     .after(RecordingHook::next("audit", &log));
//!
//! // dispatch a request...
//! assert_eq!(log.entries(), ["auth", "audit"]);
//! ```

use crate::descriptor::{HookDescriptor, RouteDescriptor};
use futures::future::ready;
use parking_lot::Mutex;
use std::sync::Arc;
use switchyard_core::{Exchange, Hook, HookResult, Interrupt, Method, Request, Signal};

/// An ordered list of names, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name`.
    pub fn record(&self, name: impl Into<String>) {
        self.entries.lock().push(name.into());
    }

    /// Everything recorded so far, in order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[derive(Debug, Clone)]
enum Programmed {
    Result(HookResult),
    Signal(Signal),
    Fail,
}

/// The error a failing [`RecordingHook`] returns.
#[derive(Debug, thiserror::Error)]
#[error("recording hook `{0}` failed")]
pub struct RecordedFailure(pub String);

/// A hook that records its name and returns a programmed result.
///
/// The constructors return a ready [`HookDescriptor`] named after the hook,
/// so ordering and filters can be chained on.
#[derive(Debug, Clone)]
pub struct RecordingHook {
    name: String,
    log: CallLog,
    programmed: Programmed,
}

impl RecordingHook {
    fn descriptor(name: &str, log: &CallLog, programmed: Programmed) -> HookDescriptor {
        let hook = Self {
            name: name.to_owned(),
            log: log.clone(),
            programmed,
        };
        HookDescriptor::new(hook).named(name)
    }

    /// Records and continues.
    pub fn next(name: &str, log: &CallLog) -> HookDescriptor {
        Self::descriptor(name, log, Programmed::Result(HookResult::Next))
    }

    /// Records and stops the pipeline.
    pub fn stop(name: &str, log: &CallLog) -> HookDescriptor {
        Self::descriptor(name, log, Programmed::Result(HookResult::Stop))
    }

    /// Records and raises `signal`.
    pub fn signal(name: &str, log: &CallLog, signal: Signal) -> HookDescriptor {
        Self::descriptor(name, log, Programmed::Signal(signal))
    }

    /// Records and fails with [`RecordedFailure`].
    pub fn fail(name: &str, log: &CallLog) -> HookDescriptor {
        Self::descriptor(name, log, Programmed::Fail)
    }
}

impl Hook for RecordingHook {
    fn on_exchange(
        &self,
        _exchange: &Exchange,
    ) -> impl Future<Output = Result<HookResult, Interrupt>> + Send {
        self.log.record(self.name.clone());
        ready(match &self.programmed {
            Programmed::Result(result) => Ok(*result),
            Programmed::Signal(signal) => Err(Interrupt::Signal(signal.clone())),
            Programmed::Fail => Err(Interrupt::error(RecordedFailure(self.name.clone()))),
        })
    }
}

/// A route on `template` whose handler records `name` and replies with it.
pub fn recording_route(template: &str, name: &str, log: &CallLog) -> RouteDescriptor {
    let log = log.clone();
    let name = name.to_owned();
    RouteDescriptor::new(template, move || {
        let log = log.clone();
        let name = name.clone();
        async move {
            log.record(name.as_str());
            name
        }
    })
}

/// A request for `target` (path plus optional query) with `method`.
pub fn request(method: Method, target: &str) -> Request {
    Request::new(method, target)
}
