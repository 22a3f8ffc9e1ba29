//! Pipeline control signals.
//!
//! Hooks and handlers steer the dispatch pipeline by returning values, not by
//! unwinding. The error side of every hook and handler result is an
//! [`Interrupt`]: either a deliberate [`Signal`] or a real failure.

use crate::error::{BoxError, RequestMappingError};
use std::fmt;

/// Result of a before-hook indicating whether the pipeline continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Continue with the next hook or the handler.
    Next,
    /// The hook already answered the request; end the pipeline silently.
    Stop,
}

/// A deliberate early exit from the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Send a redirect to the given location and finish.
    Redirect(String),
    /// Set the response status and finish.
    Status(u16),
    /// Stop immediately; the response has already been written.
    Halt,
}

impl Signal {
    /// Redirect to `url`.
    pub fn redirect(url: impl Into<String>) -> Self {
        Signal::Redirect(url.into())
    }

    /// Finish with status `code`.
    pub const fn status(code: u16) -> Self {
        Signal::Status(code)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Redirect(url) => write!(f, "redirect to {url}"),
            Signal::Status(code) => write!(f, "status {code}"),
            Signal::Halt => f.write_str("halt"),
        }
    }
}

/// The error side of a hook or handler result.
#[derive(Debug)]
pub enum Interrupt {
    /// A control signal for the pipeline.
    Signal(Signal),
    /// A failure that propagates to the caller of the pipeline.
    Error(BoxError),
}

impl Interrupt {
    /// Wrap any error as a failure.
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Interrupt::Error(Box::new(err))
    }

    /// The signal, if this is one.
    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            Interrupt::Signal(signal) => Some(signal),
            Interrupt::Error(_) => None,
        }
    }
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Signal(signal) => write!(f, "signal: {signal}"),
            Interrupt::Error(err) => write!(f, "{err}"),
        }
    }
}

impl From<Signal> for Interrupt {
    fn from(signal: Signal) -> Self {
        Interrupt::Signal(signal)
    }
}

impl From<BoxError> for Interrupt {
    fn from(err: BoxError) -> Self {
        Interrupt::Error(err)
    }
}

impl From<RequestMappingError> for Interrupt {
    fn from(err: RequestMappingError) -> Self {
        Interrupt::Error(Box::new(err))
    }
}

impl From<std::convert::Infallible> for Interrupt {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Trait for converting a before-hook's return value into a [`HookResult`].
///
/// # Default Implementations
///
/// - `()` → Next
/// - `bool` → `true` = Next, `false` = Stop
/// - `HookResult` → As is
/// - `Result<T, E>` → Delegates to inner `T` or interrupts with `E`
pub trait IntoHookResult {
    /// Convert the output into propagation behavior or an interrupt.
    fn into_hook_result(self) -> Result<HookResult, Interrupt>;
}

impl IntoHookResult for () {
    fn into_hook_result(self) -> Result<HookResult, Interrupt> {
        Ok(HookResult::Next)
    }
}

impl IntoHookResult for bool {
    fn into_hook_result(self) -> Result<HookResult, Interrupt> {
        Ok(if self { HookResult::Next } else { HookResult::Stop })
    }
}

impl IntoHookResult for HookResult {
    fn into_hook_result(self) -> Result<HookResult, Interrupt> {
        Ok(self)
    }
}

impl<T, E> IntoHookResult for Result<T, E>
where
    T: IntoHookResult,
    E: Into<Interrupt>,
{
    fn into_hook_result(self) -> Result<HookResult, Interrupt> {
        match self {
            Ok(t) => t.into_hook_result(),
            Err(e) => Err(e.into()),
        }
    }
}
