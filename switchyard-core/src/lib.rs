//! # switchyard-core
//!
//! Core contracts for the Switchyard request router.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! transports and extensions that do not need the routing engine in
//! `switchyard-std`.
//!
//! # Contents
//!
//! ## Request view and response sink
//!
//! [`Request`] is the read-only view the router works on: method, path
//! segments, query values, requested media type and session. [`Response`]
//! is the writable sink shared by hooks, the handler and the transport.
//!
//! ## Handlers ([`Handler`])
//!
//! Async functions whose parameters implement [`FromArg`]. Their parameter
//! kinds are known at registration, which is what lets `{}` placeholders
//! take their pattern from the handler signature.
//!
//! ## Hooks ([`Hook`])
//!
//! Before/after callbacks. They return [`HookResult`] or raise a [`Signal`]
//! through [`Interrupt`]; control flow never relies on unwinding.
//!
//! # Error Types
//!
//! - [`EngineError`] - Top-level error type
//! - [`RouteConfigError`] - Fatal route configuration errors
//! - [`DispatchError`] - Errors surfaced by dispatch

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod handler;
mod hook;
mod method;
mod param;
mod request;
mod response;
mod signal;

// Re-exports
pub use context::{Arguments, FromArg, ScalarArg, Value};
pub use error::{
    BoxError, DispatchError, EngineError, InvalidPatternError, RequestMappingError,
    RouteConfigError, TemplateSyntaxError,
};
pub use handler::{DynHandler, Handler, HandlerFuture, PendingCall, erase};
pub use hook::{DynHook, Exchange, Hook, HookFuture};
pub use method::{Method, MethodSet, UnknownMethod};
pub use param::{ContextKind, ParamKind, ScalarKind, Shape};
pub use request::{MediaType, ParamListMap, ParamMap, QueryParams, Request, RequestPath, Session};
pub use response::{IntoReply, Reply, Response, ResponseKind};
pub use signal::{HookResult, IntoHookResult, Interrupt, Signal};
