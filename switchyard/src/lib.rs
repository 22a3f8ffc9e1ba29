//! # switchyard - Declarative Request Routing
//!
//! Routes are declared as templates such as `/users/{}/posts?sort=:order`
//! and bound to async handlers. The handler's parameter types give `{}`
//! placeholders their patterns; captured values are converted before the
//! handler runs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! let table = RoutingTable::builder()
//!     .route(RouteDescriptor::new("/users/{}", |id: i64| async move {
//!         format!("user {id}")
//!     }))
//!     .route(RouteDescriptor::new("/users/me", || async { "me" }))
//!     .build();
//!
//! let engine = Engine::new(table);
//! let response = Response::new();
//! let routed = engine.process(Request::get("/users/42"), response.clone()).await?;
//! ```
//!
//! Literal routes are tried before routes with captures, so `/users/me`
//! wins over `/users/{}` whatever the registration order.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use switchyard_core::{
    // Handler arguments
    Arguments,
    // Error types
    BoxError,
    ContextKind,
    DispatchError,
    // Handler
    DynHandler,
    // Hook
    DynHook,
    EngineError,
    Exchange,
    FromArg,
    Handler,
    Hook,
    HookResult,
    IntoHookResult,
    // Response
    IntoReply,
    Interrupt,
    InvalidPatternError,
    // Request view
    MediaType,
    Method,
    MethodSet,
    ParamKind,
    ParamListMap,
    ParamMap,
    PendingCall,
    QueryParams,
    Reply,
    Request,
    RequestMappingError,
    RequestPath,
    Response,
    ResponseKind,
    RouteConfigError,
    ScalarArg,
    ScalarKind,
    Session,
    Shape,
    Signal,
    TemplateSyntaxError,
    UnknownMethod,
    Value,
    erase,
};

pub use switchyard_std::{
    config::{CacheConfig, RoutesConfig},
    descriptor::{HookDescriptor, RouteDescriptor, RouteDescriptorProvider},
    dispatch::{DispatchPipeline, Outcome},
    engine::Engine,
    table::{MatchCache, RouteEntry, RouteMatch, RouteTable, RoutingTable, RoutingTableBuilder, SimpleMatchCache},
};

/// Template parsing, pattern compilation and matching.
pub mod routing {
    pub use switchyard_std::{
        binding::{Binding, BindingPlan},
        matching::{Capture, Captures, matches},
        pattern::{
            CompiledCriteria, CompiledPattern, PathCriterion, PathKind, QueryCriterion, QueryKind,
            SymbolTable, WILDCARD, canonical_pattern,
        },
        template::{ParsedTemplate, PathTerminal, QueryTerminal, Term},
    };
}

/// Standard hook implementations.
pub mod hooks {
    #![allow(clippy::wildcard_imports)]
    pub use switchyard_std::hooks::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use switchyard_std::testing::*;
}

/// Prelude module - common imports for Switchyard.
///
/// # Usage
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        DispatchError,
        EngineError,
        // Engine
        Engine,
        Exchange,
        // Core traits
        Handler,
        Hook,
        HookDescriptor,
        HookResult,
        Interrupt,
        // Response
        IntoReply,
        Method,
        MethodSet,
        Request,
        Response,
        RouteConfigError,
        // Registration
        RouteDescriptor,
        RoutesConfig,
        RoutingTable,
        Signal,
    };
}
