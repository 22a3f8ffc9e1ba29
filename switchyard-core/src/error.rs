//! Error types for Switchyard.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`TemplateSyntaxError`] - Malformed route template, detected at parse time
//! - [`RouteConfigError`] - Unresolvable route configuration, fatal to table build
//! - [`InvalidPatternError`] - A symbol was defined with a bad regex
//! - [`RequestMappingError`] - A captured value failed to coerce at request time
//! - [`DispatchError`] - Errors surfaced by the dispatch pipeline
//! - [`EngineError`] - Top-level error type

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Switchyard operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The routing table could not be built.
    #[error("route configuration error: {0}")]
    Config(#[from] RouteConfigError),

    /// A matched request failed during dispatch.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// A route template string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid route template `{template}`: {reason}")]
pub struct TemplateSyntaxError {
    /// The offending template.
    pub template: String,
    /// What was wrong with it.
    pub reason: String,
}

impl TemplateSyntaxError {
    /// Create a new syntax error for `template`.
    pub fn new(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            reason: reason.into(),
        }
    }
}

/// Errors detected while compiling routes. These abort table construction.
#[derive(Error, Debug)]
pub enum RouteConfigError {
    /// The template itself is malformed.
    #[error(transparent)]
    Template(#[from] TemplateSyntaxError),

    /// A `{}` placeholder has no unclaimed handler parameter left.
    #[error("placeholder `{{}}` at position {position} in `{template}` has no matching handler parameter")]
    UnresolvedPlaceholder {
        /// Route template.
        template: String,
        /// Zero-based index of the handler value parameter the placeholder needed.
        position: usize,
    },

    /// A handler parameter type has no canonical pattern.
    #[error("handler parameter of type `{kind}` in `{template}` has no canonical pattern")]
    UnmappableType {
        /// Route template.
        template: String,
        /// Printable parameter kind.
        kind: String,
    },

    /// A `:symbol` is not defined in the symbol table.
    #[error("unknown symbol `:{symbol}` in `{template}`")]
    UnknownSymbol {
        /// Route template.
        template: String,
        /// Symbol name without the leading colon.
        symbol: String,
    },

    /// A `{...}` pattern does not compile.
    #[error("invalid pattern `{pattern}` in `{template}`: {reason}")]
    InvalidRegex {
        /// Route template.
        template: String,
        /// Regex source as written.
        pattern: String,
        /// Regex engine message.
        reason: String,
    },

    /// An accepted media type pattern does not compile.
    #[error("invalid accept pattern `{pattern}` in `{template}`")]
    InvalidAcceptPattern {
        /// Route template.
        template: String,
        /// Pattern as written.
        pattern: String,
    },

    /// More than one `**` appears in one template.
    #[error("template `{0}` contains more than one `**` segment")]
    DuplicateMultiWildcard(String),

    /// A handler parameter maps to neither a context type nor a capture.
    #[error("handler parameter {index} in `{template}` cannot be bound to any capture")]
    UnmappedParameter {
        /// Route template.
        template: String,
        /// Zero-based index in the handler's declared parameters.
        index: usize,
    },

    /// A list parameter was mapped to a single path segment.
    #[error("list parameter {index} in `{template}` is mapped to path segment {segment}; only query criteria bind lists")]
    ListBoundToPath {
        /// Route template.
        template: String,
        /// Zero-based index in the handler's declared parameters.
        index: usize,
        /// Template segment index.
        segment: usize,
    },

    /// A non-nullable scalar was mapped to an optional query criterion.
    #[error("parameter {index} in `{template}` is bound to optional query `{name}` and must be `Option`, `Vec` or `String`")]
    OptionalRequiresNullable {
        /// Route template.
        template: String,
        /// Zero-based index in the handler's declared parameters.
        index: usize,
        /// Query parameter name.
        name: String,
    },
}

/// A symbol was defined with a pattern that does not compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pattern `{pattern}` for symbol `{symbol}`: {reason}")]
pub struct InvalidPatternError {
    /// Symbol name.
    pub symbol: String,
    /// Pattern as written.
    pub pattern: String,
    /// Regex engine message.
    pub reason: String,
}

/// A captured value could not be coerced to its target type.
///
/// Recoverable per request; transports should answer with a client error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot map `{value}` to {target} for parameter {parameter}")]
pub struct RequestMappingError {
    /// Zero-based index in the handler's declared parameters.
    pub parameter: usize,
    /// The raw captured text.
    pub value: String,
    /// Printable target type.
    pub target: &'static str,
}

/// Errors surfaced by `DispatchPipeline::invoke`.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Argument binding failed.
    #[error(transparent)]
    Mapping(#[from] RequestMappingError),

    /// A hook or handler failed with an error that is not a control signal.
    #[error("handler error: {0}")]
    Handler(#[source] BoxError),
}

impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        DispatchError::Handler(err)
    }
}

impl DispatchError {
    /// Whether this error came from bad request data rather than the handler.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DispatchError::Mapping(_))
    }
}
