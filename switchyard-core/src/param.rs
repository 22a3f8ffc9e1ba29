//! Handler parameter kinds, as seen at route-registration time.

use std::fmt;

/// A scalar value type that can be bound from a captured string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `i8`
    Byte,
    /// `i16`
    Short,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `String`
    String,
}

impl ScalarKind {
    /// The Rust type name, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Byte => "i8",
            ScalarKind::Short => "i16",
            ScalarKind::Int => "i32",
            ScalarKind::Long => "i64",
            ScalarKind::Float => "f32",
            ScalarKind::Double => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
            ScalarKind::String => "String",
        }
    }
}

/// Framework objects a handler can ask for by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// The whole request.
    Request,
    /// The response sink.
    Response,
    /// The client session.
    Session,
    /// The request path.
    RequestPath,
    /// The query parameters.
    QueryParams,
    /// The requested media type.
    MediaType,
    /// First value of each query parameter.
    ParamMap,
    /// All values of each query parameter.
    ParamListMap,
}

/// How many values a bound parameter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Exactly one value.
    Required,
    /// Zero or one value (`Option<T>`).
    Optional,
    /// Any number of values (`Vec<T>`).
    List,
}

/// The declared kind of one handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Injected from the request context; consumes no capture.
    Context(ContextKind),
    /// Bound from a path or query capture.
    Value {
        /// Element type.
        scalar: ScalarKind,
        /// Cardinality.
        shape: Shape,
    },
}

impl ParamKind {
    /// A required scalar.
    pub const fn required(scalar: ScalarKind) -> Self {
        ParamKind::Value {
            scalar,
            shape: Shape::Required,
        }
    }

    /// Whether this parameter is injected rather than captured.
    pub const fn is_context(&self) -> bool {
        matches!(self, ParamKind::Context(_))
    }

    /// Element type of a captured parameter.
    pub const fn scalar(&self) -> Option<ScalarKind> {
        match self {
            ParamKind::Value { scalar, .. } => Some(*scalar),
            ParamKind::Context(_) => None,
        }
    }

    /// Whether this is a `Vec<T>` parameter.
    pub const fn is_list(&self) -> bool {
        matches!(
            self,
            ParamKind::Value {
                shape: Shape::List,
                ..
            }
        )
    }

    /// Whether the parameter can represent an absent value.
    ///
    /// `String` counts: it binds as empty when nothing was captured.
    pub const fn is_nullable(&self) -> bool {
        match self {
            ParamKind::Value { shape, scalar } => {
                !matches!(shape, Shape::Required) || matches!(scalar, ScalarKind::String)
            }
            ParamKind::Context(_) => true,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Context(kind) => write!(f, "{kind:?}"),
            ParamKind::Value { scalar, shape } => match shape {
                Shape::Required => f.write_str(scalar.type_name()),
                Shape::Optional => write!(f, "Option<{}>", scalar.type_name()),
                Shape::List => write!(f, "Vec<{}>", scalar.type_name()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_kinds() {
        assert!(!ParamKind::required(ScalarKind::Int).is_nullable());
        assert!(ParamKind::required(ScalarKind::String).is_nullable());
        assert!(
            ParamKind::Value {
                scalar: ScalarKind::Int,
                shape: Shape::Optional
            }
            .is_nullable()
        );
    }

    #[test]
    fn test_display() {
        let list = ParamKind::Value {
            scalar: ScalarKind::Long,
            shape: Shape::List,
        };
        assert_eq!(list.to_string(), "Vec<i64>");
        assert_eq!(ParamKind::Context(ContextKind::Session).to_string(), "Session");
    }
}
