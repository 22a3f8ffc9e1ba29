//! Argument extraction for handlers.
//!
//! A route's binding plan turns a match into [`Arguments`]: one raw [`Value`]
//! per declared handler parameter. Each parameter type then pulls its own
//! value out through [`FromArg`], parsing captured text where needed.
//!
//! - Scalars (`i8`..`i64`, `f32`, `f64`, `bool`, `char`, `String`) parse one value.
//! - `Option<T>` is `None` when nothing was captured.
//! - `Vec<T>` takes every value of a query parameter.
//! - Context types (`Request`, `Response`, `Session`, ...) are cloned from the exchange.

use crate::{
    error::RequestMappingError,
    param::{ContextKind, ParamKind, ScalarKind, Shape},
    request::{MediaType, ParamListMap, ParamMap, QueryParams, Request, RequestPath, Session},
    response::Response,
};

/// The raw value bound to one handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Nothing was captured.
    Absent,
    /// One captured string.
    Single(String),
    /// Every value of a query parameter.
    Multi(Vec<String>),
    /// The parameter is injected from the context.
    Context,
}

/// Everything a handler's parameters are extracted from.
#[derive(Debug, Clone)]
pub struct Arguments {
    request: Request,
    response: Response,
    values: Vec<Value>,
}

impl Arguments {
    /// Bundle a request, its response and the bound values.
    pub fn new(request: Request, response: Response, values: Vec<Value>) -> Self {
        Self {
            request,
            response,
            values,
        }
    }

    /// The request being handled.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response being written.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// The raw value for parameter `index`.
    pub fn value(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&Value::Absent)
    }

    /// All raw values in parameter order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A type that can be extracted as a handler parameter.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a handler parameter",
    label = "missing `FromArg` implementation",
    note = "Handler parameters must be scalars, `Option`/`Vec` of scalars, or a context type such as `Request`."
)]
pub trait FromArg: Sized + Send + 'static {
    /// The parameter kind reported to the route compiler.
    const KIND: ParamKind;

    /// Extract parameter `index` from `args`.
    fn from_arg(args: &Arguments, index: usize) -> Result<Self, RequestMappingError>;
}

/// A scalar that parses from one captured string.
pub trait ScalarArg: Sized + Send + 'static {
    /// The scalar kind reported to the route compiler.
    const SCALAR: ScalarKind;

    /// Parse captured text, `None` if it is not a valid value.
    fn parse_scalar(text: &str) -> Option<Self>;
}

fn parse<T: ScalarArg>(index: usize, text: &str) -> Result<T, RequestMappingError> {
    T::parse_scalar(text).ok_or_else(|| RequestMappingError {
        parameter: index,
        value: text.to_string(),
        target: T::SCALAR.type_name(),
    })
}

macro_rules! impl_scalar_arg {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl ScalarArg for $ty {
                const SCALAR: ScalarKind = ScalarKind::$kind;

                fn parse_scalar(text: &str) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )+
    };
}

impl_scalar_arg!(
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

impl ScalarArg for bool {
    const SCALAR: ScalarKind = ScalarKind::Bool;

    fn parse_scalar(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

impl ScalarArg for char {
    const SCALAR: ScalarKind = ScalarKind::Char;

    fn parse_scalar(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl ScalarArg for String {
    const SCALAR: ScalarKind = ScalarKind::String;

    fn parse_scalar(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

macro_rules! impl_scalar_from_arg {
    ($($ty:ty),+) => {
        $(
            impl FromArg for $ty {
                const KIND: ParamKind = ParamKind::required(<$ty as ScalarArg>::SCALAR);

                fn from_arg(args: &Arguments, index: usize) -> Result<Self, RequestMappingError> {
                    match args.value(index) {
                        Value::Single(text) => parse(index, text),
                        Value::Multi(values) => parse(index, values.first().map(String::as_str).unwrap_or("")),
                        Value::Absent | Value::Context => parse(index, ""),
                    }
                }
            }
        )+
    };
}

impl_scalar_from_arg!(i8, i16, i32, i64, f32, f64, bool, char, String);

impl<T: ScalarArg> FromArg for Option<T> {
    const KIND: ParamKind = ParamKind::Value {
        scalar: T::SCALAR,
        shape: Shape::Optional,
    };

    fn from_arg(args: &Arguments, index: usize) -> Result<Self, RequestMappingError> {
        match args.value(index) {
            Value::Single(text) => parse(index, text).map(Some),
            Value::Multi(values) => values.first().map(|v| parse(index, v)).transpose(),
            Value::Absent | Value::Context => Ok(None),
        }
    }
}

impl<T: ScalarArg> FromArg for Vec<T> {
    const KIND: ParamKind = ParamKind::Value {
        scalar: T::SCALAR,
        shape: Shape::List,
    };

    fn from_arg(args: &Arguments, index: usize) -> Result<Self, RequestMappingError> {
        match args.value(index) {
            Value::Single(text) => Ok(vec![parse(index, text)?]),
            Value::Multi(values) => values.iter().map(|v| parse(index, v)).collect(),
            Value::Absent | Value::Context => Ok(Vec::new()),
        }
    }
}

macro_rules! impl_context_from_arg {
    ($($ty:ty => $kind:ident |$args:ident| $extract:expr;)+) => {
        $(
            impl FromArg for $ty {
                const KIND: ParamKind = ParamKind::Context(ContextKind::$kind);

                fn from_arg($args: &Arguments, _index: usize) -> Result<Self, RequestMappingError> {
                    Ok($extract)
                }
            }
        )+
    };
}

impl_context_from_arg! {
    Request => Request |args| args.request().clone();
    Response => Response |args| args.response().clone();
    Session => Session |args| args.request().session().clone();
    RequestPath => RequestPath |args| args.request().path().clone();
    QueryParams => QueryParams |args| args.request().query().clone();
    MediaType => MediaType |args| args.request().media_type().clone();
    ParamMap => ParamMap |args| args.request().query().to_param_map();
    ParamListMap => ParamListMap |args| args.request().query().to_param_list_map();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: Vec<Value>) -> Arguments {
        Arguments::new(Request::get("/x?a=1&a=2"), Response::new(), values)
    }

    #[test]
    fn test_scalar_parse() {
        let args = args(vec![Value::Single("42".into()), Value::Single("TRUE".into())]);
        assert_eq!(i32::from_arg(&args, 0).unwrap(), 42);
        assert!(bool::from_arg(&args, 1).unwrap());
    }

    #[test]
    fn test_scalar_parse_failure_is_mapping_error() {
        let args = args(vec![Value::Single("99999".into())]);
        let err = i8::from_arg(&args, 0).unwrap_err();
        assert_eq!(err.parameter, 0);
        assert_eq!(err.value, "99999");
        assert_eq!(err.target, "i8");
    }

    #[test]
    fn test_absent_values() {
        let args = args(vec![Value::Absent, Value::Absent, Value::Absent]);
        assert_eq!(String::from_arg(&args, 0).unwrap(), "");
        assert_eq!(Option::<i32>::from_arg(&args, 1).unwrap(), None);
        assert!(Vec::<i64>::from_arg(&args, 2).unwrap().is_empty());
        assert!(i32::from_arg(&args, 0).is_err());
    }

    #[test]
    fn test_list_values() {
        let args = args(vec![Value::Multi(vec!["1".into(), "2".into()])]);
        assert_eq!(Vec::<i16>::from_arg(&args, 0).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_context_values() {
        let args = args(vec![Value::Context]);
        assert_eq!(ParamMap::from_arg(&args, 0).unwrap().0["a"], "1");
        assert_eq!(ParamListMap::from_arg(&args, 0).unwrap().0["a"], ["1", "2"]);
        assert_eq!(RequestPath::from_arg(&args, 0).unwrap().to_string(), "/x");
        assert_eq!(<Request as FromArg>::KIND, ParamKind::Context(ContextKind::Request));
    }

    #[test]
    fn test_char_requires_one_character() {
        assert_eq!(char::parse_scalar("x"), Some('x'));
        assert_eq!(char::parse_scalar("xy"), None);
        assert_eq!(char::parse_scalar(""), None);
    }
}
