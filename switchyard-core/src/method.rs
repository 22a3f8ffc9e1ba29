//! HTTP methods and method sets.

use bitflags::bitflags;
use std::{fmt, str::FromStr};

/// A request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `OPTIONS`
    Options,
}

impl Method {
    /// The canonical upper-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request method `{0}`")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "PATCH" => Ok(Method::Patch),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

bitflags! {
    /// The set of methods a route accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodSet: u8 {
        /// `GET`
        const GET = 1 << 0;
        /// `POST`
        const POST = 1 << 1;
        /// `PUT`
        const PUT = 1 << 2;
        /// `DELETE`
        const DELETE = 1 << 3;
        /// `HEAD`
        const HEAD = 1 << 4;
        /// `PATCH`
        const PATCH = 1 << 5;
        /// `OPTIONS`
        const OPTIONS = 1 << 6;
    }
}

impl MethodSet {
    /// Whether `method` is a member of this set.
    pub fn allows(&self, method: Method) -> bool {
        self.contains(MethodSet::from(method))
    }
}

impl Default for MethodSet {
    /// Routes accept `GET` unless told otherwise.
    fn default() -> Self {
        MethodSet::GET
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => MethodSet::GET,
            Method::Post => MethodSet::POST,
            Method::Put => MethodSet::PUT,
            Method::Delete => MethodSet::DELETE,
            Method::Head => MethodSet::HEAD,
            Method::Patch => MethodSet::PATCH,
            Method::Options => MethodSet::OPTIONS,
        }
    }
}
