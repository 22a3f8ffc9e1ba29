//! The read-only request view consumed by matching and binding.
//!
//! Transports translate their native request into a [`Request`]; nothing in
//! the routing core looks at sockets, headers or bodies.

use crate::method::Method;
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

/// The path of a request, split into non-empty segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequestPath {
    segments: Vec<String>,
}

impl RequestPath {
    /// Build a path from already split segments. Empty segments are dropped.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Split a raw path such as `/a/b/c` on `/`.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/'))
    }

    /// All segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The segment at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path is the root.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Remove `root` from the front of this path.
    ///
    /// Returns `None` when the path does not live under `root`.
    pub fn strip_root(&self, root: &RequestPath) -> Option<RequestPath> {
        if root.len() > self.len() || root.segments[..] != self.segments[..root.len()] {
            return None;
        }
        Some(RequestPath {
            segments: self.segments[root.len()..].to_vec(),
        })
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Query parameters: every name maps to the ordered list of its values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.append(name.into_owned(), value.into_owned());
        }
        params
    }

    /// Add one value for `name`, after any existing ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Replace all values for `name`.
    pub fn set(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.values.insert(name.into(), values);
    }

    /// Values for `name`, empty when absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Whether any value is present for `name`.
    pub fn contains(&self, name: &str) -> bool {
        !self.values(name).is_empty()
    }

    /// Whether there are no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, values)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// First value of every parameter.
    pub fn to_param_map(&self) -> ParamMap {
        ParamMap(
            self.values
                .iter()
                .filter_map(|(k, v)| v.first().map(|first| (k.clone(), first.clone())))
                .collect(),
        )
    }

    /// All values of every parameter.
    pub fn to_param_list_map(&self) -> ParamListMap {
        ParamListMap(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, values) in &self.values {
            for value in values {
                if !first {
                    f.write_str("&")?;
                }
                first = false;
                write!(f, "{name}={value}")?;
            }
        }
        Ok(())
    }
}

/// Snapshot of the query with one value per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap(pub HashMap<String, String>);

/// Snapshot of the query with every value per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamListMap(pub HashMap<String, Vec<String>>);

/// The media type the client asked for, e.g. `application/json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(String);

impl MediaType {
    /// Wrap a mime type.
    pub fn new(mime: impl Into<String>) -> Self {
        Self(mime.into())
    }

    /// The mime type text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self("*/*".to_string())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-client session attributes shared between requests.
#[derive(Debug, Clone, Default)]
pub struct Session {
    attributes: Arc<RwLock<HashMap<String, String>>>,
}

impl Session {
    /// A fresh, empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an attribute.
    pub fn get(&self, key: &str) -> Option<String> {
        self.attributes.read().get(key).cloned()
    }

    /// Write an attribute.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.write().insert(key.into(), value.into());
    }

    /// Remove an attribute, returning the old value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.attributes.write().remove(key)
    }
}

/// A request as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: RequestPath,
    query: QueryParams,
    media_type: MediaType,
    session: Session,
}

impl Request {
    /// Build a request from a method and a target such as `/a/b?x=1`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, QueryParams::parse(query)),
            None => (target, QueryParams::new()),
        };
        Self {
            method,
            path: RequestPath::parse(path),
            query,
            media_type: MediaType::default(),
            session: Session::new(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    /// Set the requested media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = MediaType::new(media_type);
        self
    }

    /// Attach an existing session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Replace the path, keeping everything else.
    pub fn with_path(mut self, path: RequestPath) -> Self {
        self.path = path;
        self
    }

    /// Request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request path.
    pub fn path(&self) -> &RequestPath {
        &self.path
    }

    /// Query parameters.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Requested media type.
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Client session.
    pub fn session(&self) -> &Session {
        &self.session
    }
}
