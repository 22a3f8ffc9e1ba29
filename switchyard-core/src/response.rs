//! Response sink and handler output conversion.

use crate::signal::Interrupt;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct ResponseState {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// A writable response shared by hooks, the handler and the transport.
///
/// Cloning is cheap; every clone writes to the same response.
#[derive(Debug, Clone)]
pub struct Response {
    state: Arc<Mutex<ResponseState>>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// An empty `200` response.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ResponseState {
                status: 200,
                headers: Vec::new(),
                body: Vec::new(),
            })),
        }
    }

    /// Current status code.
    pub fn status(&self) -> u16 {
        self.state.lock().status
    }

    /// Set the status code.
    pub fn set_status(&self, status: u16) {
        self.state.lock().status = status;
    }

    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// Set header `name`, replacing existing values.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let mut state = self.state.lock();
        state.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        state.headers.push((name, value.into()));
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<String> {
        self.header("Content-Type")
    }

    /// Set the `Content-Type` header.
    pub fn set_content_type(&self, content_type: impl Into<String>) {
        self.set_header("Content-Type", content_type);
    }

    /// Answer with a `302 Found` pointing at `url`.
    pub fn redirect(&self, url: impl Into<String>) {
        self.set_header("Location", url);
        self.set_status(302);
    }

    /// The `Location` header of a redirect.
    pub fn location(&self) -> Option<String> {
        self.header("Location")
    }

    /// Append bytes to the body.
    pub fn write(&self, bytes: &[u8]) {
        self.state.lock().body.extend_from_slice(bytes);
    }

    /// A copy of the body.
    pub fn body(&self) -> Vec<u8> {
        self.state.lock().body.clone()
    }

    /// The body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().body).into_owned()
    }
}

/// What a route's handler produces, known at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Nothing is written; the handler writes the response itself.
    Empty,
    /// A text body.
    Text,
    /// A binary body.
    Bytes,
    /// Decided per call.
    Dynamic,
}

/// A handler's result, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to write.
    Empty,
    /// A text body.
    Text(String),
    /// A binary body.
    Bytes(Vec<u8>),
}

impl Reply {
    /// Write this reply into `response`, defaulting the content type.
    pub fn write_to(self, response: &Response) {
        match self {
            Reply::Empty => {}
            Reply::Text(text) => {
                if response.content_type().is_none() {
                    response.set_content_type("text/plain; charset=utf-8");
                }
                response.write(text.as_bytes());
            }
            Reply::Bytes(bytes) => {
                if response.content_type().is_none() {
                    response.set_content_type("application/octet-stream");
                }
                response.write(&bytes);
            }
        }
    }
}

/// Trait for converting a handler's output into a [`Reply`].
///
/// # Default Implementations
///
/// - `()` → Empty
/// - `String`, `&'static str` → Text
/// - `Vec<u8>` → Bytes
/// - `Reply` → As is
/// - `Result<T, E>` → Delegates to inner `T` or interrupts with `E`
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be turned into a reply",
    label = "missing `IntoReply` implementation",
    note = "Handlers must return `()`, a string, bytes, `Reply` or a `Result` of those."
)]
pub trait IntoReply: Send + 'static {
    /// The response kind this output produces.
    const KIND: ResponseKind;

    /// Convert into a reply or an interrupt.
    fn into_reply(self) -> Result<Reply, Interrupt>;
}

impl IntoReply for () {
    const KIND: ResponseKind = ResponseKind::Empty;

    fn into_reply(self) -> Result<Reply, Interrupt> {
        Ok(Reply::Empty)
    }
}

impl IntoReply for String {
    const KIND: ResponseKind = ResponseKind::Text;

    fn into_reply(self) -> Result<Reply, Interrupt> {
        Ok(Reply::Text(self))
    }
}

impl IntoReply for &'static str {
    const KIND: ResponseKind = ResponseKind::Text;

    fn into_reply(self) -> Result<Reply, Interrupt> {
        Ok(Reply::Text(self.to_string()))
    }
}

impl IntoReply for Vec<u8> {
    const KIND: ResponseKind = ResponseKind::Bytes;

    fn into_reply(self) -> Result<Reply, Interrupt> {
        Ok(Reply::Bytes(self))
    }
}

impl IntoReply for Reply {
    const KIND: ResponseKind = ResponseKind::Dynamic;

    fn into_reply(self) -> Result<Reply, Interrupt> {
        Ok(self)
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<Interrupt> + Send + 'static,
{
    const KIND: ResponseKind = T::KIND;

    fn into_reply(self) -> Result<Reply, Interrupt> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(e.into()),
        }
    }
}
