use std::fmt;

use crate::http::cookie::SetCookie;
use crate::http::escape_controls;
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

/// A body with no length known up front, produced chunk by chunk.
pub struct BodyStream(Box<dyn Iterator<Item = Vec<u8>> + Send>);

impl BodyStream {
    pub fn new<I>(chunks: I) -> Self
    where
        I: Iterator<Item = Vec<u8>> + Send + 'static,
    {
        Self(Box::new(chunks))
    }
}

impl Iterator for BodyStream {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        self.0.next()
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyStream(..)")
    }
}

/// Response content: either materialized chunks or a stream.
///
/// Only [`Body::Chunks`] has a well-defined length, which is what the
/// compression middleware requires.
#[derive(Debug)]
pub enum Body {
    Chunks(Vec<Vec<u8>>),
    Stream(BodyStream),
}

impl Body {
    pub fn empty() -> Self {
        Body::Chunks(Vec::new())
    }

    pub fn stream<I>(chunks: I) -> Self
    where
        I: Iterator<Item = Vec<u8>> + Send + 'static,
    {
        Body::Stream(BodyStream::new(chunks))
    }

    pub fn is_streamed(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    /// Total length of a chunked body; `None` for a stream.
    pub fn len(&self) -> Option<usize> {
        match self {
            Body::Chunks(chunks) => Some(chunks.iter().map(Vec::len).sum()),
            Body::Stream(_) => None,
        }
    }

    /// Whether the body has no chunks at all. Streams are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Chunks(chunks) if chunks.is_empty())
    }

    /// Concatenates a chunked body into one buffer.
    pub fn concat(&self) -> Option<Vec<u8>> {
        match self {
            Body::Chunks(chunks) => Some(chunks.concat()),
            Body::Stream(_) => None,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Chunks(vec![bytes])
    }
}

impl From<Vec<Vec<u8>>> for Body {
    fn from(chunks: Vec<Vec<u8>>) -> Self {
        Body::Chunks(chunks)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::from(s.as_bytes().to_vec())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::from(s.into_bytes())
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Body,
}

impl HttpResponse {
    pub fn new(status: HttpStatus) -> Self {
        Self {
            status,
            headers: HttpHeaders::server(),
            body: Body::empty(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    /// `302 Found` pointing at `location`.
    /// A `302 Found` to `location`. Control characters in `location` are
    /// percent-encoded so the `Location` header is never dropped.
    pub fn redirect(location: &str) -> Self {
        HttpResponse::new(HttpStatus::FOUND).with_header("Location", &escape_controls(location))
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    pub fn set_cookie(&mut self, cookie: SetCookie) {
        self.headers.add("Set-Cookie", &cookie.to_header_value());
    }

    pub fn delete_cookie(&mut self, name: &str) {
        self.set_cookie(SetCookie::removal(name));
    }

    pub fn build_headers(&self) -> String {
        // HTTP/1.1 <status> <reason>\r\n
        // <header_name>: <header_value>\r\n
        // ...
        // \r\n
        format!(
            "HTTP/1.1 {} {}\r\n{}\r\n",
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
    }
}
