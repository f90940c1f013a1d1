//! Static header policy table.
//!
//! Every header name this layer knows about is listed once, with its canonical
//! spelling, the message class it belongs to and how multiple values are
//! carried on the wire. [`HttpHeaders`](crate::http::headers::HttpHeaders)
//! consults this table both when accepting a header and when ordering headers
//! for serialization.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Which side of the exchange a header collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRole {
    /// Headers emitted by the server on a response.
    Server,
    /// Headers sent by a client on a request.
    Client,
}

/// Message class of a header, following the RFC 2616 grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderClass {
    General,
    Request,
    Response,
    Entity,
}

impl HeaderClass {
    pub fn allowed_for(self, role: HeaderRole) -> bool {
        match (self, role) {
            (HeaderClass::General | HeaderClass::Entity, _) => true,
            (HeaderClass::Request, HeaderRole::Client) => true,
            (HeaderClass::Response, HeaderRole::Server) => true,
            _ => false,
        }
    }

    /// Serialization rank: general headers first, then request/response
    /// headers, then entity headers.
    pub fn rank(self) -> u8 {
        match self {
            HeaderClass::General => 0,
            HeaderClass::Request | HeaderClass::Response => 1,
            HeaderClass::Entity => 2,
        }
    }
}

/// Rank given to names absent from the table.
pub const UNLISTED_RANK: u8 = 3;

/// How a header carries more than one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// A later value replaces the earlier one.
    Single,
    /// Values are joined into one `, `-separated field.
    CommaList,
    /// Each value is written on its own header line.
    Repeated,
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderSpec {
    pub name: &'static str,
    pub class: HeaderClass,
    pub multiplicity: Multiplicity,
}

use HeaderClass::*;
use Multiplicity::*;

const HEADERS: &[(&str, HeaderClass, Multiplicity)] = &[
    ("Cache-Control", General, CommaList),
    ("Connection", General, CommaList),
    ("Date", General, Single),
    ("Pragma", General, CommaList),
    ("Trailer", General, CommaList),
    ("Transfer-Encoding", General, CommaList),
    ("Upgrade", General, CommaList),
    ("Via", General, CommaList),
    ("Warning", General, CommaList),
    ("Accept", Request, CommaList),
    ("Accept-Charset", Request, CommaList),
    ("Accept-Encoding", Request, CommaList),
    ("Accept-Language", Request, CommaList),
    ("Authorization", Request, Single),
    ("Cookie", Request, Single),
    ("Expect", Request, Single),
    ("From", Request, Single),
    ("Host", Request, Single),
    ("If-Match", Request, CommaList),
    ("If-Modified-Since", Request, Single),
    ("If-None-Match", Request, CommaList),
    ("If-Range", Request, Single),
    ("If-Unmodified-Since", Request, Single),
    ("Max-Forwards", Request, Single),
    ("Origin", Request, Single),
    ("Proxy-Authorization", Request, Single),
    ("Range", Request, Single),
    ("Referer", Request, Single),
    ("TE", Request, CommaList),
    ("User-Agent", Request, Single),
    ("X-Requested-With", Request, Single),
    ("Accept-Ranges", Response, CommaList),
    ("Access-Control-Allow-Credentials", Response, Single),
    ("Access-Control-Allow-Headers", Response, CommaList),
    ("Access-Control-Allow-Methods", Response, CommaList),
    ("Access-Control-Allow-Origin", Response, Single),
    ("Access-Control-Expose-Headers", Response, CommaList),
    ("Access-Control-Max-Age", Response, Single),
    ("Age", Response, Single),
    ("ETag", Response, Single),
    ("Location", Response, Single),
    ("Proxy-Authenticate", Response, Repeated),
    ("Retry-After", Response, Single),
    ("Server", Response, Single),
    ("Set-Cookie", Response, Repeated),
    ("Vary", Response, CommaList),
    ("WWW-Authenticate", Response, Repeated),
    ("Allow", Entity, CommaList),
    ("Content-Encoding", Entity, CommaList),
    ("Content-Language", Entity, CommaList),
    ("Content-Length", Entity, Single),
    ("Content-Location", Entity, Single),
    ("Content-MD5", Entity, Single),
    ("Content-Range", Entity, Single),
    ("Content-Type", Entity, Single),
    ("Expires", Entity, Single),
    ("Last-Modified", Entity, Single),
];

pub static HEADER_TABLE: Lazy<HashMap<String, HeaderSpec>> = Lazy::new(|| {
    HEADERS
        .iter()
        .map(|&(name, class, multiplicity)| {
            (
                name.to_ascii_lowercase(),
                HeaderSpec {
                    name,
                    class,
                    multiplicity,
                },
            )
        })
        .collect()
});

/// Looks up a header name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static HeaderSpec> {
    HEADER_TABLE.get(name.to_ascii_lowercase().as_str())
}

/// Returns the canonical spelling of `name`.
///
/// Known names use the table spelling (`ETag`, `WWW-Authenticate`), anything
/// else gets each `-`-separated segment capitalised.
pub fn canonical_name(name: &str) -> String {
    if let Some(spec) = lookup(name) {
        return spec.name.to_string();
    }

    let mut result = String::with_capacity(name.len());
    let mut capitalise = true;
    for c in name.chars() {
        if capitalise {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c.to_ascii_lowercase());
        }
        capitalise = c == '-';
    }
    result
}

/// RFC 7230 `token`: visible ASCII without separators.
pub fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
