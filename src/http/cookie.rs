//! Cookie parsing (`Cookie` request header) and emission (`Set-Cookie`).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use crate::http::escape_controls;
use crate::http::header_table::is_token;

/// Cookies sent by a client, in the order they appeared.
pub type CookieJar = IndexMap<String, String>;

/// Parses a raw `Cookie` header value.
///
/// Segments that cannot be split into `name=value`, or whose name is not a
/// valid cookie name, are dropped. The first occurrence of a name wins.
pub fn parse_cookie(raw: &str) -> CookieJar {
    let mut jar = CookieJar::new();
    for segment in raw.split(';') {
        let Some((name, value)) = segment.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if !is_token(name) {
            continue;
        }
        if !jar.contains_key(name) {
            jar.insert(name.to_string(), unquote(value.trim()));
        }
    }
    jar
}

/// Removes surrounding double quotes and decodes `\"`, `\\` and `\NNN`
/// escapes.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let octal = bytes.get(i + 1..i + 4).and_then(|d| {
            if d.iter().all(|b| (b'0'..=b'7').contains(b)) {
                std::str::from_utf8(d)
                    .ok()
                    .and_then(|s| u8::from_str_radix(s, 8).ok())
            } else {
                None
            }
        });
        match octal {
            Some(b) => {
                out.push(b);
                i += 4;
            }
            None => {
                out.push(bytes[i + 1]);
                i += 2;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn needs_quoting(value: &str) -> bool {
    value
        .bytes()
        .any(|b| !(0x21..=0x7e).contains(&b) || matches!(b, b'"' | b',' | b';' | b'\\'))
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// A cookie to be sent in a `Set-Cookie` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub max_age: Option<u64>,
    pub expires: Option<SystemTime>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            expires: None,
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            http_only: false,
        }
    }

    /// Sets `Max-Age`, and `Expires` to now plus the same number of seconds
    /// for clients that ignore `Max-Age`.
    pub fn max_age(mut self, secs: u64) -> Self {
        self.max_age = Some(secs);
        self.expires = Some(SystemTime::now() + Duration::from_secs(secs));
        self
    }

    pub fn expires(mut self, at: SystemTime) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// An already-expired cookie, used to remove `name` from the client.
    pub fn removal(name: impl Into<String>) -> Self {
        let mut cookie = Self::new(name, "");
        cookie.max_age = Some(0);
        cookie.expires = Some(UNIX_EPOCH);
        cookie
    }

    /// The header value, e.g. `sid=abc; expires=...; Max-Age=60; Path=/`.
    ///
    /// Control characters in any part are percent-encoded, so the value is
    /// always accepted as a header line.
    pub fn to_header_value(&self) -> String {
        let mut out = escape_controls(&self.name).into_owned();
        out.push('=');
        let value = escape_controls(&self.value);
        if needs_quoting(&value) {
            out.push_str(&quote(&value));
        } else {
            out.push_str(&value);
        }

        if let Some(expires) = self.expires {
            out.push_str("; expires=");
            out.push_str(&httpdate::fmt_http_date(expires));
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(&escape_controls(domain));
        }
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(&escape_controls(path));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}
