use once_cell::sync::Lazy;

use crate::http::HttpMethod;
use crate::http::cookie::{CookieJar, parse_cookie};
use crate::http::headers::HttpHeaders;

static NO_COOKIES: Lazy<CookieJar> = Lazy::new(CookieJar::new);

/// The `Cookie` header of a request, either as received or already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cookies {
    Raw(String),
    Parsed(CookieJar),
}

impl Default for Cookies {
    fn default() -> Self {
        Cookies::Raw(String::new())
    }
}

/// Request metadata the middleware reads.
///
/// Headers live in a client-role [`HttpHeaders`], except `Cookie`, which is
/// kept apart in [`Cookies`] so it can be replaced by its parsed form.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: HttpMethod,
    pub path: String,
    pub query_string: String,
    pub headers: HttpHeaders,
    pub cookies: Cookies,
}

impl RequestContext {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query_string: String::new(),
            headers: HttpHeaders::client(),
            cookies: Cookies::default(),
        }
    }

    pub fn with_query(mut self, query_string: &str) -> Self {
        self.query_string = query_string.to_string();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_cookies(mut self, jar: CookieJar) -> Self {
        self.cookies = Cookies::Parsed(jar);
        self
    }

    /// Sets a request header. A `Cookie` header replaces the stored cookies
    /// with the raw value.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("cookie") {
            self.cookies = Cookies::Raw(value.to_string());
        } else {
            self.headers.set(name, value);
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn user_agent(&self) -> &str {
        self.header("User-Agent").unwrap_or("")
    }

    /// Every `Accept-Encoding` value received, joined with `", "`.
    pub fn accept_encoding(&self) -> String {
        self.headers
            .get_joined("Accept-Encoding")
            .unwrap_or_default()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.header("Authorization")
    }

    /// Replaces a raw `Cookie` value with its parsed form. Parsed cookies are
    /// left untouched, so calling this repeatedly yields the same jar.
    pub fn normalize_cookies(&mut self) -> &CookieJar {
        if let Cookies::Raw(raw) = &self.cookies {
            self.cookies = Cookies::Parsed(parse_cookie(raw));
        }
        self.cookie_jar().unwrap_or(&NO_COOKIES)
    }

    /// Parsed cookies, if [`normalize_cookies`](Self::normalize_cookies) has run.
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        match &self.cookies {
            Cookies::Parsed(jar) => Some(jar),
            Cookies::Raw(_) => None,
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookie_jar()?.get(name).map(String::as_str)
    }
}
