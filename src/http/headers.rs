//! HTTP headers abstraction for [`RequestContext`](crate::http::request::RequestContext) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! Headers are stored in an ordered map keyed by their canonical name, and
//! each collection carries a [`HeaderRole`]. A name that the role may not
//! carry (e.g. `Server` on a client collection, `Cookie` on a server
//! collection) is silently ignored, as is anything that is not a valid header
//! token or a value containing CR/LF.
//!
//! Enumeration does not follow insertion order: names are sorted by the rank
//! recorded in the [`header_table`](crate::http::header_table) (general, then
//! request/response, then entity, then unlisted names). Names of equal rank
//! keep the order in which they were first set, so serialization is
//! deterministic.

use indexmap::IndexMap;
use tracing::debug;

use crate::http::header_table::{
    self, HeaderRole, Multiplicity, UNLISTED_RANK, canonical_name, is_token,
};

#[derive(Debug, Clone)]
pub struct HttpHeaders {
    role: HeaderRole,
    headers: IndexMap<String, Vec<String>>,
}

impl HttpHeaders {
    pub fn new(role: HeaderRole) -> Self {
        Self {
            role,
            headers: IndexMap::new(),
        }
    }

    pub fn server() -> Self {
        Self::new(HeaderRole::Server)
    }

    pub fn client() -> Self {
        Self::new(HeaderRole::Client)
    }

    pub fn role(&self) -> HeaderRole {
        self.role
    }

    /// Canonical name for `name` if this collection accepts it.
    fn admit(&self, name: &str, value: &str) -> Option<String> {
        if !is_token(name) {
            debug!(name, "rejecting header with invalid name");
            return None;
        }
        if value.contains(['\r', '\n']) {
            debug!(name, "rejecting header value containing CR/LF");
            return None;
        }
        if let Some(spec) = header_table::lookup(name) {
            if !spec.class.allowed_for(self.role) {
                debug!(name = spec.name, role = ?self.role, "header not allowed for role");
                return None;
            }
        }
        Some(canonical_name(name))
    }

    /// Sets `name` to a single value, replacing previous values.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(name) = self.admit(name, value) {
            self.headers.insert(name, vec![value.to_string()]);
        }
    }

    /// Appends a value to a multi-valued header (`Vary`, `Set-Cookie`, ...).
    /// Single-valued headers are overwritten as with [`set`](Self::set).
    pub fn add(&mut self, name: &str, value: &str) {
        let Some(name) = self.admit(name, value) else {
            return;
        };

        match multiplicity(&name) {
            Multiplicity::Single => {
                self.headers.insert(name, vec![value.to_string()]);
            }
            Multiplicity::CommaList | Multiplicity::Repeated => {
                self.headers.entry(name).or_default().push(value.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.headers
            .get(canonical_name(name).as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Values of `name` joined as they appear in a single header field.
    pub fn get_joined(&self, name: &str) -> Option<String> {
        let values = self.get_all(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(canonical_name(name).as_str())
    }

    /// Checks whether any comma-separated element of `name` equals `token`,
    /// ignoring case.
    pub fn contains_token(&self, name: &str, token: &str) -> bool {
        self.get_all(name)
            .iter()
            .flat_map(|v| v.split(','))
            .any(|t| t.trim().eq_ignore_ascii_case(token))
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.headers.shift_remove(canonical_name(name).as_str())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Headers in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        let mut entries: Vec<_> = self
            .headers
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
            .collect();
        entries.sort_by_key(|(name, _)| rank(name));
        entries.into_iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }

    /// Serializes the headers as `Name: value\r\n` lines.
    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, values) in self.iter() {
            match multiplicity(name) {
                Multiplicity::Repeated => {
                    for value in values {
                        result.push_str(&format!("{}: {}\r\n", name, value));
                    }
                }
                _ => result.push_str(&format!("{}: {}\r\n", name, values.join(", "))),
            }
        }
        result
    }
}

impl<N: AsRef<str>, V: AsRef<str>> Extend<(N, V)> for HttpHeaders {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name.as_ref(), value.as_ref());
        }
    }
}

fn rank(name: &str) -> u8 {
    header_table::lookup(name)
        .map(|spec| spec.class.rank())
        .unwrap_or(UNLISTED_RANK)
}

fn multiplicity(name: &str) -> Multiplicity {
    header_table::lookup(name)
        .map(|spec| spec.multiplicity)
        .unwrap_or(Multiplicity::Single)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_header() {
        let mut h = HttpHeaders::server();
        assert_eq!(h.role(), HeaderRole::Server);
        assert_eq!(h.len(), 0);
        h.set("content-type", "text/html");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn client_rejects_server_only() {
        let mut h = HttpHeaders::client();
        h.set("content-type", "text/html");
        assert_eq!(h.len(), 1);
        h.set("server", "bla");
        assert_eq!(h.len(), 1);
        assert!(!h.contains("Server"));
    }

    #[test]
    fn server_rejects_client_only() {
        let mut h = HttpHeaders::server();
        h.set("Cookie", "a=b");
        h.add("user-agent", "curl");
        assert!(h.is_empty());
    }

    #[test]
    fn canonical_order() {
        let mut h = HttpHeaders::server();
        h.set("content-type", "text/html");
        h.set("connection", "close");
        assert_eq!(h.len(), 2);
        assert_eq!(h.names().collect::<Vec<_>>(), ["Connection", "Content-Type"]);

        h.extend([("server", "foo")]);
        assert_eq!(
            h.names().collect::<Vec<_>>(),
            ["Connection", "Server", "Content-Type"]
        );
    }

    #[test]
    fn unlisted_names_keep_insertion_order() {
        let mut h = HttpHeaders::server();
        h.set("x-b", "1");
        h.set("content-length", "3");
        h.set("x-a", "2");
        h.set("date", "now");
        assert_eq!(
            h.names().collect::<Vec<_>>(),
            ["Date", "Content-Length", "X-B", "X-A"]
        );
    }

    #[test]
    fn set_overwrites_and_add_appends() {
        let mut h = HttpHeaders::server();
        h.set("Vary", "Cookie");
        h.add("vary", "Accept-Encoding");
        assert_eq!(h.get_joined("Vary").as_deref(), Some("Cookie, Accept-Encoding"));
        assert!(h.contains_token("vary", "accept-encoding"));

        h.add("Content-Type", "text/plain");
        h.add("content-type", "text/html");
        assert_eq!(h.get_all("Content-Type"), ["text/html"]);

        h.set("vary", "Origin");
        assert_eq!(h.get_all("Vary"), ["Origin"]);
    }

    #[test]
    fn rejects_injection() {
        let mut h = HttpHeaders::server();
        h.set("X-Evil", "a\r\nSet-Cookie: x=y");
        h.set("Bad Name", "v");
        assert!(h.is_empty());
    }

    #[test]
    fn stringify_repeats_set_cookie() {
        let mut h = HttpHeaders::server();
        h.add("Set-Cookie", "a=1");
        h.add("Set-Cookie", "b=2");
        h.add("Vary", "Cookie");
        h.add("Vary", "Accept-Encoding");
        h.set("Connection", "close");
        assert_eq!(
            h.stringify(),
            "Connection: close\r\n\
             Set-Cookie: a=1\r\n\
             Set-Cookie: b=2\r\n\
             Vary: Cookie, Accept-Encoding\r\n"
        );
    }

    #[test]
    fn remove_is_case_insensitive() {
        let mut h = HttpHeaders::server();
        h.set("Content-Length", "10");
        assert_eq!(h.remove("CONTENT-LENGTH"), Some(vec!["10".to_string()]));
        assert!(h.is_empty());
    }
}
