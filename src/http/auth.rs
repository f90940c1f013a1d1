//! `Authorization` header decoding.
//!
//! Supports the `Basic` and `Digest` schemes. Decoding failures are returned
//! as [`AuthError`] rather than treated as an absent credential.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Digest,
}

/// A decoded credential: the scheme plus its parameters.
///
/// `Basic` credentials carry `username` and `password`; `Digest` credentials
/// carry every parameter the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub scheme: AuthScheme,
    pub params: IndexMap<String, String>,
}

impl Credential {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.param("username")
    }

    pub fn password(&self) -> Option<&str> {
        self.param("password")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("empty authorization header")]
    Empty,

    #[error("unsupported authorization scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid base64 in basic credentials: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("basic credentials are not valid UTF-8")]
    InvalidUtf8,

    #[error("basic credentials lack a ':' separator")]
    MissingSeparator,

    #[error("malformed digest parameter: {0}")]
    MalformedParameter(String),

    #[error("digest credentials lack required parameter `{0}`")]
    MissingParameter(&'static str),
}

const DIGEST_REQUIRED: [&str; 5] = ["username", "realm", "nonce", "uri", "response"];
const DIGEST_QOP_REQUIRED: [&str; 2] = ["nc", "cnonce"];

/// Decodes a raw `Authorization` header value.
pub fn parse_authorization_header(value: &str) -> Result<Credential, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::Empty);
    }

    let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
    let rest = rest.trim();

    match scheme.to_ascii_lowercase().as_str() {
        "basic" => parse_basic(rest),
        "digest" => parse_digest(rest),
        _ => Err(AuthError::UnsupportedScheme(scheme.to_string())),
    }
}

fn parse_basic(encoded: &str) -> Result<Credential, AuthError> {
    let decoded = BASE64.decode(encoded)?;
    let pair = String::from_utf8(decoded).map_err(|_| AuthError::InvalidUtf8)?;
    let (username, password) = pair.split_once(':').ok_or(AuthError::MissingSeparator)?;

    let mut params = IndexMap::new();
    params.insert("username".to_string(), username.to_string());
    params.insert("password".to_string(), password.to_string());
    Ok(Credential {
        scheme: AuthScheme::Basic,
        params,
    })
}

fn parse_digest(rest: &str) -> Result<Credential, AuthError> {
    let mut params = IndexMap::new();
    for item in split_list(rest) {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| AuthError::MalformedParameter(item.to_string()))?;
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(AuthError::MalformedParameter(item.to_string()));
        }
        params.insert(key, unquote(value.trim()));
    }

    for name in DIGEST_REQUIRED {
        if !params.contains_key(name) {
            return Err(AuthError::MissingParameter(name));
        }
    }
    if params.contains_key("qop") {
        for name in DIGEST_QOP_REQUIRED {
            if !params.contains_key(name) {
                return Err(AuthError::MissingParameter(name));
            }
        }
    }

    Ok(Credential {
        scheme: AuthScheme::Digest,
        params,
    })
}

/// Splits a comma-separated list, ignoring commas inside quoted strings.
fn split_list(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(s[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\\", "\\").replace("\\\"", "\""),
        None => value.to_string(),
    }
}
