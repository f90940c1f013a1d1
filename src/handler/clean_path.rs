use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::handler::middleware::RequestMiddleware;
use crate::http::HttpMethod;
use crate::http::request::RequestContext;
use crate::http::response::HttpResponse;

static REPEATED_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new("/+").expect("valid regex"));

/// Signal raised by request middleware to stop processing and send the
/// client elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("redirect to {location}")]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::redirect(&self.location)
    }
}

/// Redirects paths containing `//` to their collapsed form. The query string
/// is carried over for `GET` requests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanPath;

impl RequestMiddleware for CleanPath {
    fn name(&self) -> &str {
        "clean_path"
    }

    fn process_request(&self, ctx: &mut RequestContext) -> Result<(), Redirect> {
        if !ctx.path.contains("//") {
            return Ok(());
        }

        let mut url = REPEATED_SLASHES.replace_all(&ctx.path, "/").into_owned();
        if !url.starts_with('/') {
            url.insert(0, '/');
        }
        if !ctx.query_string.is_empty() && ctx.method == HttpMethod::Get {
            url = format!("{}?{}", url, ctx.query_string);
        }
        Err(Redirect::new(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(method: HttpMethod, path: &str, query: &str) -> Result<(), Redirect> {
        let mut ctx = RequestContext::new(method, path).with_query(query);
        CleanPath.process_request(&mut ctx)
    }

    #[test]
    fn clean_paths_pass() {
        assert_eq!(clean(HttpMethod::Get, "/a/b/", "x=1"), Ok(()));
        assert_eq!(clean(HttpMethod::Get, "", ""), Ok(()));
    }

    #[test]
    fn repeated_slashes_redirect() {
        assert_eq!(
            clean(HttpMethod::Get, "/a//b///c", ""),
            Err(Redirect::new("/a/b/c"))
        );
        assert_eq!(clean(HttpMethod::Get, "a//b", ""), Err(Redirect::new("/a/b")));
    }

    #[test]
    fn query_kept_for_get_only() {
        assert_eq!(
            clean(HttpMethod::Get, "//x", "q=1&r=2"),
            Err(Redirect::new("/x?q=1&r=2"))
        );
        assert_eq!(clean(HttpMethod::Post, "//x", "q=1"), Err(Redirect::new("/x")));
    }

    #[test]
    fn redirect_response() {
        let res = Redirect::new("/x").into_response();
        assert_eq!(res.status.code(), 302);
        assert_eq!(res.headers.get("Location"), Some("/x"));
    }

    #[test]
    fn query_with_line_breaks_still_redirects() {
        let redirect = clean(HttpMethod::Get, "//x", "a=1\r\nSet-Cookie: s=1").unwrap_err();
        let res = redirect.into_response();
        assert_eq!(res.headers.get("Location"), Some("/x?a=1%0D%0ASet-Cookie: s=1"));
        assert!(!res.headers.contains("Set-Cookie"));
    }
}
