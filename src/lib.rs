//! Response shaping for an HTTP server.
//!
//! The crate provides a role-aware, canonically ordered header collection
//! ([`HttpHeaders`]) and a middleware pipeline ([`MiddlewarePipeline`]) that
//! adjusts a response before it is serialized: cookie parsing and path
//! cleanup on the request side, CORS headers and gzip compression on the
//! response side. [`authorization`] decodes request credentials for handlers.
//!
//! ```no_run
//! use rustyshape::{
//!     HttpMethod, HttpResponse, HttpStatus, MiddlewareConfig, MiddlewarePipeline, RequestContext,
//! };
//!
//! let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default());
//! let mut ctx =
//!     RequestContext::new(HttpMethod::Get, "/").with_header("Accept-Encoding", "gzip");
//! let res = pipeline.handle(&mut ctx, |_| {
//!     HttpResponse::new(HttpStatus::OK)
//!         .with_header("Content-Type", "text/html")
//!         .with_body("<h1>hello</h1>".repeat(50))
//! });
//! print!("{}", res.build_headers());
//! ```

pub mod config;
pub mod handler;
pub mod http;

pub use config::{ConfigError, MiddlewareConfig};
pub use handler::{
    AccessControl, CleanPath, CookieMiddleware, GzipMiddleware, MiddlewarePipeline, Redirect,
    RequestMiddleware, ResponseMiddleware, authorization,
};
pub use http::HttpMethod;
pub use http::auth::{AuthError, AuthScheme, Credential};
pub use http::cookie::{CookieJar, SetCookie, parse_cookie};
pub use http::header_table::HeaderRole;
pub use http::headers::HttpHeaders;
pub use http::request::{Cookies, RequestContext};
pub use http::response::{Body, HttpResponse};
pub use http::status::HttpStatus;
