pub mod clean_path;
pub mod cookies;
pub mod cors;
pub mod gzip;
pub mod middleware;

pub use clean_path::{CleanPath, Redirect};
pub use cookies::CookieMiddleware;
pub use cors::AccessControl;
pub use gzip::GzipMiddleware;
pub use middleware::{MiddlewarePipeline, RequestMiddleware, ResponseMiddleware};

use crate::http::auth::{AuthError, Credential, parse_authorization_header};
use crate::http::request::RequestContext;

/// Decodes the request's `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent. A header that is present but
/// cannot be decoded is an error. This is not part of the pipeline; handlers
/// call it when they need the credential.
pub fn authorization(ctx: &RequestContext) -> Result<Option<Credential>, AuthError> {
    ctx.authorization()
        .map(parse_authorization_header)
        .transpose()
}
