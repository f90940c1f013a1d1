use tracing::trace;

use crate::handler::clean_path::Redirect;
use crate::handler::middleware::RequestMiddleware;
use crate::http::request::RequestContext;

/// Replaces the raw `Cookie` header with the parsed cookie jar.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieMiddleware;

impl RequestMiddleware for CookieMiddleware {
    fn name(&self) -> &str {
        "cookies"
    }

    fn process_request(&self, ctx: &mut RequestContext) -> Result<(), Redirect> {
        let jar = ctx.normalize_cookies();
        trace!(count = jar.len(), "cookies parsed");
        Ok(())
    }
}
