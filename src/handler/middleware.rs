//! Middleware traits and the pipeline that runs them.
//!
//! A [`MiddlewarePipeline`] holds two ordered lists: request middleware, run
//! against the [`RequestContext`] before the application is called, and
//! response middleware, run against the produced [`HttpResponse`]. Each list
//! runs in the order it was declared. Middleware configuration is fixed at
//! construction, so one pipeline can be shared by concurrent requests.

use tracing::{debug, trace};

use crate::config::MiddlewareConfig;
use crate::handler::clean_path::{CleanPath, Redirect};
use crate::handler::cookies::CookieMiddleware;
use crate::handler::cors::AccessControl;
use crate::handler::gzip::GzipMiddleware;
use crate::http::request::RequestContext;
use crate::http::response::HttpResponse;

pub trait RequestMiddleware: Send + Sync {
    fn name(&self) -> &str;

    /// Inspects or rewrites the request. A [`Redirect`] stops the pipeline.
    fn process_request(&self, ctx: &mut RequestContext) -> Result<(), Redirect>;
}

pub trait ResponseMiddleware: Send + Sync {
    fn name(&self) -> &str;

    /// Transforms the response in place, or leaves it untouched.
    fn process_response(&self, ctx: &RequestContext, res: &mut HttpResponse);
}

#[derive(Default)]
pub struct MiddlewarePipeline {
    request: Vec<Box<dyn RequestMiddleware>>,
    response: Vec<Box<dyn ResponseMiddleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: path cleanup and cookie parsing on the request,
    /// then CORS and gzip on the response. Gzip comes last since it replaces
    /// the body.
    pub fn from_config(config: &MiddlewareConfig) -> Self {
        let mut pipeline = Self::new();

        if config.clean_path {
            pipeline.add_request(CleanPath);
        }
        pipeline.add_request(CookieMiddleware);

        if config.cors {
            pipeline.add_response(AccessControl::new(&config.origin, config.methods.as_deref()));
        }
        if config.gzip {
            pipeline.add_response(GzipMiddleware::new(config.min_length));
        }
        pipeline
    }

    pub fn add_request<M: RequestMiddleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.request.push(Box::new(middleware));
        self
    }

    pub fn add_response<M: ResponseMiddleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.response.push(Box::new(middleware));
        self
    }

    pub fn request_names(&self) -> Vec<&str> {
        self.request.iter().map(|m| m.name()).collect()
    }

    pub fn response_names(&self) -> Vec<&str> {
        self.response.iter().map(|m| m.name()).collect()
    }

    pub fn process_request(&self, ctx: &mut RequestContext) -> Result<(), Redirect> {
        for middleware in &self.request {
            trace!(middleware = middleware.name(), "request middleware");
            middleware.process_request(ctx)?;
        }
        Ok(())
    }

    pub fn process_response(&self, ctx: &RequestContext, res: &mut HttpResponse) {
        for middleware in &self.response {
            trace!(middleware = middleware.name(), "response middleware");
            middleware.process_response(ctx, res);
        }
    }

    /// Runs the request side, calls `app`, then runs the response side.
    ///
    /// A redirect raised by request middleware becomes a `302 Found`
    /// response and skips both the application and the response side.
    pub fn handle<F>(&self, ctx: &mut RequestContext, app: F) -> HttpResponse
    where
        F: FnOnce(&RequestContext) -> HttpResponse,
    {
        if let Err(redirect) = self.process_request(ctx) {
            debug!(
                method = ctx.method.as_str(),
                path = %ctx.path,
                location = %redirect.location,
                "request redirected"
            );
            return redirect.into_response();
        }

        let mut res = app(ctx);
        self.process_response(ctx, &mut res);
        res
    }
}
