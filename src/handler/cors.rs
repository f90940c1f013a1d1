use crate::handler::middleware::ResponseMiddleware;
use crate::http::request::RequestContext;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

/// Adds `Access-Control-Allow-Origin` (and optionally
/// `Access-Control-Allow-Methods`) to `200 OK` responses.
#[derive(Debug, Clone)]
pub struct AccessControl {
    origin: String,
    methods: Option<String>,
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new("*", None)
    }
}

impl AccessControl {
    /// An empty `methods` string counts as not configured.
    pub fn new(origin: &str, methods: Option<&str>) -> Self {
        Self {
            origin: origin.to_string(),
            methods: methods.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string),
        }
    }
}

impl ResponseMiddleware for AccessControl {
    fn name(&self) -> &str {
        "access_control"
    }

    fn process_response(&self, _ctx: &RequestContext, res: &mut HttpResponse) {
        if res.status != HttpStatus::OK {
            return;
        }
        res.headers.set("Access-Control-Allow-Origin", &self.origin);
        if let Some(methods) = &self.methods {
            res.headers.set("Access-Control-Allow-Methods", methods);
        }
    }
}
