use flate2::Compression;
use flate2::write::GzEncoder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use tracing::{trace, warn};

use crate::handler::middleware::ResponseMiddleware;
use crate::http::request::RequestContext;
use crate::http::response::{Body, HttpResponse};
use crate::http::status::HttpStatus;

static ACCEPTS_GZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bgzip\b").expect("valid regex"));

pub const DEFAULT_MIN_LENGTH: usize = 200;

const GZIP_LEVEL: u32 = 6;

/// Compresses response bodies with gzip when the client accepts it.
///
/// Sets `Vary: Accept-Encoding` on compressed responses so caches key their
/// entries on the request's `Accept-Encoding`.
#[derive(Debug, Clone)]
pub struct GzipMiddleware {
    min_length: usize,
}

impl Default for GzipMiddleware {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

impl GzipMiddleware {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// The body to compress, or the reason it should be left alone.
    fn eligible_content(
        &self,
        ctx: &RequestContext,
        res: &HttpResponse,
    ) -> Result<Vec<u8>, &'static str> {
        // Streams have no length and are never buffered here.
        let chunks = match &res.body {
            Body::Chunks(chunks) if !chunks.is_empty() => chunks,
            Body::Chunks(_) => return Err("empty body"),
            Body::Stream(_) => return Err("streamed body"),
        };
        if res.status != HttpStatus::OK {
            return Err("status is not 200");
        }
        let content = chunks.concat();
        if content.len() < self.min_length {
            return Err("body shorter than min_length");
        }
        if res.headers.contains("Content-Encoding") {
            return Err("already encoded");
        }

        // MSIE has issues with gzipped responses of various content types.
        if ctx.user_agent().to_lowercase().contains("msie") {
            let ctype = res.headers.get("Content-Type").unwrap_or("").to_lowercase();
            if !ctype.starts_with("text/") || ctype.contains("javascript") {
                return Err("content type not safe to compress for MSIE");
            }
        }

        if !ACCEPTS_GZIP.is_match(&ctx.accept_encoding()) {
            return Err("client does not accept gzip");
        }
        Ok(content)
    }
}

impl ResponseMiddleware for GzipMiddleware {
    fn name(&self) -> &str {
        "gzip"
    }

    fn process_response(&self, ctx: &RequestContext, res: &mut HttpResponse) {
        let content = match self.eligible_content(ctx, res) {
            Ok(content) => content,
            Err(reason) => {
                trace!(reason, "skipping gzip");
                return;
            }
        };

        let compressed = match compress(&content) {
            Ok(compressed) => compressed,
            Err(err) => {
                warn!(error = %err, "gzip compression failed, sending body uncompressed");
                return;
            }
        };

        if !res.headers.contains_token("Vary", "Accept-Encoding") {
            res.headers.add("Vary", "Accept-Encoding");
        }
        if res.headers.contains("Content-Length") {
            res.headers.set("Content-Length", &compressed.len().to_string());
        }
        res.headers.set("Content-Encoding", "gzip");
        trace!(from = content.len(), to = compressed.len(), "gzip applied");
        res.body = Body::Chunks(vec![compressed]);
    }
}

fn compress(content: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut e = GzEncoder::new(Vec::new(), Compression::new(GZIP_LEVEL));
    e.write_all(content)?;
    e.finish()
}
