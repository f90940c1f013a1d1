use std::io::Read;

use flate2::read::GzDecoder;
use rustyshape::http::http_method_from_str;
use rustyshape::{
    Body, HttpHeaders, HttpMethod, HttpResponse, HttpStatus, MiddlewareConfig, MiddlewarePipeline,
    RequestContext, SetCookie,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn page() -> String {
    "<li>response shaping</li>".repeat(40)
}

fn app(ctx: &RequestContext) -> HttpResponse {
    let mut res = HttpResponse::new(HttpStatus::OK)
        .with_header("Content-Type", "text/html; charset=utf-8")
        .with_header("Server", "rustyshape")
        .with_body(page());
    if ctx.cookie("sid").is_none() {
        res.set_cookie(SetCookie::new("sid", "fresh").http_only(true));
    }
    res
}

fn gunzip(body: &Body) -> Vec<u8> {
    let compressed = body.concat().expect("chunked body");
    let mut out = Vec::new();
    GzDecoder::new(&compressed[..])
        .read_to_end(&mut out)
        .expect("valid gzip stream");
    out
}

#[test]
fn test_full_pipeline_shapes_response() {
    init_tracing();
    let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig {
        methods: Some("GET, POST".to_string()),
        ..MiddlewareConfig::default()
    });

    let mut ctx = RequestContext::new(http_method_from_str("get"), "/items")
        .with_header("Accept-Encoding", "gzip;q=1.0, identity")
        .with_header("Cookie", "sid=abc; theme=dark");
    let res = pipeline.handle(&mut ctx, app);

    assert_eq!(ctx.cookie("theme"), Some("dark"));
    assert_eq!(res.status, HttpStatus::OK);
    assert_eq!(res.headers.get("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(res.headers.get("Access-Control-Allow-Methods"), Some("GET, POST"));
    assert_eq!(res.headers.get("Content-Encoding"), Some("gzip"));
    assert!(res.headers.contains_token("Vary", "Accept-Encoding"));
    assert!(!res.headers.contains("Set-Cookie"));
    assert_eq!(gunzip(&res.body), page().into_bytes());
}

#[test]
fn test_serialized_header_order() {
    let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default());
    let mut ctx = RequestContext::new(HttpMethod::Get, "/").with_header("Accept-Encoding", "gzip");
    let mut res = pipeline.handle(&mut ctx, app);
    res.set_header("Connection", "close");

    let head = res.build_headers();
    let names: Vec<&str> = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':').map(|(name, _)| name))
        .collect();
    assert_eq!(
        names,
        [
            "Connection",
            "Server",
            "Set-Cookie",
            "Access-Control-Allow-Origin",
            "Vary",
            "Content-Type",
            "Content-Encoding",
        ]
    );
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.ends_with("\r\n\r\n"));
}

#[test]
fn test_empty_methods_in_config_send_no_header() {
    let config = MiddlewareConfig::from_toml("methods = \"\"").expect("valid config");
    let pipeline = MiddlewarePipeline::from_config(&config);
    let mut ctx = RequestContext::new(HttpMethod::Get, "/");
    let res = pipeline.handle(&mut ctx, app);

    assert_eq!(res.headers.get("Access-Control-Allow-Origin"), Some("*"));
    assert!(!res.headers.contains("Access-Control-Allow-Methods"));
    assert!(!res.build_headers().contains("Access-Control-Allow-Methods"));
}

#[test]
fn test_error_response_is_not_shaped() {
    let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default());
    let mut ctx =
        RequestContext::new(HttpMethod::Get, "/missing").with_header("Accept-Encoding", "gzip");
    let res = pipeline.handle(&mut ctx, |_| {
        HttpResponse::new(HttpStatus::NOT_FOUND)
            .with_header("Content-Type", "text/html")
            .with_body("<h1>404 Not Found</h1>".repeat(20))
    });

    assert_eq!(res.status, HttpStatus::NOT_FOUND);
    assert!(!res.headers.contains("Access-Control-Allow-Origin"));
    assert!(!res.headers.contains("Content-Encoding"));
    assert_eq!(
        res.body.concat(),
        Some("<h1>404 Not Found</h1>".repeat(20).into_bytes())
    );
}

#[test]
fn test_redirect_exits_pipeline() {
    let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default());
    let mut ctx = RequestContext::new(HttpMethod::Get, "/a//b").with_query("page=2");
    let res = pipeline.handle(&mut ctx, app);

    assert_eq!(res.status, HttpStatus::FOUND);
    assert_eq!(res.headers.get("Location"), Some("/a/b?page=2"));
    assert!(!res.headers.contains("Access-Control-Allow-Origin"));
}

#[test]
fn test_disabled_clean_path_lets_request_through() {
    let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig {
        clean_path: false,
        ..MiddlewareConfig::default()
    });
    let mut ctx = RequestContext::new(HttpMethod::Get, "/a//b");
    let res = pipeline.handle(&mut ctx, app);
    assert_eq!(res.status, HttpStatus::OK);
}

#[test]
fn test_streamed_body_passes_through() {
    let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default());
    let mut ctx =
        RequestContext::new(HttpMethod::Get, "/events").with_header("Accept-Encoding", "gzip");
    let res = pipeline.handle(&mut ctx, |_| {
        HttpResponse::new(HttpStatus::OK)
            .with_header("Content-Type", "text/event-stream")
            .with_body(Body::stream((0..3).map(|i| format!("data: {}\n\n", i).into_bytes())))
    });

    assert!(!res.headers.contains("Content-Encoding"));
    assert_eq!(res.headers.get("Access-Control-Allow-Origin"), Some("*"));
    let Body::Stream(stream) = res.body else {
        panic!("body should still be a stream");
    };
    assert_eq!(stream.count(), 3);
}

#[test]
fn test_client_headers_reject_server_only_names() {
    let mut headers = HttpHeaders::client();
    headers.extend([("Accept", "*/*"), ("Server", "bla"), ("Set-Cookie", "a=b")]);
    assert_eq!(headers.len(), 1);
}
