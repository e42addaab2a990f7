//! HTTP front end.
//!
//! Routes:
//!
//! - `GET /health` and `GET /healthz`: liveness
//! - `GET /v1/server/{address}/embed`: the embed document
//! - `GET /v1/server/{address}/image`: not implemented, reported as 501

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::ServiceError;
use crate::service::MotdService;

/// How long open connections get to finish after shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const JSON: &str = "application/json";
const HTML: &str = "text/html; charset=utf-8";

/// Which origins may embed the documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    any: bool,
    origins: Vec<String>,
}

impl CorsPolicy {
    /// `*` anywhere in `origins` allows every origin.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origins: Vec<String> = origins
            .into_iter()
            .map(Into::into)
            .map(|o| o.trim_end_matches('/').to_string())
            .collect();
        Self {
            any: origins.iter().any(|o| o == "*"),
            origins,
        }
    }

    /// The `Access-Control-Allow-Origin` value for a request, if it is allowed.
    fn allow_origin(&self, request_origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        if self.any {
            return Some(HeaderValue::from_static("*"));
        }
        let origin = request_origin?;
        let value = origin.to_str().ok()?;
        self.origins
            .iter()
            .any(|allowed| allowed == value)
            .then(|| origin.clone())
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(["*"])
    }
}

/// Everything a request handler needs.
#[derive(Debug)]
pub struct AppState {
    pub service: MotdService,
    pub cors: CorsPolicy,
    pub request_timeout: Duration,
}

/// Accept connections on `listener` until `shutdown` completes, then give
/// open connections [`SHUTDOWN_GRACE`] to finish.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "listening");

    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let state = state.clone();

                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let state = state.clone();
                    async move { Ok::<_, Infallible>(handle_request(&state, req).await) }
                });

                let conn = graceful.watch(http1::Builder::new().serve_connection(io, service));
                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        debug!(%peer, error = %e, "connection error");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("shutdown requested, draining connections");
                break;
            }
        }
    }

    tokio::select! {
        _ = graceful.shutdown() => info!("all connections closed"),
        _ = tokio::time::sleep(SHUTDOWN_GRACE) => warn!("timed out waiting for connections to close"),
    }
    Ok(())
}

/// Bind `addr` and [`serve`] on it.
pub async fn bind_and_serve<F>(addr: SocketAddr, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown).await
}

/// Route one request. Never fails: every outcome is an HTTP response.
pub async fn handle_request<B>(state: &AppState, req: Request<B>) -> Response<Full<Bytes>> {
    // Only the head is used; the body is never read.
    let (parts, _body) = req.into_parts();
    let mut response = route(state, &parts.method, parts.uri.path()).await;

    if let Some(allow) = state.cors.allow_origin(parts.headers.get(header::ORIGIN)) {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow);
        if !state.cors.any {
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
    response
}

async fn route(state: &AppState, method: &Method, path: &str) -> Response<Full<Bytes>> {
    let route = Route::parse(path);
    if matches!(route, Route::NotFound) {
        return json_response(StatusCode::NOT_FOUND, json!({"detail": "Not Found"}));
    }

    if method == Method::OPTIONS {
        let mut response = text_response(StatusCode::NO_CONTENT, JSON, String::new());
        set_header(response.headers_mut(), header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS");
        return response;
    }
    if method != Method::GET {
        let mut response = json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({"detail": "Method Not Allowed"}),
        );
        set_header(response.headers_mut(), header::ALLOW, "GET, OPTIONS");
        return response;
    }

    match route {
        Route::Health => json_response(StatusCode::OK, json!({"status": "ok"})),
        Route::Embed(address) => embed(state, address).await,
        Route::Image(address) => json_response(
            StatusCode::NOT_IMPLEMENTED,
            json!({
                "status": "not_implemented",
                "message": "Image rendering is not implemented; use the embed endpoint",
                "server": address,
            }),
        ),
        Route::NotFound => json_response(StatusCode::NOT_FOUND, json!({"detail": "Not Found"})),
    }
}

async fn embed(state: &AppState, address: &str) -> Response<Full<Bytes>> {
    let rendered = tokio::time::timeout(state.request_timeout, state.service.render(address)).await;

    match rendered {
        Ok(Ok(html)) => {
            let mut response = text_response(StatusCode::OK, HTML, html);
            let max_age = format!("public, max-age={}", state.service.ttl().as_secs());
            if let Ok(value) = HeaderValue::from_str(&max_age) {
                response.headers_mut().insert(header::CACHE_CONTROL, value);
            }
            response
        }
        Ok(Err(err @ ServiceError::InvalidAddress(_))) => {
            debug!(address, error = %err, "rejected embed request");
            json_response(StatusCode::BAD_REQUEST, json!({"detail": err.to_string()}))
        }
        Ok(Err(err)) => {
            error!(address, error = %err, "embed failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"detail": "Internal server error"}),
            )
        }
        Err(_) => {
            warn!(address, timeout = ?state.request_timeout, "embed request timed out");
            json_response(
                StatusCode::GATEWAY_TIMEOUT,
                json!({"detail": "Timed out waiting for server status"}),
            )
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Health,
    Embed(&'a str),
    Image(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Self {
        if path == "/health" || path == "/healthz" {
            return Route::Health;
        }
        let Some(rest) = path.strip_prefix("/v1/server/") else {
            return Route::NotFound;
        };
        match rest.rsplit_once('/') {
            Some((address, "embed")) if !address.is_empty() => Route::Embed(address),
            Some((address, "image")) if !address.is_empty() => Route::Image(address),
            _ => Route::NotFound,
        }
    }
}

fn text_response(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    set_header(response.headers_mut(), header::CONTENT_TYPE, content_type);
    response
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    text_response(status, JSON, body.to_string())
}

fn set_header(headers: &mut HeaderMap, name: header::HeaderName, value: &'static str) {
    headers.insert(name, HeaderValue::from_static(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use motd_embed_adapters::{OriginError, StatusFetcher};
    use motd_embed_types::{ServerAddress, ServerStatus};

    #[derive(Debug, Default)]
    struct StaticFetcher {
        hang: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusFetcher for StaticFetcher {
        async fn fetch(&self, _address: &ServerAddress) -> Result<ServerStatus, OriginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(ServerStatus::online("§bWelcome"))
        }
    }

    fn state_with(fetcher: StaticFetcher, cors: CorsPolicy) -> AppState {
        AppState {
            service: MotdService::builder(Arc::new(fetcher))
                .origin_timeout(Duration::from_secs(60))
                .build(),
            cors,
            request_timeout: Duration::from_secs(10),
        }
    }

    fn state() -> AppState {
        state_with(StaticFetcher::default(), CorsPolicy::default())
    }

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn routes_parse() {
        assert_eq!(Route::parse("/health"), Route::Health);
        assert_eq!(Route::parse("/healthz"), Route::Health);
        assert_eq!(
            Route::parse("/v1/server/play.example.com/embed"),
            Route::Embed("play.example.com")
        );
        assert_eq!(
            Route::parse("/v1/server/[::1]:25570/image"),
            Route::Image("[::1]:25570")
        );
        assert_eq!(Route::parse("/v1/server//embed"), Route::NotFound);
        assert_eq!(Route::parse("/v1/server/x/other"), Route::NotFound);
        assert_eq!(Route::parse("/"), Route::NotFound);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = handle_request(&state(), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn embed_returns_html() {
        let response = handle_request(&state(), get("/v1/server/play.example.com/embed")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=30");

        let body = body_string(response).await;
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains(r#"<span class="mcformat mcformat-aqua">Welcome</span>"#));
    }

    #[tokio::test]
    async fn invalid_address_is_a_bad_request() {
        let response = handle_request(&state(), get("/v1/server/host:99999/embed")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("\"detail\""));
    }

    #[tokio::test]
    async fn image_is_not_implemented() {
        let response = handle_request(&state(), get("/v1/server/play.example.com/image")).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "not_implemented");
        assert_eq!(body["server"], "play.example.com");
    }

    #[tokio::test]
    async fn unknown_paths_and_methods() {
        let response = handle_request(&state(), get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let post = Request::builder()
            .method(Method::POST)
            .uri("/v1/server/play.example.com/embed")
            .body(())
            .unwrap();
        let response = handle_request(&state(), post).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_request_times_out() {
        let state = state_with(
            StaticFetcher {
                hang: true,
                ..StaticFetcher::default()
            },
            CorsPolicy::default(),
        );
        let response = handle_request(&state, get("/v1/server/slow.example/embed")).await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn wildcard_cors_allows_everyone() {
        let response = handle_request(&state(), get("/health")).await;
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn cors_allow_list_echoes_known_origins_only() {
        let state = state_with(
            StaticFetcher::default(),
            CorsPolicy::new(["https://site.example/"]),
        );

        let allowed = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://site.example")
            .body(())
            .unwrap();
        let response = handle_request(&state, allowed).await;
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://site.example"
        );
        assert_eq!(response.headers()[header::VARY], "Origin");

        let other = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(())
            .unwrap();
        let response = handle_request(&state, other).await;
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn serves_over_tcp_and_shuts_down() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::sync::oneshot;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, Arc::new(state()), async {
            let _ = stop_rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.ends_with(r#"{"status":"ok"}"#));

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
