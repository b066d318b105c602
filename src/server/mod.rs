/*!
HTTP surface.

Routes (case-sensitive, literal):
  GET /swaggerui          static Swagger UI page
  GET /swagger            generated description document (YAML)
  GET /<root>[/<seg>...]  mapped + executed command, stdout as body

Paths outside the root prefix get an empty 404. Failures are answered with
the error text (500, or 503 when the executor is saturated) and logged with
the caller address and request URI.
*/

mod args;
mod config;

pub use args::ServeArgs;
pub use config::{DEFAULT_VERSION, ServeOptions, ServerConfig};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Method, StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info};

use crate::error::Error;
use crate::executor::CommandExecutor;
use crate::mapper::RequestMapper;
use crate::openapi;
use crate::tree::CommandNode;

pub const VIEWER_ROUTE: &str = "/swaggerui";
pub const SPEC_ROUTE: &str = "/swagger";

const VIEWER_PAGE: &str = include_str!("../../assets/swaggerui.html");
const YAML_CONTENT_TYPE: &str = "application/yaml";

/* ---- State ---- */

/// Immutable per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    tree: Arc<CommandNode>,
    config: Arc<ServerConfig>,
    executor: CommandExecutor,
    timeout: Duration,
}

impl AppState {
    pub fn new(tree: CommandNode, config: ServerConfig, executor: CommandExecutor) -> Self {
        Self {
            tree: Arc::new(tree),
            config: Arc::new(config),
            executor,
            timeout: ServeOptions::default().timeout,
        }
    }

    /// Upper bound on how long a single command request may run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/* ---- Router ---- */

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(VIEWER_ROUTE, get(serve_viewer))
        .route(SPEC_ROUTE, get(serve_spec))
        .fallback(serve_run)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Bind, serve until Ctrl-C.
pub async fn serve(
    tree: CommandNode,
    config: ServerConfig,
    opts: ServeOptions,
) -> anyhow::Result<()> {
    let address = opts.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(
        "Starting Garter server for {} at {}",
        config.exec_path().display(),
        address
    );
    info!(tree = %tree, "command tree");

    let executor = CommandExecutor::new(opts.max_concurrent, opts.overflow);
    match executor.limit() {
        Some(limit) => info!(limit, overflow = ?opts.overflow, "command slots"),
        None => info!("command slots: unbounded"),
    }
    let state = AppState::new(tree, config, executor).with_timeout(opts.timeout);
    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

/* ---- Handlers ---- */

async fn serve_viewer() -> Html<&'static str> {
    Html(VIEWER_PAGE)
}

async fn serve_spec(State(state): State<AppState>, request: Request) -> Response {
    match openapi::generate(&state.tree, &state.config).to_yaml() {
        Ok(body) => ([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], body).into_response(),
        Err(err) => fail(&Origin::of(&request), err),
    }
}

async fn serve_run(State(state): State<AppState>, request: Request) -> Response {
    // No borrow of `request` may live across the await below (Body is not Sync).
    let origin = Origin::of(&request);
    let is_get = request.method() == Method::GET;

    let path = origin.uri.path();
    if !has_root_prefix(path, state.config.root_name()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if !is_get {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let mapper = RequestMapper::new(&state.tree, state.config.exec_path());
    let invocation = match mapper.map(path, origin.uri.query()) {
        Ok(invocation) => invocation,
        Err(err) => return fail(&origin, err),
    };
    info!(command = %invocation.command_line(), "running");

    match tokio::time::timeout(state.timeout, state.executor.run(&invocation)).await {
        Ok(Ok(output)) => output.into_body().into_response(),
        Ok(Err(err)) => fail(&origin, err),
        Err(_) => fail(
            &origin,
            Error::TimedOut {
                after: state.timeout,
            },
        ),
    }
}

/// `/root` itself or anything below `/root/`.
fn has_root_prefix(path: &str, root: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(root))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Caller address and request URI, kept for failure logs.
struct Origin {
    remote: String,
    uri: Uri,
}

impl Origin {
    fn of(request: &Request) -> Self {
        Self {
            remote: remote_addr(request),
            uri: request.uri().clone(),
        }
    }
}

fn fail(origin: &Origin, err: Error) -> Response {
    error!(remote = %origin.remote, uri = %origin.uri, "{err}");
    err.into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.to_string()).into_response()
    }
}

/* ---- Middleware ---- */

async fn log_request(request: Request, next: Next) -> Response {
    let remote = remote_addr(&request);
    let uri = request.uri().to_string();
    let span = tracing::info_span!(
        "http.request",
        remote = %remote,
        method = %request.method(),
        uri = %uri,
    );
    async move {
        info!("request from {remote}: {uri}");
        next.run(request).await
    }
    .instrument(span)
    .await
}

fn remote_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
