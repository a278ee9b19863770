//! ShopAssist server binary.
//!
//! Serves the customer-service chat API on port 8000. The store and chat
//! history live in `PostgreSQL`; the agent side is the Gemini API.
//!
//! Startup order matters: Sentry has to exist before the tracing
//! subscriber so its layer can forward events, and the rustls provider has
//! to be installed before any TLS machinery runs.
//!
//! Migrations are not applied here. Run them explicitly:
//! `cargo run -p shopassist-cli -- migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::{Span, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopassist_server::config::{AppConfig, TlsConfig};
use shopassist_server::state::AppState;
use shopassist_server::{db, routes};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    let config = AppConfig::from_env().expect("configuration error");

    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to the database");
    info!("database pool ready");

    let state = AppState::new(config.clone(), pool);
    let app = build_app(state);

    serve(app, &config).await;
}

/// Initialize Sentry when a DSN is configured. The returned guard flushes
/// pending events on drop and must live for the whole process.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.clone()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };

    Some(sentry::init((dsn, options)))
}

/// Set up the tracing registry: EnvFilter, a JSON layer on Fly (text
/// locally), and the Sentry bridge.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopassist_server=info,tower_http=debug".into());

    let on_fly = std::env::var("FLY_APP_NAME").is_ok();
    let json = on_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text = (!on_fly).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Route warnings and errors to Sentry events, info and debug to
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    use sentry_tracing::EventFilter;

    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

/// Assemble the router: routes, request tracing, state, and the Sentry
/// layers outermost so they see every request.
fn build_app(state: AppState) -> Router {
    routes::routes()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(record_response),
        )
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// One span per request; status and latency are recorded on response.
fn make_request_span(request: &axum::http::Request<axum::body::Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

fn record_response(
    response: &axum::http::Response<axum::body::Body>,
    latency: Duration,
    span: &Span,
) {
    span.record("status", response.status().as_u16());
    span.record(
        "latency_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
    DefaultOnResponse::default().on_response(response, latency, span);
}

/// Serve over HTTPS when a TLS pair is configured, plain HTTP otherwise.
async fn serve(app: Router, config: &AppConfig) {
    let addr = config.socket_addr();

    if let Some(tls) = &config.tls {
        serve_tls(app, addr, tls).await;
    } else {
        info!("server listening on http://{addr}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("failed to bind listen address");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .expect("server error");
    }
}

async fn serve_tls(app: Router, addr: SocketAddr, tls: &TlsConfig) {
    let rustls_config = RustlsConfig::from_pem(
        tls.cert_pem.clone().into_bytes(),
        tls.key_pem.expose_secret().as_bytes().to_vec(),
    )
    .await
    .expect("invalid TLS certificate or key");

    info!("server listening on https://{addr}");

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(30)));
    });

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .expect("server error");
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received");
}
