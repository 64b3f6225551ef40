pub mod env;
pub mod openapi;
pub mod routes;
pub mod ws_channel;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::MatchedPath;
use axum::http::{HeaderValue, Request};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use context::AppContext;
use sentry::integrations::tower::NewSentryLayer;
use tower::ServiceBuilder;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the full HTTP/WebSocket router over an already-assembled
/// context. Split out from `main` so integration tests can drive it
/// directly against an in-memory `AppContext`.
pub fn router(ctx: Arc<AppContext>, cors_allowed_origins: &[String]) -> Router {
    let allow_origin = if cors_allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(cors_allowed_origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()).collect::<Vec<_>>())
    };

    Router::new()
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json))
        .route("/applications", post(routes::applications::create_application))
        .route("/applications/{application_id}/analysis", get(routes::analysis::get_analysis))
        .route("/stream", get(routes::stream::stream))
        .with_state(ctx)
        .layer(CorsLayer::new().allow_origin(allow_origin).allow_methods(tower_http::cors::Any).allow_headers(tower_http::cors::Any))
        .layer(
            ServiceBuilder::new()
                .layer(NewSentryLayer::<Request<Body>>::new_from_top())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let path = request.uri().path();
                            if path == "/health" {
                                return tracing::Span::none();
                            }
                            let method = request.method();
                            let matched_path =
                                request.extensions().get::<MatchedPath>().map(MatchedPath::as_str).unwrap_or(path);
                            tracing::info_span!(
                                "http_request",
                                method = %method,
                                http.route = %matched_path,
                                otel.name = %format!("{} {}", method, matched_path),
                            )
                        })
                        .on_request(|request: &Request<Body>, _span: &tracing::Span| {
                            if request.uri().path() == "/health" {
                                return;
                            }
                            tracing::info!(method = %request.method(), path = %request.uri().path(), "http_request_started");
                        })
                        .on_response(
                            |response: &axum::http::Response<Body>, latency: Duration, span: &tracing::Span| {
                                if span.is_disabled() {
                                    return;
                                }
                                tracing::info!(
                                    parent: span,
                                    http_status = %response.status().as_u16(),
                                    latency_ms = %latency.as_millis(),
                                    "http_request_finished"
                                );
                            },
                        )
                        .on_failure(
                            |failure_class: ServerErrorsFailureClass, latency: Duration, span: &tracing::Span| {
                                if span.is_disabled() {
                                    return;
                                }
                                tracing::error!(
                                    parent: span,
                                    failure_class = ?failure_class,
                                    latency_ms = %latency.as_millis(),
                                    "http_request_failed"
                                );
                            },
                        ),
                ),
        )
}

async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(openapi::openapi())
}

async fn health() -> &'static str {
    "ok"
}
