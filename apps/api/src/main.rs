use std::net::SocketAddr;
use std::time::Duration;

use context::ContextConfig;
use screening_api::env::env;
use tracing_subscriber::prelude::*;

fn main() -> std::io::Result<()> {
    rustls::crypto::aws_lc_rs::default_provider().install_default().expect("failed to install rustls crypto provider");

    let env = env();

    let _guard = sentry::init(sentry::ClientOptions {
        dsn: env.sentry_dsn.as_ref().and_then(|s| s.parse().ok()),
        release: option_env!("APP_VERSION").map(|v| format!("screening-api@{}", v).into()),
        environment: Some(if cfg!(debug_assertions) { "development" } else { "production" }.into()),
        traces_sample_rate: 1.0,
        sample_rate: 1.0,
        attach_stacktrace: true,
        max_breadcrumbs: 100,
        ..Default::default()
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry::integrations::tracing::layer())
        .init();

    tokio::runtime::Builder::new_multi_thread().enable_all().build()?.block_on(async {
        let config = ContextConfig {
            database_url: env.database_url.clone(),
            broker_url: env.broker_url.clone(),
            outbox_flush_interval_seconds: env.outbox_flush_interval_seconds,
            upstream: env.upstream.clone(),
            models: env.models.clone(),
            dialog: env.dialog,
        };
        let ctx = context::AppContext::build(config).await.expect("failed to assemble application context");
        let app = screening_api::router(ctx, &env.cors_allowed_origins);

        let addr = SocketAddr::from(([0, 0, 0, 0], env.port));
        tracing::info!(addr = %addr, "server_listening");

        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.unwrap();
    });

    if let Some(client) = sentry::Hub::current().client() {
        client.close(Some(Duration::from_secs(2)));
    }

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown_signal_received");
}
