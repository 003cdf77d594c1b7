use creditlens_client::config::{ServerConfig, ServerOverrides};
use creditlens_client::http::{AppState, router};
use creditlens_client::{ClientError, ClientResult};
use tokio::net::TcpListener;

use crate::cli::ServeArgs;
use crate::stdout_io::write_stdout_line;

pub fn overrides_from_args(args: &ServeArgs) -> ServerOverrides {
    ServerOverrides {
        bind: args.bind.clone(),
        allowed_origins: args.allowed_origins.clone(),
        max_upload_bytes: args.max_upload_bytes.clone(),
        batch_capacity: args.batch_capacity.clone(),
    }
}

/// Resolves config, then blocks on the HTTP server until Ctrl-C.
pub fn run(args: &ServeArgs) -> ClientResult<()> {
    let config = ServerConfig::resolve(overrides_from_args(args))?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| ClientError::server_failed(&error.to_string()))?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> ClientResult<()> {
    let app = router(AppState::from_config(&config), &config);
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|error| ClientError::server_failed(&format!("bind {}: {error}", config.bind)))?;

    log::info!(
        "serving on {} (upload limit {} bytes, {} batches kept)",
        config.bind,
        config.max_upload_bytes,
        config.batch_capacity
    );
    if let Err(error) = write_stdout_line(&format!("CreditLens API listening on http://{}", config.bind)) {
        log::warn!("could not write startup banner: {error}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| ClientError::server_failed(&error.to_string()))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        log::warn!("could not listen for shutdown signal: {error}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
