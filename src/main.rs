use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{info, warn};

use roombook::clock::SystemClock;
use roombook::config::Config;
use roombook::engine::BookingService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    roombook::observability::init_tracing();

    let config = Config::from_env();
    roombook::observability::init_metrics(config.metrics_port)?;

    let store = config.store.build();
    let service = Arc::new(BookingService::new(store, Arc::new(SystemClock)));
    let app = roombook::http::router(service);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("roombook listening on {addr}");
    info!("  store: {}", config.store.as_str());
    let metrics = match config.metrics_port {
        Some(port) => format!("http://0.0.0.0:{port}/metrics"),
        None => "disabled".to_string(),
    };
    info!("  metrics: {metrics}");

    let stop = Arc::new(Notify::new());
    let mut server = tokio::spawn({
        let stop = stop.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { stop.notified().await })
                .await
        }
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received, draining requests...");
        }
    }

    // Stop accepting, then give in-flight requests a bounded window.
    stop.notify_one();
    match tokio::time::timeout(config.drain_timeout, &mut server).await {
        Ok(result) => {
            result??;
            info!("all requests drained");
        }
        Err(_) => {
            warn!("drain timeout after {:?}, aborting open requests", config.drain_timeout);
            server.abort();
        }
    }

    info!("roombook stopped");
    Ok(())
}

/// Resolves on ctrl-c, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("failed to register SIGTERM handler: {e}");
                ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
