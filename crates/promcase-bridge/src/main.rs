//! promcase bridge
//!
//! - UDP ingest: `type|name|help|labels|action|args`, one line per datagram
//! - Bounded dispatch queue drained by a single dispatcher task
//! - HTTP: /metrics, /healthz, /readyz
//!
//! Failing to load config or to bind either socket aborts startup.

use tracing_subscriber::{fmt, EnvFilter};

use promcase_bridge::{
    app_state::AppState,
    config::{self, LogFormat, LogSection},
    router,
    transport::UdpReceiver,
};
use promcase_core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    init_tracing(&cfg.log);

    let udp_addr = cfg.udp.listen_addr()?;
    let http_addr = cfg.http.listen_addr()?;
    let max_datagram_bytes = cfg.udp.max_datagram_bytes;

    let (state, rx) = AppState::new(cfg)?;
    tokio::spawn(state.dispatcher().run(rx));

    let udp = UdpReceiver::bind(udp_addr, max_datagram_bytes, state.queue(), state.metrics()).await?;
    tracing::info!(listen = %udp.local_addr()?, max_datagram_bytes, "udp ingest listening");
    tokio::spawn(udp.run());

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(listen = %http_addr, "promcase-bridge starting");

    let app = router::build_router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("promcase-bridge stopped");
    Ok(())
}

fn init_tracing(log: &LogSection) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    match log.format {
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    state.set_draining();
    tracing::info!("signal received, starting graceful shutdown");
}
