use studyplan_backend::config::Config;
use studyplan_backend::{create_app_with_config, logging};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let addr = config.bind_addr();
    tracing::info!(
        %addr,
        span_ceiling_days = config.span_ceiling_days,
        school_hours_policy = ?config.school_hours_policy,
        enable_adjust = config.enable_adjust,
        "studyplan-backend starting"
    );

    let app = create_app_with_config(config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");
    tracing::info!(%addr, "studyplan-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
