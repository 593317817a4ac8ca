//! SmartDoc HTTP server entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use smartdoc::config::Config;
use smartdoc::gateway::{HandlerState, create_router_with_state};
use smartdoc::oracle::{OracleMode, Oracles};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_HEALTH_CHECK_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
 ___               _   ___
/ __|_ __  __ _ _ | |_|   \ ___  __
\__ \ '  \/ _` | '_|  _| |) / _ \/ _|
|___/_|_|_\__,_|_|  \__|___/\___/\__|

     READ. PAIR. CONTRADICT.
                            AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        workers = config.workers,
        max_documents = config.max_documents,
        top_sentence_pairs = config.top_sentence_pairs,
        contradiction_threshold = config.contradiction_threshold,
        "SmartDoc starting"
    );

    let oracles = Oracles::load(&config)?;
    let modes = oracles.modes();
    for (component, mode) in [
        ("contradiction", modes.contradiction),
        ("similarity", modes.similarity),
        ("entities", modes.entities),
    ] {
        if mode == OracleMode::Stub {
            tracing::warn!(component, "No model configured, running oracle in stub mode");
        }
    }

    let state = HandlerState::from_config(oracles, &config);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("SmartDoc shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("SMARTDOC_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_HEALTH_CHECK_PORT);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
