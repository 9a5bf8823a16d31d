//! enroll-web - Student enrollment wizard service
//!
//! Serves the multi-step enrollment form, keeps in-progress submissions in
//! server-side sessions and writes finalized enrollments to the database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use enroll_common::config::{BootstrapConfig, DEFAULT_DATABASE_URL};
use enroll_common::db::init_database;
use enroll_web::session::{spawn_sweeper, SessionStore};
use enroll_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for enroll-web
#[derive(Parser, Debug)]
#[command(name = "enroll-web")]
#[command(about = "Student enrollment wizard service")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ENROLL_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ENROLL_PORT")]
    port: Option<u16>,

    /// Database connection URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Directory for uploaded requirement documents
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the resolved configuration
    fn apply(self, mut config: BootstrapConfig) -> BootstrapConfig {
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = self.database_url {
            config.database_url = url;
        }
        if let Some(dir) = self.upload_dir {
            config.upload_dir = dir;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = BootstrapConfig::resolve(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = args.apply(config);

    // Initialize tracing (RUST_LOG wins over the configured level)
    let level = &config.log_level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("enroll_web={level},enroll_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting enroll-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if config.database_url == DEFAULT_DATABASE_URL {
        warn!(
            "DATABASE_URL not set; using local development database {}",
            DEFAULT_DATABASE_URL
        );
    }

    let pool = init_database(&config.database_url)
        .await
        .context("Failed to initialize database")?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", config.upload_dir.display()))?;
    info!("Upload directory: {}", config.upload_dir.display());

    let ttl = Duration::from_secs(config.session_ttl_secs);
    let sessions = SessionStore::new(ttl);
    let sweeper = spawn_sweeper(sessions.clone(), ttl.max(Duration::from_secs(60)));

    let state = AppState::new(
        pool.clone(),
        sessions,
        config.upload_dir.clone(),
        config.max_upload_bytes,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("enroll-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
