//! agro-ui - AgroDetect web interface
//!
//! Serves the register/login/scan pages, the leaf analyzer, voice guidance
//! and certificate downloads.
//!
//! Bootstrap settings resolve as CLI > environment > TOML > compiled default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use agro_common::config::{self, CompiledDefaults, RootFolderInitializer, RootFolderResolver};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agro_ui::services::{CertificateGenerator, VoiceRenderer};
use agro_ui::{build_router, AppState};

const MODULE_NAME: &str = "agro-ui";

/// Command-line arguments for agro-ui
#[derive(Parser, Debug)]
#[command(name = "agro-ui")]
#[command(about = "AgroDetect leaf scan web interface")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "AGRO_PORT")]
    port: Option<u16>,

    /// Root folder holding the database and certificates
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // TOML is read before tracing starts so its log level can apply
    let toml_config = config::load_or_default(args.config.as_deref(), MODULE_NAME);
    let defaults = CompiledDefaults::for_current_platform();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "agro_ui={level},agro_common={level},tower_http={level}",
                level = toml_config.logging.level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting AgroDetect UI (agro-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_override(args.root_folder)
        .with_toml_root(toml_config.root_folder.clone())
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db = agro_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    match agro_ui::db::import_legacy_accounts(&db, &initializer.legacy_accounts_path()).await {
        Ok(0) => {}
        Ok(count) => info!("Imported {} legacy accounts", count),
        Err(e) => warn!("Legacy account import skipped: {}", e),
    }

    let voice = VoiceRenderer::from_config(&toml_config.voice)
        .context("Failed to build speech client")?;
    if toml_config.voice.enabled {
        info!("Voice assistance via {}", toml_config.voice.base_url);
    } else {
        info!("Voice assistance disabled");
    }

    let certificates = CertificateGenerator::new(initializer.certificates_path());
    info!("Certificates: {}", certificates.cert_dir().display());

    let state = AppState::new(db, voice, certificates)
        .with_session_idle_timeout(Duration::from_secs(
            toml_config
                .session_idle_timeout_secs
                .unwrap_or(defaults.session_idle_timeout_secs),
        ))
        .with_max_upload_bytes(toml_config.max_upload_bytes.unwrap_or(defaults.max_upload_bytes));

    let app = build_router(state);

    let bind_address = toml_config
        .bind_address
        .clone()
        .unwrap_or(defaults.bind_address);
    let port = args.port.or(toml_config.port).unwrap_or(defaults.port);
    let addr: SocketAddr = format!("{}:{}", bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
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
