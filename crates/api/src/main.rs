use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use cohort_api::config::{ConfigError, ServerConfig, SheetsBackendKind};
use cohort_api::router::build_app_router;
use cohort_api::secrets::{Secrets, SecretsError, SECTION_ADMIN};
use cohort_api::state::AppState;
use cohort_events::{Mailer, NotifyError, Notifier, RecordingMailer, SmtpMailer};
use cohort_sheets::{MemoryBackend, SheetClient, SheetError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Secrets(#[from] SecretsError),

    #[error("Secrets file is incomplete ({0} missing items)")]
    IncompleteSecrets(usize),

    #[error("Cannot set up the spreadsheet client: {0}")]
    Sheets(#[from] SheetError),

    #[error("Cannot set up the mail transport: {0}")]
    Mail(#[from] NotifyError),

    #[error("Invalid HOST address '{0}'")]
    Host(String),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cohort_api=debug,cohort_sheets=debug,cohort_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        sheets_backend = %config.sheets_backend,
        "Loaded server configuration"
    );

    // --- Secrets checklist ---
    let secrets = Secrets::load(&config.secrets_path)?;
    let missing = match config.sheets_backend {
        SheetsBackendKind::Google => secrets.missing(),
        SheetsBackendKind::Memory => secrets.missing_in(&[SECTION_ADMIN]),
    };
    if !missing.is_empty() {
        for item in &missing {
            tracing::error!(path = %config.secrets_path.display(), "{item}");
        }
        return Err(StartupError::IncompleteSecrets(missing.len()));
    }
    let admin = secrets.admin()?;

    // --- Spreadsheet + mail ---
    let (sheets, mailer): (SheetClient, Arc<dyn Mailer>) = match config.sheets_backend {
        SheetsBackendKind::Google => {
            let sheets = SheetClient::google(secrets.service_account()?, &secrets.sheet_url()?)?;
            let mailer = SmtpMailer::new(&secrets.mail_config()?)?;
            (sheets, Arc::new(mailer))
        }
        SheetsBackendKind::Memory => {
            tracing::warn!("Using the in-memory spreadsheet; data is lost on exit");
            let mailer: Arc<dyn Mailer> = match secrets.mail_config() {
                Ok(mail) => Arc::new(SmtpMailer::new(&mail)?),
                Err(_) => {
                    tracing::warn!("No [gmail] section; notifications are recorded, not sent");
                    Arc::new(RecordingMailer::new())
                }
            };
            (SheetClient::memory(Arc::new(MemoryBackend::new())), mailer)
        }
    };

    // --- App state + router ---
    let state = AppState::new(config.clone(), admin, sheets, Notifier::new(mailer));
    let app = build_app_router(state)?;

    // --- Start server ---
    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|_| StartupError::Host(config.host.clone()))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). If a handler cannot
/// be installed, that signal source is ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
