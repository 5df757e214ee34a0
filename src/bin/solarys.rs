use std::path::PathBuf;

use clap::{Parser, Subcommand};
use solarys::{
    backend::{
        self,
        auth::{AuthService, SqliteAuthService},
    },
    config::create_app,
    settings::Settings,
    state::AppState,
};
use tokio::{
    net::TcpListener,
    signal::ctrl_c,
    sync::broadcast::error::RecvError,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[clap(about = "Enrollment site for the Solarys sports club")]
struct Cli {
    /// TOML settings file. Environment variables override it.
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (the default).
    Serve,
    /// Create an administrator account for the dashboard.
    CreateAdmin { email: String, password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let pool = backend::connect(&settings.database_url)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::CreateAdmin { email, password } => {
            let admin =
                SqliteAuthService::new(pool).create_admin(&email, &password)?;
            println!("created admin {} ({})", admin.email, admin.id);
            Ok(())
        }
        Command::Serve => serve(pool, settings).await,
    }
}

async fn serve(
    pool: backend::DbPool,
    settings: Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let address = settings.bind_address.clone();
    let state = AppState::new(pool, settings)?;

    let mut sessions = state.auth.subscribe();
    tokio::spawn(async move {
        loop {
            match sessions.recv().await {
                Ok(change) => match change.session {
                    Some(admin) => info!("admin session opened for {}", admin.email),
                    None => info!("admin session closed for {}", change.admin_id),
                },
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("missed {n} session change(s)")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = create_app(state);

    let listener = TcpListener::bind(&address).await?;
    info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("could not install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("could not install signal handler: {e}");
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
}
