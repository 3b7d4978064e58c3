use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ledgerly::{api, config, db, seed, AppState};

#[derive(Parser)]
#[command(name = "ledgerly", version, about = "Small-business back office")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Insert demo data for a tenant
    Seed {
        /// E-mail of the tenant to create or reuse
        #[arg(long)]
        email: String,
        /// Display name used when the tenant is created
        #[arg(long, default_value = "Demo")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first so RUST_LOG from .env applies
    let config = config::init().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ledgerly=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = db::init(&config).await.context("failed to connect to the database")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            db.migrate().await?;
            tracing::info!("migrations applied");
        }
        Command::Seed { email, name } => {
            db.migrate().await?;
            let report = seed::run(&db, &email, &name).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve => {
            db.migrate().await?;

            let addr: SocketAddr = config
                .bind_addr
                .parse()
                .with_context(|| format!("invalid BIND_ADDR '{}'", config.bind_addr))?;
            let state = AppState::new(db, config);
            if !state.planner.is_configured() {
                tracing::warn!("LLM_API_KEY not set, milestone generation is disabled");
            }
            if !state.mailer.is_configured() {
                tracing::warn!("SMTP_HOST not set, e-mailing documents is disabled");
            }

            let app = api::router(state);
            let listener = TcpListener::bind(addr).await?;
            tracing::info!("listening on {}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
