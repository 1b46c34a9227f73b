use anyhow::Result;
use celeris_offline::application::ports::OfflineRequestStore;
use celeris_offline::domain::RequestUrl;
use celeris_offline::shared::AppConfig;
use celeris_offline::{init_logging, AppState};
use chrono::Utc;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "celeris-offline")]
#[command(about = "Inspect and flush the offline request queue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database holding the queue
    #[arg(long, env = "CELERIS_DATABASE_URL")]
    database_url: Option<String>,

    /// Backend base URL used for reachability checks and replay
    #[arg(long, env = "CELERIS_API_BASE_URL")]
    api_base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List queued requests in replay order
    List,
    /// Replay queued requests now
    Sync {
        /// Replay even if the backend does not answer the reachability check
        #[arg(long)]
        force: bool,
    },
    /// Remove requests older than the configured TTL
    Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(url) = cli.api_base_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }

    let state = AppState::new(config).await?;
    let outcome = match cli.command {
        Commands::List => list(&state).await,
        Commands::Sync { force } => sync(&state, force).await,
        Commands::Sweep => sweep(&state).await,
    };
    state.close().await;
    outcome
}

async fn list(state: &AppState) -> Result<()> {
    let ttl = state.config.offline.request_ttl();
    let now = Utc::now();
    let entries = state.queue.list_all().await?;
    if entries.is_empty() {
        println!("queue is empty");
        return Ok(());
    }
    for entry in entries {
        let age = now - entry.created_at;
        println!(
            "{:>6}  {}  {:<6} {}{}{}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.method,
            entry.url,
            entry
                .local_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_default(),
            if entry.is_expired(now, ttl) {
                format!("  expired ({}m old)", age.num_minutes())
            } else {
                String::new()
            }
        );
    }
    Ok(())
}

async fn sync(state: &AppState, force: bool) -> Result<()> {
    if force {
        state.network.set_online(true);
    } else {
        let probe_url = RequestUrl::new(state.config.api.base_url.clone())
            .map_err(anyhow::Error::msg)?;
        if !state.network.probe(state.transport.as_ref(), &probe_url).await {
            println!("backend unreachable; nothing replayed (use --force to try anyway)");
            return Ok(());
        }
    }

    let report = state.replay.run_pass().await?;
    println!(
        "delivered {}, expired {}, remaining {}",
        report.delivered.len(),
        report.expired.len(),
        report.remaining
    );
    if let Some(failure) = report.aborted_at {
        println!(
            "stopped at request {} ({}): {}",
            failure.request_id,
            failure
                .status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "no response".to_string()),
            failure.reason
        );
    }
    Ok(())
}

async fn sweep(state: &AppState) -> Result<()> {
    let report = state.sweeper.sweep_once().await?;
    println!(
        "examined {}, expired {}, failed {}",
        report.examined,
        report.expired.len(),
        report.failed.len()
    );
    Ok(())
}
