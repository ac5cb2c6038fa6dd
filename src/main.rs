//! Accredify Sync - offline-first sync client for the compliance tracker.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use accredify_sync::config::{Args, Command};
use accredify_sync::SyncSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("accredify_sync={log_level},info").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("API: {}", args.api_url);
    info!("Data dir: {}", args.data_dir.display());
    info!(
        "Auth: {}",
        if args.token.is_some() { "token" } else { "none" }
    );

    let session = SyncSession::new(&args)?;

    match args.command {
        Command::Status => {
            let reachable = session.monitor().check_now().await;
            let queued = session.queue().count();
            println!(
                "server: {}",
                if reachable { "reachable" } else { "unreachable" }
            );
            println!("queued updates: {queued}");
            match session.cache().last_synced_at() {
                Some(at) => println!("last synced: {at}"),
                None => println!("last synced: never"),
            }
            println!(
                "data mode: {}",
                session.mode().get(session.api().has_token())
            );
        }
        Command::Fetch => {
            let count = session.refresh_cache().await?;
            println!("cached {count} project(s)");
        }
        Command::Sync => {
            if !session.monitor().check_now().await {
                error!("Server unreachable; queued updates kept for later");
                std::process::exit(1);
            }
            let report = session.reconciler().sync_all().await;
            println!(
                "synced: {} succeeded, {} failed, {} still queued",
                report.succeeded.len(),
                report.failed.len(),
                report.remaining
            );
            for failure in &report.failed {
                println!("  {}: {}", failure.indicator_id, failure.reason);
            }
            if report.queue_drained() {
                // Empty queue: the server is authoritative again.
                let count = session.refresh_cache().await?;
                println!("refreshed snapshot ({count} project(s))");
            }
        }
        Command::Discard => {
            let queued = session.queue().count();
            session.reconciler().discard_all()?;
            println!("discarded {queued} queued update(s)");
        }
        Command::Upcoming => {
            let buckets = session.api().fetch_upcoming().await?;
            println!("overdue: {}", buckets.overdue.len());
            println!("due today: {}", buckets.due_today.len());
            for (frequency, tasks) in &buckets.by_frequency {
                println!("{frequency}: {}", tasks.len());
            }
            println!("total: {}", buckets.total());
        }
        Command::QuickLog { id } => {
            let indicator = session.api().quick_log(&id).await?;
            println!("{}: {}", indicator.id, indicator.status);
        }
        Command::Watch => {
            session.monitor().subscribe(|reachable| {
                println!(
                    "server is {}",
                    if reachable { "reachable" } else { "unreachable" }
                );
            });
            session.monitor().start(true);
            info!("watching connectivity; press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            session.shutdown();
        }
    }

    Ok(())
}
