//! quotesync command-line front end.
//!
//! Keeps a quote collection in a local SQLite file and syncs it against a
//! remote JSON endpoint.
//!
//! Usage:
//!   quotesync show --category Life
//!   quotesync add "Carpe diem" Motivation
//!   quotesync sync --apply-server
//!   quotesync watch --interval-secs 30

mod settings;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use quotesync_storage::SqliteStore;
use quotesync_sync::{
    DiffResult, HttpQuoteSource, ImportMode, Resolution, SyncController, SyncEvent, SyncOutcome,
};
use settings::Overrides;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quotesync")]
#[command(about = "Quote collection with best-effort remote sync")]
struct Args {
    /// Path to the local quote database
    #[arg(long, default_value = "quotesync.db")]
    db: PathBuf,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote endpoint (overrides the config file)
    #[arg(long)]
    endpoint: Option<String>,

    /// Do not echo added quotes to the remote
    #[arg(long)]
    no_publish: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a random quote
    Show {
        /// Only pick from this category ("all" for any)
        #[arg(long)]
        category: Option<String>,
        /// Show the last viewed quote instead, if there is one
        #[arg(long)]
        last: bool,
    },
    /// Add a quote
    Add { text: String, category: String },
    /// List categories
    Categories,
    /// List every quote
    List,
    /// Import quotes from a JSON file
    Import {
        file: PathBuf,
        /// Replace the collection instead of merging
        #[arg(long)]
        replace: bool,
    },
    /// Export quotes to a JSON file
    Export { file: PathBuf },
    /// Sync once against the remote
    Sync {
        /// Let the server win without asking
        #[arg(long, conflicts_with = "keep_local")]
        apply_server: bool,
        /// Keep local quotes without asking
        #[arg(long)]
        keep_local: bool,
    },
    /// Sync automatically until interrupted (server wins)
    Watch {
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = settings::load(args.config.as_deref())?;
    let interval_secs = match &args.command {
        Command::Watch { interval_secs } => *interval_secs,
        _ => None,
    };
    Overrides {
        endpoint: args.endpoint,
        interval_secs,
        no_publish: args.no_publish,
    }
    .apply(&mut config);

    let store = SqliteStore::open(&args.db)
        .with_context(|| format!("failed to open {}", args.db.display()))?;
    let source = HttpQuoteSource::new(&config)?;
    let controller = Arc::new(SyncController::new(
        Arc::new(store),
        Arc::new(source),
        config,
    ));

    match args.command {
        Command::Show { category, last } => show(&controller, category.as_deref(), last).await,
        Command::Add { text, category } => {
            let quote = controller.add_quote(&text, &category).await?;
            println!("Added {quote}");
            controller.flush_publishes().await;
            Ok(())
        }
        Command::Categories => {
            for category in controller.categories().await {
                println!("{category}");
            }
            Ok(())
        }
        Command::List => {
            for (index, quote) in controller.quotes().await.iter().enumerate() {
                println!("{index:>3}  {quote}");
            }
            Ok(())
        }
        Command::Import { file, replace } => {
            let json = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let summary = controller.import_json(&json, mode).await?;
            println!(
                "Imported {} quotes ({} rejected), {} total",
                summary.imported, summary.rejected, summary.total
            );
            Ok(())
        }
        Command::Export { file } => {
            let json = controller.export_json().await?;
            tokio::fs::write(&file, json)
                .await
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("Exported to {}", file.display());
            Ok(())
        }
        Command::Sync {
            apply_server,
            keep_local,
        } => sync_once(&controller, apply_server, keep_local).await,
        Command::Watch { .. } => watch(&controller).await,
    }
}

async fn show(controller: &SyncController, category: Option<&str>, last: bool) -> Result<()> {
    if last {
        if let Some(quote) = controller.last_viewed().await {
            println!("{quote}");
            return Ok(());
        }
    }
    match controller.random_quote(category).await {
        Some(quote) => println!("{quote}"),
        None => println!("No quotes available for \"{}\".", category.unwrap_or("all")),
    }
    Ok(())
}

async fn sync_once(
    controller: &SyncController,
    apply_server: bool,
    keep_local: bool,
) -> Result<()> {
    let diff = match controller.manual_sync().await? {
        SyncOutcome::PendingResolution(diff) => diff,
        _ => {
            println!("No changes.");
            return Ok(());
        }
    };

    print_diff(&diff);
    let resolution = if apply_server {
        Resolution::ApplyServer
    } else if keep_local {
        Resolution::KeepLocal
    } else if confirm("Apply server version?")? {
        Resolution::ApplyServer
    } else {
        Resolution::KeepLocal
    };

    match controller.resolve(resolution).await? {
        SyncOutcome::Applied(_) => println!("Server quotes applied."),
        _ => println!("Kept local quotes."),
    }
    Ok(())
}

async fn watch(controller: &Arc<SyncController>) -> Result<()> {
    let mut events = controller.subscribe();
    controller.start_auto_sync(controller.config().auto_sync_interval())?;
    info!("Watching {} (Ctrl-C to stop)", controller.config().endpoint);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(event) => report(&event),
                Err(RecvError::Lagged(n)) => info!("missed {n} sync notifications"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    controller.stop_auto_sync().await;
    Ok(())
}

fn report(event: &SyncEvent) {
    match event {
        SyncEvent::Applied { diff, .. } => {
            println!("Synced with server ({} changes).", diff.change_count());
        }
        SyncEvent::NoChanges { .. } => println!("Already up to date."),
        SyncEvent::Failed { reason, .. } => println!("Sync failed: {reason}"),
        SyncEvent::StorageUnavailable { reason } => {
            println!("Warning: quotes are not being saved ({reason}).");
        }
        _ => {}
    }
}

fn print_diff(diff: &DiffResult) {
    for quote in &diff.added {
        println!("+ {quote}");
    }
    for quote in &diff.removed {
        println!("- {quote}");
    }
    for conflict in &diff.conflicts {
        println!(
            "~ \"{}\": local {} / server {}",
            conflict.text, conflict.local_category, conflict.server_category
        );
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no answer on stdin; pass --apply-server or --keep-local");
    }
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
