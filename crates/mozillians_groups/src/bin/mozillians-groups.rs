//! Mozillians group maintenance - runs one periodic membership job.
//!
//! Loads the membership configuration and a JSON snapshot of the entity
//! store, runs the requested job, logs every notification it produced and
//! writes the snapshot back.

use chrono::Utc;
use clap::{Parser, Subcommand};
use mozillians_groups::{
    GroupManager, InMemoryStore, LogSink, MembershipConfig, NotificationWorker, QueuedNotifier,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the maintenance runner.
#[derive(Parser, Debug)]
#[command(name = "mozillians-groups")]
#[command(about = "Mozillians group maintenance jobs")]
#[command(version)]
struct Args {
    /// Path to membership configuration file
    #[arg(short, long, env = "MOZILLIANS_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the entity store snapshot
    #[arg(short, long, default_value = "mozillians.json")]
    snapshot: PathBuf,

    /// Run the job but don't write the snapshot back
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    job: Job,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Job {
    /// Delete groups and skills without members
    RemoveEmpty,
    /// Remind curators about new pending requests
    RemindPending,
    /// Expire memberships past their group's invalidation period
    Invalidate,
    /// Warn members whose membership is about to expire
    NotifyRenewal,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(job = ?args.job, snapshot = ?args.snapshot, "Starting maintenance job");

    let config = match &args.config {
        Some(path) => MembershipConfig::from_file(path)?,
        None => MembershipConfig::default(),
    };
    let retry = config.retry().clone();
    let store = InMemoryStore::load_json_file(&args.snapshot)?;

    let (notifier, queue) = QueuedNotifier::channel();
    let worker = tokio::spawn(NotificationWorker::new(queue, LogSink, retry).run());

    let manager = GroupManager::new(store.clone(), notifier, config);
    let now = Utc::now();
    match args.job {
        Job::RemoveEmpty => {
            let removed = manager.remove_empty_groups().await?;
            info!(groups = removed.groups, skills = removed.skills, "Done");
        }
        Job::RemindPending => {
            let reminded = manager.send_pending_membership_reminders().await?;
            info!(reminded, "Done");
        }
        Job::Invalidate => {
            let invalidated = manager.invalidate_memberships(now).await?;
            info!(invalidated, "Done");
        }
        Job::NotifyRenewal => {
            let flagged = manager.notify_membership_renewal(now).await?;
            info!(flagged, "Done");
        }
    }

    // Dropping the manager closes the queue so the worker can finish.
    drop(manager);
    let stats = worker.await?;
    info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "Notifications flushed"
    );

    if args.dry_run {
        info!("DRY RUN MODE - snapshot not written");
    } else {
        store.save_json_file(&args.snapshot).await?;
        info!(snapshot = ?args.snapshot, "Snapshot saved");
    }
    Ok(())
}
