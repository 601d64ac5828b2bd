//! Job command handlers
//!
//! Handles all job-related CLI commands: showing status and categories,
//! requesting cancellation, and watching a job until it finishes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use colored::*;
use geo_client::GeoClient;
use geo_core::JobId;
use geo_poller::{Callbacks, JobPoller, PollPhase, PollerConfig, PollerError};
use tracing::{info, warn};

use crate::config::Config;
use crate::render::{print_categories, print_poll_summary, print_poll_update, print_status_details};

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Show the current status of a job
    Status {
        /// Job ID
        id: JobId,

        /// Print the raw status as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the categories a job has produced
    Categories {
        /// Job ID
        id: JobId,
    },
    /// Request cancellation of a job
    Cancel {
        /// Job ID
        id: JobId,
    },
    /// Follow a job until it completes, fails or is cancelled
    Watch {
        /// Job ID
        id: JobId,

        /// Cancel the job on Ctrl-C instead of only detaching
        #[arg(long)]
        cancel_on_interrupt: bool,

        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Poller tunables for `job watch`
#[derive(Args, Debug)]
pub struct PollArgs {
    /// Milliseconds between status fetches
    #[arg(long, env = "GEO_POLL_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Keep polling after a cancel request until the job reports cancelled
    #[arg(long)]
    await_confirmation: bool,

    /// Stop watching after this many consecutive failed fetches
    #[arg(long, env = "GEO_GIVE_UP_AFTER")]
    give_up_after: Option<u32>,

    /// Do not fetch categories while the job runs
    #[arg(long)]
    no_categories: bool,
}

impl PollArgs {
    /// Overlays the command-line flags on the environment configuration
    fn to_config(&self) -> Result<PollerConfig> {
        let mut config = PollerConfig::from_env().context("Invalid poller configuration")?;
        if let Some(ms) = self.interval_ms {
            config = config.with_interval(Duration::from_millis(ms));
        }
        if self.await_confirmation {
            config = config.with_cancel_confirmation(true);
        }
        if self.give_up_after.is_some() {
            config = config.with_give_up_after(self.give_up_after);
        }
        if self.no_categories {
            config = config.with_categories(false);
        }
        config.validate().context("Invalid poller configuration")?;
        Ok(config)
    }
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::Status { id, json } => show_status(&client, id, json).await,
        JobCommands::Categories { id } => show_categories(&client, id).await,
        JobCommands::Cancel { id } => cancel_job(&client, id).await,
        JobCommands::Watch {
            id,
            cancel_on_interrupt,
            poll,
        } => watch_job(client, id, cancel_on_interrupt, poll.to_config()?).await,
    }
}

/// Get and display a job's status
async fn show_status(client: &GeoClient, id: JobId, json: bool) -> Result<()> {
    let status = client
        .get_job_status(id)
        .await
        .with_context(|| format!("Failed to fetch status of job {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status_details(&status);
    }

    Ok(())
}

/// Get and display a job's categories
async fn show_categories(client: &GeoClient, id: JobId) -> Result<()> {
    let categories = client
        .get_job_categories(id)
        .await
        .with_context(|| format!("Failed to fetch categories of job {}", id))?;

    if categories.is_empty() {
        println!("{}", "No categories yet.".yellow());
    } else {
        print_categories(&categories);
    }

    Ok(())
}

/// Request cancellation of a job
async fn cancel_job(client: &GeoClient, id: JobId) -> Result<()> {
    client
        .cancel_job(id)
        .await
        .with_context(|| format!("Failed to cancel job {}", id))?;

    println!("{}", format!("✓ Cancellation of job {} requested", id).green());
    println!(
        "{}",
        "  The job stops once the backend reports it as cancelled.".dimmed()
    );

    Ok(())
}

/// Follow a job with a poller until it stops
async fn watch_job(
    client: GeoClient,
    id: JobId,
    cancel_on_interrupt: bool,
    poller_config: PollerConfig,
) -> Result<()> {
    let poller = JobPoller::new(Arc::new(client), poller_config)?;

    let callbacks = Callbacks::on_complete(|id| info!("Job {} completed", id))
        .with_failure(|id, message| warn!("Job {} failed: {}", id, message));
    let handle = poller.start_job(id, callbacks);
    // Yields the current state first, so a job that already stopped is seen
    let mut updates = handle.subscribe();

    println!("{}", format!("Watching job {} (Ctrl-C to stop):", id).bold());
    let mut categories_shown = false;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_poll_update(&state);

                if !categories_shown && !state.categories.is_empty() {
                    print_categories(&state.categories);
                    categories_shown = true;
                }

                if !state.is_active() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !cancel_on_interrupt {
                    handle.dispose();
                    break;
                }

                match handle.cancel().await {
                    Ok(()) if handle.is_active() => {
                        println!("{}", "Cancellation requested, waiting for confirmation...".yellow());
                    }
                    Ok(()) => break,
                    Err(PollerError::NotActive { .. }) => break,
                    Err(e) => {
                        // Polling continues; another Ctrl-C retries
                        println!("{}", format!("{:#}", anyhow::Error::from(e)).red());
                    }
                }
            }
        }
    }

    let state = handle.state();
    print_poll_summary(&state);

    match state.phase {
        PollPhase::Failed => bail!(
            "Job {} failed: {}",
            id,
            state.error.as_deref().unwrap_or_default()
        ),
        PollPhase::GaveUp => bail!(
            "Gave up on job {}: {}",
            id,
            state.fetch_error.as_deref().unwrap_or_default()
        ),
        _ => Ok(()),
    }
}
