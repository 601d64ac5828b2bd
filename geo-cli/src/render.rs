//! Terminal rendering of job state

use colored::*;
use geo_core::{Category, JobState, JobStatus};
use geo_poller::{PollPhase, PollState};

const BAR_WIDTH: usize = 30;

/// Colorize a job state for display
pub fn colorize_state(state: JobState) -> ColoredString {
    let name = state.to_string();
    match state {
        JobState::Pending => name.yellow(),
        JobState::GeneratingCategories | JobState::ExpandingQueries => name.blue(),
        JobState::ExecutingQueries => name.cyan(),
        JobState::Completed => name.green(),
        JobState::Failed => name.red(),
        JobState::Cancelled => name.dimmed(),
        JobState::Unknown => name.normal(),
    }
}

/// Text progress bar for a percentage in `[0, 100]`
pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

/// Elapsed time as `1h02m03s`, `2m05s` or `7s`
pub fn format_elapsed(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m{:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// One-line progress summary of a status snapshot
pub fn progress_line(status: &JobStatus) -> String {
    let mut line = format!(
        "{} {:>5.1}%  {}/{} queries",
        progress_bar(status.clamped_progress()),
        status.clamped_progress(),
        status.completed_queries,
        status.total_queries
    );
    if status.failed_queries > 0 {
        line.push_str(&format!(", {} failed", status.failed_queries));
    }
    if let Some(elapsed) = status.elapsed_seconds {
        line.push_str(&format!("  {}", format_elapsed(elapsed)));
    }
    line
}

/// Print the progress line for a poller state change
pub fn print_poll_update(state: &PollState) {
    if let Some(status) = &state.status {
        println!(
            "  {} {:<22} {}",
            "▸".cyan(),
            colorize_state(status.status),
            progress_line(status)
        );
    }
    if let Some(error) = &state.fetch_error {
        println!(
            "  {} {}",
            "⚠".yellow(),
            format!(
                "Could not refresh status ({} in a row): {}",
                state.consecutive_failures, error
            )
            .yellow()
        );
        if state.fetch_error_permanent {
            println!(
                "    {}",
                "Retrying is unlikely to help; press Ctrl-C to stop watching.".dimmed()
            );
        }
    }
    if let Some(error) = &state.cancel_error {
        println!("  {} {}", "⚠".yellow(), format!("Cancel failed: {}", error).yellow());
    }
}

/// Print the final outcome of a poller
pub fn print_poll_summary(state: &PollState) {
    println!();
    match state.phase {
        PollPhase::Completed => println!("{}", format!("✓ Job {} completed", state.job_id).green()),
        PollPhase::Failed => {
            println!("{}", format!("✗ Job {} failed", state.job_id).red());
            if let Some(error) = &state.error {
                println!("  {}", error.red());
            }
        }
        PollPhase::Cancelled => println!("{}", format!("Job {} was cancelled", state.job_id).dimmed()),
        PollPhase::CancelRequested => println!(
            "{}",
            format!("Cancellation of job {} requested", state.job_id).yellow()
        ),
        PollPhase::GaveUp => println!(
            "{}",
            format!(
                "Stopped watching job {} after {} failed status fetches",
                state.job_id, state.consecutive_failures
            )
            .red()
        ),
        PollPhase::Disposed => println!("{}", "Stopped watching.".dimmed()),
        PollPhase::Active => {}
    }
}

/// Print detailed job information
pub fn print_status_details(status: &JobStatus) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", status.id.to_string().cyan());
    println!("  Status:      {}", colorize_state(status.status));
    println!("  Progress:    {}", progress_line(status));
    println!(
        "  Queries:     {} total, {} completed, {} failed, {} remaining",
        status.total_queries,
        status.completed_queries,
        status.failed_queries,
        status.remaining_queries()
    );

    if let Some(started) = status.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = status.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(elapsed) = status.elapsed_seconds {
        println!("  Elapsed:     {}", format_elapsed(elapsed));
    }

    if status.status == JobState::Failed {
        println!("\n{}", "Error:".bold());
        println!("{}", status.failure_message().red());
    }
}

/// Print a category list
pub fn print_categories(categories: &[Category]) {
    println!("{}", format!("Categories ({}):", categories.len()).bold());
    for category in categories {
        println!(
            "  {} {} {}",
            format!("{:>2}.", category.order_index).dimmed(),
            category.name.cyan(),
            format!("[{}, {} queries]", category.provider, category.query_count).dimmed()
        );
        if let Some(description) = &category.description {
            println!("      {}", description);
        }
    }
}
