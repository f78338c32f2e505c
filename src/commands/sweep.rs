//! Find-and-delete command implementation.
//!
//! Drives the full operation from the terminal: find matching items,
//! preview them, stop in dry-run mode, ask for confirmation, then run the
//! batch scheduler to completion.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use bulksweep::api::FindRequest;
use bulksweep::client::{BatchScheduler, SchedulerError, StartGate, SweepClient};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    server: &str,
    token: Option<String>,
    actor: &str,
    content_type: &str,
    taxonomy: &str,
    term_filter: &str,
    delete_empty_terms: bool,
    batch_size: usize,
    pause_secs: u64,
    dry_run: bool,
    assume_yes: bool,
) -> Result<()> {
    let client = SweepClient::new(server, token, actor);
    client
        .health()
        .await
        .with_context(|| format!("server {server} is not reachable"))?;

    let request = FindRequest {
        content_type: content_type.to_string(),
        taxonomy: taxonomy.to_string(),
        term_filter: term_filter.to_string(),
        delete_empty_terms,
    };
    let found = client.find(&request).await?;

    for line in found.message.lines() {
        println!("{line}");
    }
    if !found.success {
        bail!("find rejected: {}", found.message);
    }
    for post in &found.posts {
        println!("  {} (id {})", post.title, post.id);
    }

    if found.count == 0 {
        println!("Nothing to delete.");
        return Ok(());
    }
    if dry_run {
        println!(
            "Dry run: {} items would be deleted. Re-run without --dry-run to delete them.",
            found.count
        );
        return Ok(());
    }

    let confirmed = assume_yes || confirm(found.count)?;
    let ids: Vec<u64> = found.posts.iter().map(|p| p.id).collect();

    let scheduler = BatchScheduler::new(client, batch_size, Duration::from_secs(pause_secs))
        .on_progress(|p| {
            println!("[{:>3}%] {}", p.percent, p.message);
        })
        .on_post_batch(|ids, response| match response {
            Some(response) => {
                for detail in &response.details {
                    println!("  - {detail}");
                }
            }
            None => {
                println!("  ! batch of {} items failed to dispatch; counted as errors", ids.len());
            }
        });

    let outcome = scheduler
        .run(
            ids,
            StartGate {
                dry_run,
                confirmed,
            },
        )
        .await;

    match outcome {
        Ok(outcome) => {
            println!(
                "Done. {} attempted, {} deleted, {} errors across {} batches.",
                outcome.attempted, outcome.deleted, outcome.errors, outcome.batches
            );
            Ok(())
        }
        Err(SchedulerError::NotConfirmed) => {
            println!("Aborted; nothing was deleted.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Ask the operator to confirm the irreversible deletion.
fn confirm(count: usize) -> Result<bool> {
    print!("Delete {count} items? This cannot be undone. [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
