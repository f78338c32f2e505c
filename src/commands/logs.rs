//! Activity log commands.

use anyhow::Result;

use bulksweep::client::SweepClient;

pub async fn list(
    server: &str,
    token: Option<String>,
    actor: &str,
    action: Option<&str>,
    status: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let client = SweepClient::new(server, token, actor);
    let entries = client.list_logs(action, status, limit).await?;

    if entries.is_empty() {
        println!("No matching log entries.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {:<13} {:<8} {:<12} {}{}",
            entry.timestamp,
            entry.action,
            entry.status,
            entry.acting_user,
            entry.summary,
            counters(&entry)
        );
        for detail in entry.details {
            println!("    - {detail}");
        }
    }
    Ok(())
}

/// Compact counter suffix, e.g. ` [F:3 D:2 E:1]`.
fn counters(entry: &bulksweep::api::LogEntryResponse) -> String {
    let mut parts = Vec::new();
    if let Some(found) = entry.found {
        parts.push(format!("F:{found}"));
    }
    if let Some(attempted) = entry.attempted {
        parts.push(format!("A:{attempted}"));
    }
    if let Some(deleted) = entry.deleted {
        parts.push(format!("D:{deleted}"));
    }
    if let Some(errors) = entry.errors {
        parts.push(format!("E:{errors}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", parts.join(" "))
    }
}

pub async fn purge(server: &str, token: Option<String>, actor: &str) -> Result<()> {
    let client = SweepClient::new(server, token, actor);
    let removed = client.purge_logs().await?;
    println!("{removed} old log entries removed.");
    Ok(())
}
