mod commands;

use std::net::IpAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Types
// ============================================================================

/// Bulksweep - bulk-delete content items by taxonomy term, in paced batches
#[derive(Parser, Debug)]
#[command(version = bulksweep::build_info::VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "bulksweep.yaml")]
        config: String,

        /// Host to bind to (overrides config file)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List deletable content types and their taxonomies
    Types {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Find matching items and delete them in batches
    Sweep {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Content type whose items should be deleted
        #[arg(long)]
        content_type: String,

        /// Taxonomy used to filter the items
        #[arg(long)]
        taxonomy: String,

        /// Case-insensitive text matched against term name or slug;
        /// empty includes every term of the taxonomy
        #[arg(long, default_value = "")]
        term_filter: String,

        /// After deletion, remove terms of the taxonomy left without items
        #[arg(long)]
        delete_empty_terms: bool,

        /// Items per batch
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..=1000))]
        batch_size: u64,

        /// Seconds to pause between batches (0 for no pause)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(0..=60))]
        pause_secs: u64,

        /// Only list the matching items, delete nothing
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Inspect or purge the activity log
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
}

#[derive(Subcommand, Debug)]
enum LogsAction {
    /// List log entries, newest first
    List {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Filter by action (find, delete_batch, term_cleanup, ...)
        #[arg(long)]
        action: Option<String>,

        /// Filter by status (info, success, warning, error)
        #[arg(long)]
        status: Option<String>,

        /// Maximum entries to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Remove entries older than the server's retention period
    Purge {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ConnectionArgs {
    /// Server URL
    #[arg(short, long, default_value = "http://127.0.0.1:8680")]
    server: String,

    /// Bearer token for the server API
    #[arg(long, env = "BULKSWEEP_TOKEN")]
    token: Option<String>,

    /// Operator name recorded in the activity log
    #[arg(long, default_value = "admin")]
    actor: String,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => commands::serve::run(&config, host, port).await,
        Commands::Types { connection } => {
            commands::types::run(&connection.server, connection.token, &connection.actor).await
        }
        Commands::Sweep {
            connection,
            content_type,
            taxonomy,
            term_filter,
            delete_empty_terms,
            batch_size,
            pause_secs,
            dry_run,
            yes,
        } => {
            commands::sweep::run(
                &connection.server,
                connection.token,
                &connection.actor,
                &content_type,
                &taxonomy,
                &term_filter,
                delete_empty_terms,
                batch_size as usize,
                pause_secs,
                dry_run,
                yes,
            )
            .await
        }
        Commands::Logs { action } => match action {
            LogsAction::List {
                connection,
                action,
                status,
                limit,
            } => {
                commands::logs::list(
                    &connection.server,
                    connection.token,
                    &connection.actor,
                    action.as_deref(),
                    status.as_deref(),
                    limit,
                )
                .await
            }
            LogsAction::Purge { connection } => {
                commands::logs::purge(&connection.server, connection.token, &connection.actor).await
            }
        },
    }
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
