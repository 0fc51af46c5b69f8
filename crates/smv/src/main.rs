use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use smv_core::{
    config::Config,
    logging,
    workflow::{self, WorkflowOptions},
};
use smv_slack::SlackClient;

#[derive(Parser)]
#[command(name = "smv", about = "Archive and mirror Slack channel history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a channel's history and save it as a local JSON archive.
    Archive {
        /// Name of the channel to archive.
        channel: String,
        /// Slack API token (falls back to SLACK_API_TOKEN, then SLACK_TOKEN_FILE).
        #[arg(long)]
        token: Option<String>,
    },
    /// Replay one channel's history into another, archiving the source first.
    Mirror {
        /// Channel to copy messages from.
        channel_from: String,
        /// Channel to copy messages into.
        channel_to: String,
        /// Slack API token (falls back to SLACK_API_TOKEN, then SLACK_TOKEN_FILE).
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Archive { channel, token } => {
            let cfg = Config::load(token)?;
            let client = connect(&cfg).await;

            workflow::archive_channel(&client, &channel, &options(&cfg))
                .await
                .with_context(|| format!("archiving #{channel}"))?;
        }
        Commands::Mirror {
            channel_from,
            channel_to,
            token,
        } => {
            let cfg = Config::load(token)?;
            let client = connect(&cfg).await;

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("cancellation requested, stopping after the current message");
                    ctrl_c.cancel();
                }
            });

            let report = workflow::mirror(&client, &channel_from, &channel_to, &options(&cfg), &cancel)
                .await
                .with_context(|| format!("mirroring #{channel_from} into #{channel_to}"))?;

            if report.failed > 0 {
                warn!(
                    failed = report.failed,
                    "some messages were rejected by the destination"
                );
            }
            if report.cancelled {
                warn!(replayed = report.replayed, "mirror cancelled before completion");
            }
        }
    }

    println!("Done");
    Ok(())
}

/// Build the API client and run the connectivity self-test.
///
/// A failed self-test is logged and otherwise ignored so a flaky
/// `api.test` endpoint cannot block an archive of reachable history.
async fn connect(cfg: &Config) -> SlackClient {
    let client = SlackClient::new(cfg.token.clone());
    if let Err(e) = client.self_test().await {
        warn!("api.test failed, continuing anyway: {e}");
    }
    client
}

fn options(cfg: &Config) -> WorkflowOptions {
    WorkflowOptions {
        post_delay: cfg.post_delay,
        history_limit: cfg.history_limit,
        archive_dir: cfg.archive_dir.clone(),
    }
}
