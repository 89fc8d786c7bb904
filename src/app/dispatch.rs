use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use chatline::Config;
use chatline::links::{PreviewBody, PreviewFetcher, PreviewOutcome, detect_links, parse_target};
use chatline::message::scan_segments;
use tokio::io::AsyncReadExt;
use tracing::info;

/// Use the `--message` value, or read the whole message from stdin.
async fn read_message(message: Option<String>) -> Result<String> {
    if let Some(message) = message {
        return Ok(message);
    }
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read message from stdin")?;
    Ok(buf)
}

async fn run_preview(config: &Config, raw_url: &str) -> Result<PreviewBody> {
    let target = parse_target(raw_url)?;
    let fetcher = PreviewFetcher::new(&config.preview)?;
    match fetcher.fetch(&target).await? {
        PreviewOutcome::Html(meta) => Ok(PreviewBody::from(meta)),
        PreviewOutcome::NotHtml => Ok(PreviewBody::not_html(raw_url.trim())),
        PreviewOutcome::BotBlocked => bail!("Access denied by bot protection"),
    }
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Gateway { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting chatline gateway on {host} (random port)");
            } else {
                info!("Starting chatline gateway on {host}:{port}");
            }
            chatline::gateway::run_gateway(&host, port, config).await
        }

        Commands::Segments { message } => {
            let message = read_message(message).await?;
            let segments = scan_segments(&message);
            println!("{}", serde_json::to_string_pretty(&segments)?);
            Ok(())
        }

        Commands::Links { message } => {
            let message = read_message(message).await?;
            let links = detect_links(&scan_segments(&message));
            println!("{}", serde_json::to_string_pretty(&links)?);
            Ok(())
        }

        Commands::Preview { url } => {
            let body = run_preview(&config, &url).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
    }
}
