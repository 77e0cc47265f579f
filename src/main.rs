//! filecache - command line front end for a file-backed cache namespace
//!
//! Each invocation opens the namespace, runs one command and shuts the
//! cache down again, leaving the files on disk.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filecache::cli::{Cli, Commands};
use filecache::{CacheConfig, FileCache};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, stdout carries values
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = CacheConfig::from_env();
    if let Some(dir) = cli.dir {
        config.base_dir = Some(dir);
    }
    // A single command never lives long enough for a sweep
    config.check_interval = Duration::ZERO;

    debug!(?config, "Configuration loaded");

    let cache = FileCache::new(cli.namespace, config).context("failed to open cache")?;
    let outcome = execute(&cache, cli.command).await;
    cache.shutdown().await;

    outcome
}

async fn execute(cache: &FileCache, command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Set { key, value } => {
            let content = match value {
                Some(value) => value.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    tokio::io::stdin()
                        .read_to_end(&mut buf)
                        .await
                        .context("failed to read value from stdin")?;
                    buf
                }
            };

            cache
                .set(&key, content)
                .await
                .with_context(|| format!("failed to set '{key}'"))?;
            info!(key = %key, "Value stored");
        }
        Commands::Get { key } => {
            let content = cache
                .get(&key)
                .await
                .with_context(|| format!("failed to get '{key}'"))?;

            let mut stdout = tokio::io::stdout();
            stdout.write_all(&content).await?;
            stdout.flush().await?;
        }
        Commands::Delete { key } => {
            cache
                .delete(&key)
                .await
                .with_context(|| format!("failed to delete '{key}'"))?;
            info!(key = %key, "Value deleted");
        }
        Commands::Exists { key } => {
            if !cache.exists(&key).await {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Destroy => {
            cache
                .destroy()
                .await
                .context("failed to destroy namespace")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
