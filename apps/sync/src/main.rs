use std::sync::Arc;

use anyhow::Context;
use spotify_modal_sync::{
    Config, FileAccountDirectory, InboundSignal, SyncContext, SyncController, SyncEvent, Topic,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.common.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        environment = %config.common.environment,
        api = %config.common.spotify.base_url,
        "Starting spotify-modal sync"
    );

    let directory = Arc::new(
        FileAccountDirectory::load(&config.accounts_file)
            .await
            .context("Failed to load connected accounts")?,
    );

    let ctx = SyncContext::new(&config.common.spotify, directory.clone(), directory)
        .context("Failed to create Spotify client")?;
    let _controller = SyncController::attach(ctx.clone());

    log_emitted(&ctx);

    let mut toasts = ctx.toasts().subscribe();
    tokio::spawn(async move {
        while let Ok(toast) = toasts.recv().await {
            tracing::warn!(message = %toast.message, "toast");
        }
    });

    // One JSON signal per line
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<InboundSignal>(line) {
            Ok(signal) => ctx.dispatch(signal),
            Err(e) => tracing::warn!(error = %e, "ignoring malformed signal"),
        }
    }

    tracing::info!("stdin closed, shutting down");

    Ok(())
}

/// Log everything the core emits
fn log_emitted(ctx: &SyncContext) {
    ctx.bus()
        .chain_on(Topic::State, |event| {
            if let SyncEvent::State(state) = event {
                match serde_json::to_string(state) {
                    Ok(json) => tracing::info!(state = %json, "state"),
                    Err(e) => tracing::warn!(error = %e, "failed serializing state"),
                }
            }
        })
        .chain_on(Topic::ActiveAccount, |event| {
            if let SyncEvent::ActiveAccount(account_id) = event {
                tracing::info!(account_id = ?account_id, "activeAccount");
            }
        })
        .chain_on(Topic::ShowUpdate, |event| {
            if let SyncEvent::ShowUpdate(show) = event {
                tracing::info!(show, "showUpdate");
            }
        });
}
