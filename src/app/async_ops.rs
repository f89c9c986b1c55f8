//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and async tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::feed::Feed;
use crate::models::Asset;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Fetch the current asset records
    RefreshAssets,
    /// Ask the pipeline to generate a thumbnail again
    RequestRegeneration { asset_id: String },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Fresh asset records
    AssetsRefreshed { assets: Vec<Asset> },
    /// Regeneration was accepted upstream
    RegenerationRequested { asset_id: String },
    /// Regeneration was refused or could not be sent
    RegenerationFailed { asset_id: String, message: String },
    /// An error occurred
    Error { message: String },
    /// Status message (for progress updates)
    Status { message: String },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker (and the poller, if enabled) and return handles
pub fn spawn_worker(feed: Feed, poll_interval: Option<Duration>, runtime: &Handle) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);
    let feed = Arc::new(feed);

    if let Some(interval) = poll_interval {
        runtime.spawn(poll_loop(cmd_tx.clone(), interval));
    }

    // Spawn the worker task
    runtime.spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AsyncCommand::Shutdown => break,
                AsyncCommand::RefreshAssets => {
                    handle_refresh(&result_tx, &feed).await;
                }
                AsyncCommand::RequestRegeneration { asset_id } => {
                    handle_regeneration(&result_tx, &feed, asset_id).await;
                }
            }
        }
        tracing::debug!("Async worker shutting down");
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Periodically ask the worker to refresh. Stops once the worker is gone.
async fn poll_loop(cmd_tx: mpsc::Sender<AsyncCommand>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately; the initial refresh is sent by the app
    interval.tick().await;
    loop {
        interval.tick().await;
        if cmd_tx.send(AsyncCommand::RefreshAssets).await.is_err() {
            break;
        }
    }
}

async fn handle_refresh(result_tx: &mpsc::Sender<AsyncResult>, feed: &Feed) {
    match feed.fetch_assets().await {
        Ok(assets) => {
            tracing::debug!("Fetched {} assets from {} feed", assets.len(), feed.name());
            let _ = result_tx.send(AsyncResult::AssetsRefreshed { assets }).await;
        }
        Err(e) => {
            tracing::error!("Asset refresh failed: {e:#}");
            let _ = result_tx
                .send(AsyncResult::Error {
                    message: format!("Refresh failed: {e}"),
                })
                .await;
        }
    }
}

async fn handle_regeneration(
    result_tx: &mpsc::Sender<AsyncResult>,
    feed: &Feed,
    asset_id: String,
) {
    let _ = result_tx
        .send(AsyncResult::Status {
            message: format!("Requesting new thumbnail for {asset_id}..."),
        })
        .await;

    match feed.request_regeneration(&asset_id).await {
        Ok(()) => {
            let _ = result_tx
                .send(AsyncResult::RegenerationRequested { asset_id })
                .await;
        }
        Err(e) => {
            tracing::warn!("Regeneration request for {asset_id} failed: {e:#}");
            let _ = result_tx
                .send(AsyncResult::RegenerationFailed {
                    asset_id,
                    message: e.to_string(),
                })
                .await;
        }
    }
}
