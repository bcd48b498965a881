//! Debounced hot-reload driven by change notifications.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::{self, JoinHandle},
    time,
};
use tracing::{debug, error};

use crate::loader::{ConfigLoader, ReloadOutcome};

/// Default quiet period before a burst of change events triggers a reload.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Outcomes buffered for a slow consumer.
const OUTCOME_BUFFER: usize = 16;

/// Reload `loader` whenever `events` fires, once per burst.
///
/// A burst ends after `debounce` without a new event. The script runs on the blocking pool and
/// each [`ReloadOutcome`] is forwarded on the returned channel. The task ends when `events`
/// closes, after finishing any pending reload. Dropping the outcome receiver does not stop
/// reloading.
pub fn spawn_reload_task(
    loader: Arc<ConfigLoader>,
    mut events: mpsc::Receiver<()>,
    debounce: Duration,
) -> (JoinHandle<()>, mpsc::Receiver<ReloadOutcome>) {
    let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
    let handle = tokio::spawn(async move {
        while events.recv().await.is_some() {
            let closed = settle(&mut events, debounce).await;

            let l = Arc::clone(&loader);
            let outcome = match task::spawn_blocking(move || l.reload()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("config reload task failed: {}", e);
                    continue;
                }
            };
            if tx.send(outcome).await.is_err() {
                debug!("reload outcome dropped; no receiver");
            }
            if closed {
                break;
            }
        }
        debug!("reload task finished");
    });
    (handle, rx)
}

/// Swallow events until `debounce` passes quietly. Returns whether the sender closed.
async fn settle(events: &mut mpsc::Receiver<()>, debounce: Duration) -> bool {
    loop {
        match time::timeout(debounce, events.recv()).await {
            Ok(Some(())) => {}
            Ok(None) => return true,
            Err(_) => return false,
        }
    }
}
