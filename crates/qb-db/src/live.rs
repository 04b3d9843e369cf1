//! Live sequences: query results that are re-delivered on every change.
//!
//! A live sequence is backed by a small producer task. The task waits on the
//! store's change counter, re-runs its query and publishes the full result.
//! It stops as soon as the consumer drops the sequence.

use std::future::Future;

use tokio::sync::watch;

/// Query result that refreshes itself after every committed mutation
#[derive(Debug)]
pub struct LiveSequence<T> {
    rx: watch::Receiver<Vec<T>>,
}

impl<T: Clone> LiveSequence<T> {
    /// Latest snapshot.
    pub fn current(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the producer has stopped.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Run `fetch` once, then spawn a task that re-runs it on every change.
pub(crate) async fn spawn<T, F, Fut>(
    mut changes: watch::Receiver<u64>,
    fetch: F,
) -> Result<LiveSequence<T>, sqlx::Error>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, sqlx::Error>> + Send + 'static,
{
    let initial = fetch().await?;
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = tx.closed() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }

                    match fetch().await {
                        Ok(items) => {
                            if tx.send(items).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Live query refresh failed, keeping snapshot: {e}");
                        }
                    }
                }
            }
        }

        tracing::debug!("Live query producer stopped");
    });

    Ok(LiveSequence { rx })
}
