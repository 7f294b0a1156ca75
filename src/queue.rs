//! The bounded work queue between the line source and the workers.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Producer side. Dropping every sender is the "no more work" signal.
pub type WorkSender = mpsc::Sender<String>;

/// Claim side, cloned into every worker. Each URL is handed to exactly one
/// claimer.
#[derive(Clone)]
pub struct WorkQueue {
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl WorkQueue {
    /// Waits for the next URL; `None` once the source is done and the queue
    /// is empty.
    pub async fn claim(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }
}

pub fn work_queue(capacity: usize) -> (WorkSender, WorkQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        tx,
        WorkQueue {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}
