use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast topic with bounded capacity, carrying drivetrain snapshots from
/// the control thread to async consumers.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// Drain a receiver to its newest message without waiting.
///
/// A slow consumer on a busy topic is routinely lagged; the overrun is
/// expected here (only the freshest snapshot matters), so lag is skipped
/// over rather than treated as an end of stream.
pub fn drain_latest<T>(rx: &mut broadcast::Receiver<Arc<T>>) -> Option<Arc<T>> {
    let mut latest = None;
    loop {
        match rx.try_recv() {
            Ok(msg) => latest = Some(msg),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(broadcast::error::TryRecvError::Empty)
            | Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }
    latest
}
