use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because messages cross from the render loop to
/// the simulation thread.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes a message. Messages sent while nobody is subscribed are dropped.
    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// Every sender of a topic has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

/// Drains everything queued on `rx` and returns the newest message.
///
/// Lagging is not an error here: only the latest command matters. Returns
/// `Err(Closed)` once every sender is gone and the queue is empty.
pub fn latest<T>(rx: &mut broadcast::Receiver<Arc<T>>) -> Result<Option<Arc<T>>, Closed> {
    let mut newest = None;
    loop {
        match rx.try_recv() {
            Ok(msg) => newest = Some(msg),
            Err(broadcast::error::TryRecvError::Empty) => return Ok(newest),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Command receiver lagged, skipping to newest");
            }
            Err(broadcast::error::TryRecvError::Closed) => {
                return if newest.is_some() { Ok(newest) } else { Err(Closed) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_returns_newest() {
        let topic: Topic<u32> = Topic::new(4);
        let mut rx = topic.subscribe();
        assert_eq!(latest(&mut rx), Ok(None));

        topic.publish(1);
        topic.publish(2);
        assert_eq!(latest(&mut rx).unwrap().as_deref(), Some(&2));
        assert_eq!(latest(&mut rx), Ok(None));
    }

    #[test]
    fn test_latest_survives_lag() {
        let topic: Topic<u32> = Topic::new(2);
        let mut rx = topic.subscribe();
        for i in 0..10 {
            topic.publish(i);
        }
        assert_eq!(latest(&mut rx).unwrap().as_deref(), Some(&9));
    }

    #[test]
    fn test_latest_reports_closed() {
        let topic: Topic<u32> = Topic::new(2);
        let mut rx = topic.subscribe();
        topic.publish(7);
        drop(topic);
        assert_eq!(latest(&mut rx).unwrap().as_deref(), Some(&7));
        assert_eq!(latest(&mut rx), Err(Closed));
    }
}
