// sink.rs - Backpressured paint-event output that tolerates a departed consumer

use tokio::sync::mpsc;

/// Sending half of a paint stream. Each send waits for channel capacity, so a
/// slow renderer throttles generation. Once the receiver is dropped, sends are
/// silently discarded and the producer keeps going.
#[derive(Debug)]
pub struct PaintSink<E> {
    tx: Option<mpsc::Sender<E>>,
}

impl<E> Clone for PaintSink<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Send> PaintSink<E> {
    pub fn new(tx: mpsc::Sender<E>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink that drops everything, for callers that only want the grid.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    pub async fn send(&self, event: E) {
        if let Some(tx) = &self.tx {
            // receiver gone: nobody is watching, generation still completes
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel::<u32>(1);
        let sink = PaintSink::new(tx);
        drop(rx);

        // must not block or panic
        sink.send(1).await;
        sink.send(2).await;
    }

    #[tokio::test]
    async fn test_send_delivers_in_order() {
        let (tx, mut rx) = mpsc::channel::<u32>(4);
        let sink = PaintSink::new(tx);
        for i in 0..4 {
            sink.send(i).await;
        }
        drop(sink);

        let mut seen = Vec::new();
        while let Some(v) = rx.recv().await {
            seen.push(v);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
