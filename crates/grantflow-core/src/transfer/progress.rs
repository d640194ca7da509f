//! Progress-observing response body stream

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use super::registry::SharedTransferListener;

/// Body stream type returned by the transfer client
pub type BodyStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// Wrap `body` so every chunk advances the listener's progress.
///
/// `transferred` seeds the running count (the resume offset for ranged
/// requests) and `total` is the expected final size, offset included.
/// Stream errors pass through untouched; the consumer reports them.
pub fn observe_body<S>(
    body: S,
    listener: SharedTransferListener,
    transferred: u64,
    total: u64,
) -> BodyStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let mut transferred = transferred;
    body.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            transferred += bytes.len() as u64;
            listener.on_progress(transferred, total);
        }
        chunk
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::registry::TransferListener;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct RecordingListener {
        progress: Mutex<Vec<(u64, u64)>>,
    }

    impl RecordingListener {
        fn new() -> Self {
            Self {
                progress: Mutex::new(Vec::new()),
            }
        }

        fn recorded(&self) -> Vec<(u64, u64)> {
            self.progress.lock().clone()
        }
    }

    impl TransferListener for RecordingListener {
        fn on_progress(&self, transferred: u64, total: u64) {
            self.progress.lock().push((transferred, total));
        }
    }

    fn chunks(sizes: Vec<usize>) -> impl Stream<Item = reqwest::Result<Bytes>> {
        let chunks: Vec<reqwest::Result<Bytes>> = sizes
            .into_iter()
            .map(|size| Ok(Bytes::from(vec![0u8; size])))
            .collect();
        futures::stream::iter(chunks)
    }

    #[tokio::test]
    async fn test_progress_advances_per_chunk() {
        let listener = Arc::new(RecordingListener::new());
        let body = observe_body(chunks(vec![3, 3, 3]), listener.clone(), 0, 9);

        let collected: Vec<_> = body.collect().await;
        assert_eq!(collected.len(), 3);
        assert_eq!(listener.recorded(), vec![(3, 9), (6, 9), (9, 9)]);
    }

    #[tokio::test]
    async fn test_progress_seeds_resume_offset() {
        let listener = Arc::new(RecordingListener::new());
        let body = observe_body(chunks(vec![2, 3]), listener.clone(), 5, 10);

        let _: Vec<_> = body.collect().await;
        assert_eq!(listener.recorded(), vec![(7, 10), (10, 10)]);
    }
}
