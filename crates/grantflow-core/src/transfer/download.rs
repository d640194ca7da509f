//! Resumable download driven through the transfer client

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{GrantError, GrantResult};

use super::client::TransferClient;
use super::progress::BodyStream;
use super::registry::{ListenerId, SharedTransferListener, PROGRESS_LISTENER_HEADER};

/// How a download ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The whole body was written to the destination
    Completed,
    /// The cancellation token fired mid-transfer
    Cancelled,
}

/// Parameters for one download
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Source URL
    pub url: String,
    /// Destination file, opened in append mode
    pub destination: PathBuf,
    /// Byte offset to resume from; must match the destination's current
    /// length. 0 starts fresh.
    pub resume_from: u64,
}

impl DownloadRequest {
    /// Create a fresh download
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            resume_from: 0,
        }
    }

    /// Resume a previously interrupted download at `offset`
    pub fn resume_from(mut self, offset: u64) -> Self {
        self.resume_from = offset;
        self
    }
}

/// Download `request.url` to `request.destination`.
///
/// The listener is registered with the client's registry for the duration
/// of the transfer, so the progress tap picks it up, and is always
/// unregistered on exit. Terminal listener notifications mirror the result:
/// `on_complete`, `on_cancel`, or `on_error`.
pub async fn download(
    client: &TransferClient,
    request: DownloadRequest,
    listener: SharedTransferListener,
    cancel: CancellationToken,
) -> GrantResult<DownloadStatus> {
    let id = client.listeners().register(Arc::clone(&listener));
    let result = run(client, &request, id, &cancel).await;
    client.listeners().unregister(id);

    match &result {
        Ok(DownloadStatus::Completed) => {
            info!(url = %request.url, "download complete");
            listener.on_complete();
        }
        Ok(DownloadStatus::Cancelled) => {
            debug!(url = %request.url, "download cancelled");
            listener.on_cancel();
        }
        Err(error) => listener.on_error(error),
    }
    result
}

async fn run(
    client: &TransferClient,
    request: &DownloadRequest,
    id: ListenerId,
    cancel: &CancellationToken,
) -> GrantResult<DownloadStatus> {
    let http_request = client
        .http()
        .get(&request.url)
        .header(reqwest::header::RANGE, format!("bytes={}-", request.resume_from))
        .header(PROGRESS_LISTENER_HEADER, id.to_string())
        .build()?;

    let response = client.execute(http_request).await?;
    if !response.status().is_success() {
        return Err(GrantError::transfer(format!(
            "unexpected status {} from {}",
            response.status(),
            request.url
        )));
    }

    write_body(response.into_body(), &request.destination, cancel).await
}

/// Stream `body` into `destination`, appending, until it ends or the
/// cancellation token fires.
async fn write_body(
    mut body: BodyStream,
    destination: &Path,
    cancel: &CancellationToken,
) -> GrantResult<DownloadStatus> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(destination)
        .await?;

    loop {
        tokio::select! {
            // Cancellation wins over a ready chunk.
            biased;
            _ = cancel.cancelled() => return Ok(DownloadStatus::Cancelled),
            chunk = body.next() => match chunk {
                Some(Ok(bytes)) => file.write_all(&bytes).await?,
                Some(Err(error)) => return Err(error.into()),
                None => break,
            },
        }
    }
    file.flush().await?;

    Ok(DownloadStatus::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_download_request_builder() {
        let request = DownloadRequest::new("https://example.com/file.bin", "/tmp/file.bin")
            .resume_from(2048);
        assert_eq!(request.url, "https://example.com/file.bin");
        assert_eq!(request.destination, PathBuf::from("/tmp/file.bin"));
        assert_eq!(request.resume_from, 2048);
    }

    fn body_of(chunks: &[&str]) -> BodyStream {
        let chunks: Vec<reqwest::Result<Bytes>> = chunks
            .iter()
            .map(|&chunk| Ok(Bytes::copy_from_slice(chunk.as_bytes())))
            .collect();
        futures::stream::iter(chunks).boxed()
    }

    #[tokio::test]
    async fn test_write_body_appends_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("payload.bin");

        let status = write_body(
            body_of(&["hello ", "world"]),
            &destination,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(status, DownloadStatus::Completed);
        assert_eq!(std::fs::read(&destination).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_write_body_resumes_into_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("payload.bin");
        std::fs::write(&destination, b"hello ").unwrap();

        let status = write_body(body_of(&["world"]), &destination, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, DownloadStatus::Completed);
        assert_eq!(std::fs::read(&destination).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_write_body_stops_on_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("payload.bin");

        let cancel = CancellationToken::new();
        cancel.cancel();

        let status = write_body(body_of(&["never written"]), &destination, &cancel)
            .await
            .unwrap();

        assert_eq!(status, DownloadStatus::Cancelled);
        assert_eq!(std::fs::read(&destination).unwrap(), b"");
    }
}
