//! Transfer progress plumbing
//!
//! Outbound requests may carry an opaque progress-listener id; the transfer
//! client resolves the id against the listener registry and wraps the
//! response body in a progress-observing stream. The download helper ties
//! the pieces together for resumable file transfers.

mod client;
mod download;
mod progress;
mod registry;

pub use client::{build_client, ClientProfile, TransferClient, TransferResponse};
pub use download::{download, DownloadRequest, DownloadStatus};
pub use progress::{observe_body, BodyStream};
pub use registry::{
    global_registry, ListenerId, ListenerRegistry, SharedTransferListener, TransferListener,
    PROGRESS_LISTENER_HEADER,
};
