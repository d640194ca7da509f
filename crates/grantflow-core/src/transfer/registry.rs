//! Progress-listener registry
//!
//! Process-wide mapping from opaque listener ids to transfer listeners.
//! Request submitters register a listener before tagging a request with its
//! id; the transfer client looks the id up when the response arrives.

use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::error::GrantError;

/// Header carrying the opaque progress-listener id on outbound requests
pub const PROGRESS_LISTENER_HEADER: &str = "x-progress-listener-id";

/// Observer of one transfer's progress
pub trait TransferListener: Send + Sync {
    /// Called after every chunk with the running byte count and the
    /// expected total (resume offset included)
    fn on_progress(&self, transferred: u64, total: u64);

    /// Called when the transfer fails
    fn on_error(&self, error: &GrantError) {
        let _ = error;
    }

    /// Called once when the transfer finishes successfully
    fn on_complete(&self) {}

    /// Called once when the transfer is cancelled
    fn on_cancel(&self) {}
}

/// Shared transfer listener type
pub type SharedTransferListener = Arc<dyn TransferListener>;

/// Opaque id handed out by [`ListenerRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Parse an id from its header representation
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok().map(Self)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry of in-flight transfer listeners.
///
/// Multiple transfers may be in flight simultaneously, each owning a
/// distinct id; insert/remove/lookup are safe to call concurrently.
pub struct ListenerRegistry {
    listeners: DashMap<u64, SharedTransferListener>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener and hand out its id
    pub fn register(&self, listener: SharedTransferListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.insert(id.0, listener);
        debug!(%id, "registered transfer listener");
        id
    }

    /// Look up a listener by id
    pub fn lookup(&self, id: ListenerId) -> Option<SharedTransferListener> {
        self.listeners.get(&id.0).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a listener, returning whether it was present
    pub fn unregister(&self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id.0).is_some();
        if removed {
            debug!(%id, "unregistered transfer listener");
        }
        removed
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_LISTENERS: Arc<ListenerRegistry> = Arc::new(ListenerRegistry::new());
}

/// Get the process-wide listener registry
pub fn global_registry() -> &'static Arc<ListenerRegistry> {
    &GLOBAL_LISTENERS
}
