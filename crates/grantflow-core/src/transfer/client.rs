//! HTTP client construction and the progress-tapping transfer client

use futures::StreamExt;
use reqwest::header::{HeaderMap, RANGE};
use reqwest::{Client, Request, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{GrantError, GrantResult};

use super::progress::{observe_body, BodyStream};
use super::registry::{ListenerId, ListenerRegistry, PROGRESS_LISTENER_HEADER};

/// Timeout profile for a constructed client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientProfile {
    /// Plain API calls: bounded end to end
    Api,
    /// File transfers: long read windows, no overall deadline
    FileTransfer,
}

/// Build a reqwest client for `profile`
pub fn build_client(profile: ClientProfile, config: &HttpConfig) -> GrantResult<Client> {
    let builder = Client::builder().connect_timeout(config.connect_timeout);
    let builder = match profile {
        ClientProfile::Api => builder.timeout(config.request_timeout),
        ClientProfile::FileTransfer => builder.read_timeout(config.file_timeout),
    };
    Ok(builder.build()?)
}

/// Response returned by [`TransferClient::execute`].
///
/// The body is exposed as a byte stream, progress-wrapped when the request
/// carried a registered listener id.
pub struct TransferResponse {
    status: StatusCode,
    headers: HeaderMap,
    content_length: Option<u64>,
    body: BodyStream,
}

impl TransferResponse {
    /// Response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Declared body length, if the server sent one
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Consume the response into its body stream
    pub fn into_body(self) -> BodyStream {
        self.body
    }
}

/// HTTP client honoring the progress-listener tagging contract.
///
/// Requests carrying [`PROGRESS_LISTENER_HEADER`] get their response bodies
/// wrapped in a progress-observing stream; a missing or unregistered id
/// passes the response through unmodified.
pub struct TransferClient {
    http: Client,
    listeners: Arc<ListenerRegistry>,
}

impl TransferClient {
    /// Wrap an existing client
    pub fn new(http: Client, listeners: Arc<ListenerRegistry>) -> Self {
        Self { http, listeners }
    }

    /// Build a client for `profile` and wrap it
    pub fn with_profile(
        profile: ClientProfile,
        config: &HttpConfig,
        listeners: Arc<ListenerRegistry>,
    ) -> GrantResult<Self> {
        Ok(Self::new(build_client(profile, config)?, listeners))
    }

    /// The underlying reqwest client, for building requests
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// The registry this client resolves listener ids against
    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    /// Execute `request`, applying the progress tap when it is tagged
    pub async fn execute(&self, request: Request) -> GrantResult<TransferResponse> {
        let listener_id = request
            .headers()
            .get(PROGRESS_LISTENER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(ListenerId::parse);
        let resume_offset = range_offset(request.headers());

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let content_length = response.content_length();

        let body = match listener_id.and_then(|id| self.listeners.lookup(id)) {
            None => {
                if let Some(id) = listener_id {
                    debug!(%id, "no listener registered, passing response through");
                }
                response.bytes_stream().boxed()
            }
            Some(listener) if content_length == Some(0) => {
                warn!(%status, "tagged response arrived without a body");
                listener.on_error(&GrantError::EmptyResponseBody);
                response.bytes_stream().boxed()
            }
            Some(listener) => {
                let total = resume_offset + content_length.unwrap_or(0);
                observe_body(response.bytes_stream(), listener, resume_offset, total)
            }
        };

        Ok(TransferResponse {
            status,
            headers,
            content_length,
            body,
        })
    }
}

/// Resume offset from a `Range: bytes=<offset>-` request header, 0 when the
/// header is missing or not of that shape
fn range_offset(headers: &HeaderMap) -> u64 {
    headers
        .get(RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("bytes="))
        .and_then(|value| value.strip_suffix('-'))
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}
