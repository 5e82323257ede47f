//! The HTTP seam used by every outbound request.
//!
//! [`MetadataFetcher`](crate::MetadataFetcher) and [`PaperDownloader`](crate::PaperDownloader)
//! never talk to `reqwest` directly. They hold an `Arc<dyn Transport>` and issue plain GETs
//! through it, which keeps the core independent of where it runs: the default
//! [`ReqwestTransport`] goes straight to the network, while an embedding host can route requests
//! through its own channel and tests can answer from memory.
//!
//! A transport reports whatever status the server sent. Deciding that a `404` is an error is
//! left to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use arxiver::{ReqwestTransport, Transport};
//!
//! # async fn example() -> arxiver::Result<()> {
//! let transport = ReqwestTransport::new();
//! let response = transport.get("https://export.arxiv.org/api/query?id_list=1706.03762").await?;
//! if response.is_success() {
//!   println!("{}", response.text());
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{header::HeaderMap, StatusCode};

use super::*;

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  /// Status line code
  pub status:  StatusCode,
  /// Response headers
  pub headers: HeaderMap,
  /// Raw response body
  pub body:    Vec<u8>,
}

impl HttpResponse {
  /// Creates a response with the given status and body and no headers.
  pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
    Self { status, headers: HeaderMap::new(), body: body.into() }
  }

  /// Whether the status is in the `2xx` range.
  pub fn is_success(&self) -> bool { self.status.is_success() }

  /// The canonical reason phrase for the status, or an empty string for unknown codes.
  pub fn status_text(&self) -> &str { self.status.canonical_reason().unwrap_or_default() }

  /// The body decoded as UTF-8, with invalid sequences replaced.
  pub fn text(&self) -> String { String::from_utf8_lossy(&self.body).into_owned() }

  /// Turns a non-success response into [`ArxiverError::UpstreamStatus`].
  pub fn error_for_status(self, url: &str) -> Result<Self> {
    if self.is_success() {
      return Ok(self);
    }
    Err(ArxiverError::UpstreamStatus {
      url:         url.to_string(),
      status:      self.status.as_u16(),
      status_text: self.status_text().to_string(),
    })
  }
}

/// Capability to perform an HTTP GET.
///
/// Implementations must be usable from several tasks at once; the library never shares mutable
/// state between calls, so a transport only needs to be as concurrent as its own internals.
#[async_trait]
pub trait Transport: Send + Sync {
  /// Performs a GET request for `url` and buffers the whole response.
  ///
  /// # Errors
  ///
  /// Returns an error only when no response could be obtained at all. Non-success statuses are
  /// returned as ordinary [`HttpResponse`]s.
  async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a reused [`reqwest::Client`].
///
/// No timeout is configured: a stalled server blocks the request until the connection fails.
/// Callers that need a deadline should wrap the future, e.g. with `tokio::time::timeout`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
  /// Internal web client used for every request.
  client: reqwest::Client,
}

impl ReqwestTransport {
  /// Creates a transport with a default [`reqwest::Client`].
  pub fn new() -> Self { Self { client: reqwest::Client::new() } }

  /// Creates a transport that reuses an existing client.
  pub fn with_client(client: reqwest::Client) -> Self { Self { client } }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn get(&self, url: &str) -> Result<HttpResponse> {
    let response = self.client.get(url).send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    trace!("GET {url} -> {status} ({} bytes)", body.len());
    Ok(HttpResponse { status, headers, body })
  }
}
