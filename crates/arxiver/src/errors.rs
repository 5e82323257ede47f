//! Error types for the arxiver library.
//!
//! Every fallible operation in the crate returns [`ArxiverError`]. Nothing is logged and
//! swallowed inside the library; callers decide whether a failure is reported, retried or
//! turned into a user-facing message.
//!
//! # Examples
//!
//! ```no_run
//! use arxiver::{errors::ArxiverError, MetadataFetcher, PaperIdentity};
//!
//! # async fn example() -> Result<(), ArxiverError> {
//! let result = MetadataFetcher::new().fetch(&PaperIdentity::new("1706.03762")).await;
//! match result {
//!   Err(ArxiverError::MissingTitle) => println!("The feed had no usable entry"),
//!   Err(ArxiverError::UpstreamStatus { status, .. }) => println!("arXiv answered {status}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(metadata) => println!("Found: {}", metadata.title),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Errors that can occur while fetching metadata or downloading a paper.
#[derive(Error, Debug)]
pub enum ArxiverError {
  /// The metadata or PDF endpoint answered with a non-success status.
  ///
  /// Carries the requested URL together with the numeric status and its reason phrase.
  #[error("{url} responded with {status} {status_text}")]
  UpstreamStatus {
    /// The URL that was requested
    url:         String,
    /// Numeric HTTP status code
    status:      u16,
    /// Canonical reason phrase for the status, empty when unknown
    status_text: String,
  },

  /// The metadata document has no entry with a non-blank title.
  ///
  /// A paper without a title can neither be considered valid metadata nor be given a filename.
  #[error("No title could be extracted from the metadata")]
  MissingTitle,

  /// The PDF response carried no bytes.
  #[error("{url} returned an empty body")]
  EmptyBody {
    /// The PDF URL that was requested
    url: String,
  },

  /// Creating the output directory or writing the PDF failed.
  #[error(transparent)]
  Filesystem(#[from] std::io::Error),

  /// A network request could not be completed.
  ///
  /// This covers connection failures, TLS errors and bodies that could not be read, as opposed
  /// to a completed request with a failing status (see [`ArxiverError::UpstreamStatus`]).
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The metadata body is not well-formed XML.
  #[error("Failed to parse XML: {0}")]
  Xml(String),

  /// A configured endpoint is not an absolute URL.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// A title lookup strategy name was not recognized.
  #[error("Invalid title lookup `{0}`, expected `scan` or `metadata`")]
  InvalidTitleLookup(String),
}

impl ArxiverError {
  /// Returns the HTTP status code if this error came from a non-success response.
  ///
  /// ```
  /// use arxiver::ArxiverError;
  ///
  /// let error = ArxiverError::UpstreamStatus {
  ///   url:         "https://arxiv.org/pdf/0000.00000.pdf".into(),
  ///   status:      404,
  ///   status_text: "Not Found".into(),
  /// };
  /// assert_eq!(error.status(), Some(404));
  /// assert_eq!(ArxiverError::MissingTitle.status(), None);
  /// ```
  pub fn status(&self) -> Option<u16> {
    match self {
      ArxiverError::UpstreamStatus { status, .. } => Some(*status),
      _ => None,
    }
  }
}
