//! Fetching and parsing paper metadata from the arXiv API.
//!
//! [`MetadataFetcher`] issues one GET against arXiv's Atom endpoint
//! (`https://export.arxiv.org/api/query?id_list={id}{version}`) and parses the single entry of
//! the returned feed into a [`PaperMetadata`]. Optional fields that are missing from the feed
//! come back empty; only a missing title is an error.
//!
//! # Examples
//!
//! ```no_run
//! use arxiver::{MetadataFetcher, PaperIdentity};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = MetadataFetcher::new();
//! let metadata = fetcher.fetch(&"1706.03762v7".parse()?).await?;
//!
//! println!("Title: {}", metadata.title);
//! println!("Authors: {}", metadata.authors.join(", "));
//! println!("PDF: {}", metadata.pdf_url);
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use super::*;
use crate::xml::{attribute, parse_document, text_of, OneOrMany};

/// An arXiv identifier together with an optional version suffix.
///
/// The two parts are concatenated verbatim to address both the metadata and the PDF
/// endpoints, so the identifier must already be URL-safe. Both new-style (`2301.07041`) and
/// old-style (`math.AG/0601001`) identifiers work.
///
/// ```
/// use arxiver::PaperIdentity;
///
/// let identity: PaperIdentity = "1706.03762v7".parse().unwrap();
/// assert_eq!(identity.id, "1706.03762");
/// assert_eq!(identity.version, "v7");
/// assert_eq!(identity.key(), "1706.03762v7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaperIdentity {
  /// The paper's identifier without version
  pub id:      String,
  /// Version suffix such as `v7`, empty for the latest version
  pub version: String,
}

impl PaperIdentity {
  /// Creates an identity for the latest version of a paper.
  pub fn new(id: impl Into<String>) -> Self { Self { id: id.into(), version: String::new() } }

  /// Pins a version suffix such as `v7`.
  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = version.into();
    self
  }

  /// The identifier and version joined, as sent to arXiv.
  pub fn key(&self) -> String { format!("{}{}", self.id, self.version) }
}

impl Display for PaperIdentity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}{}", self.id, self.version)
  }
}

impl FromStr for PaperIdentity {
  type Err = Infallible;

  /// Splits a trailing `vN` suffix off the identifier; anything else is kept as the id.
  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    lazy_static! {
      static ref VERSIONED: Regex = Regex::new(r"^(.+?)(v\d+)$").unwrap();
    }

    let s = s.trim();
    Ok(match VERSIONED.captures(s) {
      Some(caps) => PaperIdentity::new(&caps[1]).with_version(&caps[2]),
      None => PaperIdentity::new(s),
    })
  }
}

/// Metadata of one paper as reported by the arXiv API.
///
/// Text fields are whitespace-trimmed copies of the feed's values. Fields the feed does not
/// carry are empty, except for the title which is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
  /// The entry id, an abstract page URL such as `http://arxiv.org/abs/1706.03762v7`
  pub id:               String,
  /// The paper's title
  pub title:            String,
  /// The paper's abstract
  #[serde(rename = "abstract")]
  pub abstract_text:    String,
  /// Author names in feed order
  pub authors:          Vec<String>,
  /// First publication timestamp (ISO-8601)
  pub published:        String,
  /// Last update timestamp (ISO-8601)
  pub updated:          String,
  /// Author comment, e.g. page and figure counts
  pub comment:          String,
  /// Category terms in feed order
  pub categories:       Vec<String>,
  /// The primary category term
  pub primary_category: String,
  /// DOI of the published version, if the authors linked one
  pub doi:              String,
  /// Link to the PDF as advertised by the feed
  pub pdf_url:          String,
}

impl PaperMetadata {
  /// Parses an Atom feed body and reads its first entry.
  ///
  /// The entry may sit under a `<feed>` root or be the root element itself.
  ///
  /// # Errors
  ///
  /// - [`ArxiverError::Xml`] if the body is not well-formed XML
  /// - [`ArxiverError::MissingTitle`] if there is no entry or its title is blank
  pub fn from_feed(body: &str) -> Result<Self> {
    let doc = parse_document(body)?;
    let entries = doc.get("feed").and_then(|feed| feed.get("entry")).or_else(|| doc.get("entry"));
    let entry = OneOrMany::of(entries).first().ok_or(ArxiverError::MissingTitle)?;
    Self::from_entry(entry)
  }

  /// Builds metadata from a single parsed `<entry>` element.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::MissingTitle`] if the entry has no non-blank title.
  pub fn from_entry(entry: &Value) -> Result<Self> {
    let title = text_of(entry.get("title"));
    if title.is_empty() {
      return Err(ArxiverError::MissingTitle);
    }

    let authors = OneOrMany::of(entry.get("author")).iter().map(author_name).collect();
    let categories = OneOrMany::of(entry.get("category"))
      .iter()
      .map(|category| attribute(category, "term").unwrap_or_default().to_string())
      .collect();

    // Only a list of links needs disambiguating; a lone link is taken as the PDF link.
    let pdf_link = match OneOrMany::of(entry.get("link")) {
      OneOrMany::Many(links) => links.iter().find(|link| attribute(link, "title") == Some("pdf")),
      links => links.first(),
    };

    Ok(Self {
      id: text_of(entry.get("id")),
      title,
      abstract_text: text_of(entry.get("summary")),
      authors,
      published: text_of(entry.get("published")),
      updated: text_of(entry.get("updated")),
      comment: text_of(entry.get("comment")),
      categories,
      primary_category: entry
        .get("primary_category")
        .and_then(|category| attribute(category, "term"))
        .unwrap_or_default()
        .to_string(),
      doi: text_of(entry.get("doi")),
      pdf_url: pdf_link.and_then(|link| attribute(link, "href")).unwrap_or_default().to_string(),
    })
  }

  /// The publication timestamp, if it is valid RFC 3339.
  pub fn published_at(&self) -> Option<DateTime<Utc>> { parse_timestamp(&self.published) }

  /// The last update timestamp, if it is valid RFC 3339.
  pub fn updated_at(&self) -> Option<DateTime<Utc>> { parse_timestamp(&self.updated) }
}

/// An author's `<name>`, falling back to the element's own text.
fn author_name(author: &Value) -> String {
  match author.get("name") {
    Some(name) => text_of(Some(name)),
    None => text_of(Some(author)),
  }
}

/// Parses an Atom timestamp into UTC.
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(timestamp).ok().map(|date| date.with_timezone(&Utc))
}

/// Client for the arXiv metadata API.
///
/// Each call is a single round trip with no retry, timeout or caching, and calls share no
/// mutable state, so one fetcher can serve concurrent requests.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use arxiver::{Config, MetadataFetcher, PaperIdentity, ReqwestTransport};
/// # async fn example() -> arxiver::Result<()> {
/// let config = Config::default().with_metadata_endpoint("http://localhost:8080/api/query")?;
/// let fetcher = MetadataFetcher::from_config(&config, Arc::new(ReqwestTransport::new()))?;
///
/// let metadata = fetcher.fetch(&PaperIdentity::new("2301.07041")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MetadataFetcher {
  /// Transport used for the metadata request.
  transport: Arc<dyn Transport>,
  /// Query endpoint without trailing slash.
  endpoint:  String,
}

impl MetadataFetcher {
  /// Creates a fetcher for the public arXiv API over [`ReqwestTransport`].
  pub fn new() -> Self { Self::with_default_endpoint(Arc::new(ReqwestTransport::new())) }

  /// Creates a fetcher for the public arXiv API over `transport`.
  pub(crate) fn with_default_endpoint(transport: Arc<dyn Transport>) -> Self {
    Self { transport, endpoint: config::DEFAULT_METADATA_ENDPOINT.to_string() }
  }

  /// Creates a fetcher using the configured endpoint and the given transport.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::InvalidUrl`] if the configured endpoint is not an absolute URL.
  pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
    Ok(Self { transport, endpoint: config::validate_endpoint(&config.metadata_endpoint)? })
  }

  /// Replaces the transport.
  pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
    self.transport = transport;
    self
  }

  /// Points the fetcher at another query endpoint.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::InvalidUrl`] if `endpoint` is not an absolute URL.
  pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
    self.endpoint = config::validate_endpoint(endpoint)?;
    Ok(self)
  }

  /// The transport requests are sent through.
  pub fn transport(&self) -> &Arc<dyn Transport> { &self.transport }

  /// The query endpoint in use.
  pub fn endpoint(&self) -> &str { &self.endpoint }

  /// The query URL for `identity`, with the identifier substituted verbatim.
  pub fn query_url(&self, identity: &PaperIdentity) -> String {
    format!("{}?id_list={}", self.endpoint, identity.key())
  }

  /// Fetches the raw Atom feed for `identity`.
  ///
  /// # Errors
  ///
  /// - [`ArxiverError::Network`] (or a transport-specific error) if the request fails
  /// - [`ArxiverError::UpstreamStatus`] if the API answers with a non-success status
  pub async fn fetch_feed(&self, identity: &PaperIdentity) -> Result<String> {
    let url = self.query_url(identity);
    debug!("Fetching from arXiv via: {url}");

    let response = self.transport.get(&url).await?.error_for_status(&url)?;
    let body = response.text();
    trace!("arXiv response: {body}");
    Ok(body)
  }

  /// Fetches and parses the metadata for `identity`.
  ///
  /// # Errors
  ///
  /// Everything [`MetadataFetcher::fetch_feed`] returns, plus the parse errors of
  /// [`PaperMetadata::from_feed`].
  pub async fn fetch(&self, identity: &PaperIdentity) -> Result<PaperMetadata> {
    let metadata = PaperMetadata::from_feed(&self.fetch_feed(identity).await?)?;
    debug!("Parsed metadata for {identity}: {:?}", metadata.title);
    Ok(metadata)
  }
}

impl Default for MetadataFetcher {
  fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for MetadataFetcher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MetadataFetcher").field("endpoint", &self.endpoint).finish_non_exhaustive()
  }
}
